pub const TINIFY_SHRINK_URL: &str = "https://api.tinify.com/shrink";
/// Basic-auth username expected by the Tinify API; the password is the API key.
pub const TINIFY_API_USER: &str = "api";
pub const COMPRESSION_COUNT_HEADER: &str = "Compression-Count";

/// Files larger than this are rejected before being read into memory (100MiB).
pub const MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

pub const DEFAULT_EXTENSION: &str = "png";
pub const GENERIC_CONTENT_TYPE: &str = "application/octet-stream";

/// Extensions accepted as images from a file selection.
pub const SUPPORTED_IMAGE_EXTENSIONS: &[&str] =
    &["png", "jpg", "jpeg", "gif", "webp", "svg", "bmp", "ico"];

/// Extensions the compression service accepts; everything else is uploaded as-is.
pub const COMPRESSIBLE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp"];

pub const CLIPBOARD_IMAGE_NAME: &str = "clipboard.png";
pub const CONFIG_DIR_NAME: &str = "img-publish";
pub const CONFIG_FILE_NAME: &str = "config.toml";

pub const ENV_TINIFY_API_KEY: &str = "IMG_PUBLISH_TINIFY_API_KEY";
pub const ENV_ACCESS_KEY_ID: &str = "IMG_PUBLISH_ACCESS_KEY_ID";
pub const ENV_SECRET_ACCESS_KEY: &str = "IMG_PUBLISH_SECRET_ACCESS_KEY";

pub const PROGRESS_SPINNER_TEMPLATE: &str = "{spinner:.green} {msg}";
pub const PROGRESS_BAR_TEMPLATE: &str = "{bar:40.cyan/blue} {pos}/{len} {msg}";
