pub mod batch;
pub mod cli;
pub mod clipboard;
pub mod compress;
pub mod config;
pub mod constants;
pub mod error;
pub mod key;
pub mod logger;
pub mod pipeline;
pub mod public_url;
pub mod source;
pub mod store;
pub mod utils;

pub use batch::{BatchObserver, BatchOrchestrator, BatchReport, BatchStatus, BatchSummary};
pub use clipboard::{ClipboardSink, SystemClipboard};
pub use compress::{CompressionResult, Compressor, TinifyClient};
pub use config::{AddressingStyle, PublicUrlConfig, Settings, StoreConfig, UrlFormat};
pub use error::{CompressionPhase, PublishError, Result};
pub use key::KeyGenerator;
pub use pipeline::{
    CompressionMode, Failed, ItemOutcome, PipelineRunner, ProgressObserver, Published, Stage,
};
pub use public_url::{build_public_url, format_url, join_url};
pub use source::{collect_candidates, collect_image_files, extract_extension, ImageItem, ItemSource};
pub use store::{content_type, upload, ObjectStore, S3Uploader};
pub use utils::{format_file_size, savings_percent};
