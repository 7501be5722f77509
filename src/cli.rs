use crate::config::UrlFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "img-publish",
    about = "Compress images with TinyPNG and publish them to S3-compatible storage",
    long_about = "img-publish takes an image from the clipboard or a set of files, optionally compresses \
                  them through the TinyPNG API, uploads them to an S3-compatible bucket and copies the \
                  public URL (raw, Markdown or BBCode) to the clipboard.",
    version = "0.1.0",
    after_help = "EXAMPLES:\n  \
    img-publish upload\n  \
    img-publish upload --no-compress -f markdown\n  \
    img-publish batch ./screenshots -r\n  \
    img-publish batch \"./images/*.png\" shot.jpg --no-compress"
)]
pub struct Args {
    #[arg(
        short = 'c',
        long,
        global = true,
        help = "Path to the config file",
        long_help = "TOML config file. Defaults to <config dir>/img-publish/config.toml. \
                     IMG_PUBLISH_TINIFY_API_KEY, IMG_PUBLISH_ACCESS_KEY_ID and \
                     IMG_PUBLISH_SECRET_ACCESS_KEY override the secrets it contains."
    )]
    pub config: Option<PathBuf>,

    #[arg(short = 'q', long, global = true, help = "Only print errors and the final URL")]
    pub quiet: bool,

    #[arg(
        short = 'v',
        long,
        global = true,
        conflicts_with = "quiet",
        help = "Print diagnostic details"
    )]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(
        about = "Publish the image currently on the clipboard",
        long_about = "Read an image (or a copied image file) from the clipboard, compress it unless \
                      --no-compress is given, upload it and copy the formatted URL back to the clipboard."
    )]
    Upload {
        #[arg(long, help = "Upload the original bytes without compressing")]
        no_compress: bool,

        #[arg(
            short = 'f',
            long,
            help = "URL format (raw, markdown, bbcode)",
            long_help = "Overrides output.format from the config file. \
                         Supported formats: raw, markdown, bbcode"
        )]
        format: Option<UrlFormat>,
    },

    #[command(
        about = "Publish several image files one after another",
        long_about = "Upload every image among the given files, directories or glob patterns. \
                      Items are processed in order; a failure does not stop the batch. \
                      All URLs are copied to the clipboard together at the end."
    )]
    Batch {
        #[arg(
            required = true,
            help = "Files, directories or glob patterns",
            long_help = "Inputs can be file paths, directories or glob expressions. \
                         Non-image files are ignored. Supported: png, jpg, jpeg, gif, webp, svg, bmp, ico"
        )]
        inputs: Vec<String>,

        #[arg(short = 'r', long, help = "Descend into subdirectories")]
        recursive: bool,

        #[arg(long, help = "Upload the original bytes without compressing")]
        no_compress: bool,

        #[arg(
            short = 'f',
            long,
            help = "URL format (raw, markdown, bbcode)",
            long_help = "Overrides output.format from the config file. \
                         Supported formats: raw, markdown, bbcode"
        )]
        format: Option<UrlFormat>,
    },
}
