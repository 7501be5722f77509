use anyhow::{bail, Context};
use clap::Parser;
use img_publish::batch::{BatchObserver, BatchOrchestrator, BatchReport, BatchStatus, BatchSummary};
use img_publish::cli::{Args, Commands};
use img_publish::clipboard::SystemClipboard;
use img_publish::compress::TinifyClient;
use img_publish::config::{Settings, UrlFormat};
use img_publish::key::KeyGenerator;
use img_publish::logger::{self, Verbosity};
use img_publish::pipeline::{CompressionMode, ItemOutcome, PipelineRunner, Published, Stage};
use img_publish::source::collect_candidates;
use img_publish::store::S3Uploader;
use img_publish::utils::{create_progress_bar, create_progress_spinner, format_file_size, savings_percent};
use img_publish::{error, info, verbose, warn};
use indicatif::ProgressBar;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let verbosity = if args.quiet {
        Verbosity::Quiet
    } else if args.verbose {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    };
    logger::set_verbosity(verbosity);
    init_tracing(verbosity);

    let settings =
        Settings::resolve(args.config.as_deref()).context("Failed to load configuration")?;
    settings.validate()?;

    match args.command {
        Commands::Upload {
            no_compress,
            format,
        } => run_upload(&settings, compression_mode(no_compress), format).await,
        Commands::Batch {
            inputs,
            recursive,
            no_compress,
            format,
        } => {
            run_batch(
                &settings,
                &inputs,
                recursive,
                compression_mode(no_compress),
                format,
            )
            .await
        }
    }
}

fn init_tracing(verbosity: Verbosity) {
    let default = match verbosity {
        Verbosity::Verbose => "img_publish=debug",
        _ => "warn",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn compression_mode(no_compress: bool) -> CompressionMode {
    if no_compress {
        CompressionMode::Direct
    } else {
        CompressionMode::Compress
    }
}

fn build_runner<'a>(
    settings: &'a Settings,
    compressor: &'a TinifyClient,
    store: &'a S3Uploader,
    keys: &'a KeyGenerator,
    mode: CompressionMode,
    format: Option<UrlFormat>,
) -> PipelineRunner<'a> {
    let runner = PipelineRunner::new(settings, compressor, store, keys, mode);
    match format {
        Some(format) => runner.with_format(format),
        None => runner,
    }
}

async fn run_upload(
    settings: &Settings,
    mode: CompressionMode,
    format: Option<UrlFormat>,
) -> anyhow::Result<()> {
    let compressor = TinifyClient::new(settings.compression.timeout())?;
    let store = S3Uploader::new(&settings.store);
    let keys = KeyGenerator::system();
    let runner = build_runner(settings, &compressor, &store, &keys, mode, format);

    let pb = create_progress_spinner("📋 Reading clipboard...");
    let mut on_stage = |stage: &Stage| render_stage(&pb, stage);
    let outcome = runner
        .run_interactive(&SystemClipboard, &SystemClipboard, &mut on_stage)
        .await;
    pb.finish_and_clear();

    match outcome {
        ItemOutcome::Success(published) => {
            print_published(&published);
            Ok(())
        }
        ItemOutcome::Failure(failed) => Err(failed.error.into()),
    }
}

fn render_stage(pb: &ProgressBar, stage: &Stage) {
    match stage {
        Stage::Idle => {}
        Stage::Acquiring => pb.set_message("📋 Reading image..."),
        Stage::Compressing {
            filename,
            original_size,
        } => pb.set_message(format!(
            "🗜️  Compressing {} ({})...",
            filename,
            format_file_size(*original_size)
        )),
        Stage::Uploading {
            filename,
            original_size,
            final_size,
        } => pb.set_message(format!(
            "⬆️  Uploading {} ({} → {}, saved {})...",
            filename,
            format_file_size(*original_size),
            format_file_size(*final_size),
            savings_percent(*original_size, *final_size)
        )),
        Stage::Publishing { key } => pb.set_message(format!("🔗 Publishing {}", key)),
        Stage::Done { .. } => pb.tick(),
    }
}

fn print_published(published: &Published) {
    if logger::is_quiet() {
        println!("{}", published.formatted_url);
        if !published.copied {
            error!("Could not copy the URL to the clipboard");
        }
        return;
    }

    info!("✅ Upload complete: {}", published.filename);
    if published.compressed {
        info!(
            "📊 Before: {}  After: {}  Saved: {}",
            format_file_size(published.original_size),
            format_file_size(published.final_size),
            savings_percent(published.original_size, published.final_size)
        );
    } else {
        info!("📊 Size: {}", format_file_size(published.final_size));
    }
    if let Some(count) = &published.usage_counter {
        info!("🔢 TinyPNG compression count: {}", count);
    }
    info!("🆔 Key: {}", published.key);
    info!("🌐 URL: {}", published.url);
    if published.copied {
        info!("📋 Copied to clipboard: {}", published.formatted_url);
    } else {
        warn!("Could not copy to clipboard, paste this instead:");
        println!("{}", published.formatted_url);
    }
}

/// Drives the batch progress bar.
struct BatchProgress {
    bar: ProgressBar,
}

impl BatchObserver for BatchProgress {
    fn item_started(&mut self, index: usize, total: usize, label: &str) {
        verbose!("[{}/{}] {}", index + 1, total, label);
    }

    fn stage(&mut self, _index: usize, stage: &Stage) {
        match stage {
            Stage::Compressing { filename, .. } => {
                self.bar.set_message(format!("Compressing {}", filename))
            }
            Stage::Uploading { filename, .. } => {
                self.bar.set_message(format!("Uploading {}", filename))
            }
            _ => {}
        }
    }

    fn item_finished(&mut self, _index: usize, outcome: &ItemOutcome) {
        if let ItemOutcome::Failure(failed) = outcome {
            if !logger::is_quiet() {
                self.bar
                    .println(format!("❌ Failed {}: {}", failed.source, failed.message()));
            }
        }
        self.bar.inc(1);
    }
}

async fn run_batch(
    settings: &Settings,
    inputs: &[String],
    recursive: bool,
    mode: CompressionMode,
    format: Option<UrlFormat>,
) -> anyhow::Result<()> {
    info!("🚀 Starting batch upload...");
    let candidates = collect_candidates(inputs, recursive)?;
    info!("📊 Found {} image files to process", candidates.len());

    let compressor = TinifyClient::new(settings.compression.timeout())?;
    let store = S3Uploader::new(&settings.store);
    let keys = KeyGenerator::system();
    let orchestrator = BatchOrchestrator::new(build_runner(
        settings,
        &compressor,
        &store,
        &keys,
        mode,
        format,
    ));

    let mut progress = BatchProgress {
        bar: create_progress_bar(candidates.len() as u64),
    };
    let report = orchestrator
        .run(&candidates, &SystemClipboard, &mut progress)
        .await?;
    progress.bar.finish_and_clear();

    match report {
        BatchReport::NoCandidates => {
            bail!("No images found (supported: PNG, JPG, WebP, GIF, SVG, BMP, ICO)")
        }
        BatchReport::Completed(summary) => {
            print_batch_summary(&summary);
            match summary.status() {
                BatchStatus::AllSucceeded => Ok(()),
                BatchStatus::PartialSuccess => {
                    warn!(
                        "{} of {} images failed",
                        summary.failed.len(),
                        summary.total()
                    );
                    Ok(())
                }
                BatchStatus::AllFailed => bail!("all {} uploads failed", summary.total()),
            }
        }
    }
}

fn print_batch_summary(summary: &BatchSummary) {
    if logger::is_quiet() {
        if !summary.succeeded.is_empty() {
            println!("{}", summary.clipboard_text());
        }
        return;
    }

    info!("\n📊 Batch Upload Summary:");
    info!("  ✅ Uploaded: {}", summary.succeeded.len());
    if !summary.failed.is_empty() {
        info!("  ❌ Failed: {}", summary.failed.len());
        for failed in &summary.failed {
            info!("     {}: {}", failed.source, failed.message());
        }
    }
    if !summary.succeeded.is_empty() {
        let saved = summary.saved_bytes();
        let saved_text = if saved >= 0 {
            format_file_size(saved as u64)
        } else {
            format!("-{}", format_file_size(saved.unsigned_abs()))
        };
        info!(
            "  📦 Total: {} → {} (saved {}, {})",
            format_file_size(summary.total_original_bytes),
            format_file_size(summary.total_final_bytes),
            saved_text,
            summary.savings_percent()
        );
        for published in &summary.succeeded {
            info!("  🌐 {}", published.url);
        }
        if summary.copied {
            info!("📋 URLs copied to clipboard");
        } else {
            warn!("Could not copy to clipboard, paste these instead:");
            println!("{}", summary.clipboard_text());
        }
    }
}
