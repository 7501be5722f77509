//! Single-item processing: acquire, optionally compress, upload, publish.
//!
//! Stages only move forward. The first error ends the run as a failure; by
//! the time `Publishing` is reached the object is already in the store.

use crate::clipboard::ClipboardSink;
use crate::compress::Compressor;
use crate::config::{Settings, UrlFormat};
use crate::error::{PublishError, Result};
use crate::key::KeyGenerator;
use crate::public_url::{build_public_url, format_url};
use crate::source::{is_compressible, ItemSource};
use crate::store::{content_type, ObjectStore};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Acquiring,
    Compressing {
        filename: String,
        original_size: u64,
    },
    Uploading {
        filename: String,
        original_size: u64,
        final_size: u64,
    },
    Publishing {
        key: String,
    },
    Done {
        success: bool,
    },
}

pub trait ProgressObserver {
    fn on_stage(&mut self, stage: &Stage);
}

impl<F: FnMut(&Stage)> ProgressObserver for F {
    fn on_stage(&mut self, stage: &Stage) {
        self(stage)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMode {
    /// Compress every item the service supports.
    Compress,
    /// Upload original bytes.
    Direct,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    pub source: String,
    pub filename: String,
    pub key: String,
    pub url: String,
    pub formatted_url: String,
    pub original_size: u64,
    pub final_size: u64,
    pub compressed: bool,
    pub usage_counter: Option<String>,
    /// Set once `formatted_url` has actually reached the clipboard.
    pub copied: bool,
}

#[derive(Debug)]
pub struct Failed {
    pub source: String,
    pub error: PublishError,
}

impl Failed {
    pub fn message(&self) -> String {
        self.error.to_string()
    }
}

#[derive(Debug)]
pub enum ItemOutcome {
    Success(Published),
    Failure(Failed),
}

impl ItemOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ItemOutcome::Success(_))
    }
}

pub struct PipelineRunner<'a> {
    settings: &'a Settings,
    compressor: &'a dyn Compressor,
    store: &'a dyn ObjectStore,
    keys: &'a KeyGenerator,
    mode: CompressionMode,
    format: UrlFormat,
}

impl<'a> PipelineRunner<'a> {
    pub fn new(
        settings: &'a Settings,
        compressor: &'a dyn Compressor,
        store: &'a dyn ObjectStore,
        keys: &'a KeyGenerator,
        mode: CompressionMode,
    ) -> Self {
        Self {
            settings,
            compressor,
            store,
            keys,
            mode,
            format: settings.output.format,
        }
    }

    /// Overrides the configured URL format.
    pub fn with_format(mut self, format: UrlFormat) -> Self {
        self.format = format;
        self
    }

    /// Fails when this run compresses but no API key is configured.
    pub fn check_credentials(&self) -> Result<()> {
        match self.mode {
            CompressionMode::Compress => self.api_key().map(|_| ()),
            CompressionMode::Direct => Ok(()),
        }
    }

    fn api_key(&self) -> Result<&str> {
        if self.settings.compression.has_api_key() {
            Ok(self.settings.compression.api_key.trim())
        } else {
            Err(PublishError::MissingCredential(
                "compression API key is not configured".to_string(),
            ))
        }
    }

    /// Runs one item to completion; the outcome is never an `Err`.
    pub async fn process(
        &self,
        source: &dyn ItemSource,
        observer: &mut dyn ProgressObserver,
    ) -> ItemOutcome {
        let outcome = self.execute(source, observer).await;
        observer.on_stage(&Stage::Done {
            success: outcome.is_success(),
        });
        outcome
    }

    /// Interactive variant: on success the formatted URL is put on the
    /// clipboard before `Done` is reported. A failed write leaves the item
    /// successful with `copied` unset.
    pub async fn run_interactive(
        &self,
        source: &dyn ItemSource,
        clipboard: &dyn ClipboardSink,
        observer: &mut dyn ProgressObserver,
    ) -> ItemOutcome {
        observer.on_stage(&Stage::Idle);
        let mut outcome = match self.check_credentials() {
            Ok(()) => self.execute(source, observer).await,
            Err(error) => ItemOutcome::Failure(Failed {
                source: source.label(),
                error,
            }),
        };

        if let ItemOutcome::Success(published) = &mut outcome {
            match clipboard.write_text(&published.formatted_url) {
                Ok(()) => published.copied = true,
                Err(e) => warn!(error = %e, "could not copy URL to clipboard"),
            }
        }

        observer.on_stage(&Stage::Done {
            success: outcome.is_success(),
        });
        outcome
    }

    async fn execute(
        &self,
        source: &dyn ItemSource,
        observer: &mut dyn ProgressObserver,
    ) -> ItemOutcome {
        match self.try_execute(source, observer).await {
            Ok(published) => ItemOutcome::Success(published),
            Err(error) => {
                debug!(source = %source.label(), %error, "item failed");
                ItemOutcome::Failure(Failed {
                    source: source.label(),
                    error,
                })
            }
        }
    }

    async fn try_execute(
        &self,
        source: &dyn ItemSource,
        observer: &mut dyn ProgressObserver,
    ) -> Result<Published> {
        observer.on_stage(&Stage::Acquiring);
        let item = source.acquire()?;
        if item.bytes.is_empty() {
            return Err(PublishError::NoInput);
        }
        let original_size = item.size();
        let compress = self.mode == CompressionMode::Compress && is_compressible(&item.extension);

        let (body, usage_counter) = if compress {
            let api_key = self.api_key()?;
            observer.on_stage(&Stage::Compressing {
                filename: item.filename.clone(),
                original_size,
            });
            let result = self.compressor.compress(&item.bytes, api_key).await?;
            (result.output, result.usage_counter)
        } else {
            (item.bytes, None)
        };
        let final_size = body.len() as u64;

        let key = self
            .keys
            .generate(&self.settings.store.key_prefix, &item.extension);
        observer.on_stage(&Stage::Uploading {
            filename: item.filename.clone(),
            original_size,
            final_size,
        });
        self.store
            .put_object(&key, body, content_type(&item.extension))
            .await?;
        debug!(%key, original_size, final_size, "uploaded");

        observer.on_stage(&Stage::Publishing { key: key.clone() });
        let url = build_public_url(&self.settings.public_url_config(), &key)?;
        let formatted_url = format_url(&url, self.format);

        Ok(Published {
            source: item.source,
            filename: item.filename,
            key,
            url,
            formatted_url,
            original_size,
            final_size,
            compressed: compress,
            usage_counter,
            copied: false,
        })
    }
}
