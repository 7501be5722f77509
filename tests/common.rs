#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use img_publish::{
    ClipboardSink, CompressionPhase, CompressionResult, Compressor, ImageItem, ItemSource,
    KeyGenerator, ObjectStore, PublishError, Result, Settings,
};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Mutex;
use tempfile::TempDir;
use uuid::Uuid;

pub fn create_temp_directory() -> TempDir {
    TempDir::new().unwrap()
}

pub fn create_test_image_files(temp_dir: &Path) -> Vec<PathBuf> {
    let files = [
        ("a.png", b"fake png data".as_slice()),
        ("b.jpg", b"fake jpg data"),
        ("c.gif", b"fake gif data"),
        ("notes.txt", b"not an image"),
    ];

    files
        .iter()
        .map(|(name, data)| {
            let path = temp_dir.join(name);
            File::create(&path).unwrap().write_all(data).unwrap();
            path
        })
        .collect()
}

pub fn write_config(temp_dir: &Path, content: &str) -> PathBuf {
    let path = temp_dir.join("config.toml");
    File::create(&path)
        .unwrap()
        .write_all(content.as_bytes())
        .unwrap();
    path
}

pub fn test_settings(api_key: &str) -> Settings {
    let mut settings = Settings::from_toml_str(
        r#"
[store]
endpoint = "https://s3.example.com"
region = "us-east-1"
bucket = "images"
access_key_id = "AKID"
secret_access_key = "SECRET"
key_prefix = "shots/"

[output]
format = "markdown"
"#,
    )
    .unwrap();
    settings.compression.api_key = api_key.to_string();
    settings
}

/// Fixed clock; the UUID's first byte counts up so keys stay distinct.
pub fn fixed_keys() -> KeyGenerator {
    let counter = AtomicU32::new(0);
    KeyGenerator::with_sources(
        || Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap(),
        move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            Uuid::from_u128(((n as u128) << 96) | 0xabcd)
        },
    )
}

pub fn item(name: &str, len: usize) -> ImageItem {
    ImageItem::new(name, vec![7u8; len], name)
}

/// Halves its input, or fails with a preset error.
#[derive(Default)]
pub struct FakeCompressor {
    pub calls: AtomicUsize,
    pub reject_with: Option<u16>,
}

impl FakeCompressor {
    pub fn rejecting(status: u16) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            reject_with: Some(status),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Compressor for FakeCompressor {
    async fn compress(&self, input: &[u8], _api_key: &str) -> Result<CompressionResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(status) = self.reject_with {
            return Err(PublishError::compression(
                CompressionPhase::Submit,
                Some(status),
                "rejected",
            ));
        }
        let output = input[..input.len() / 2].to_vec();
        Ok(CompressionResult {
            before_size: input.len() as u64,
            after_size: output.len() as u64,
            output,
            usage_counter: Some("42".to_string()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    pub size: usize,
    pub content_type: String,
}

/// Records every put; the call numbered `fail_on` (1-based) errors instead.
#[derive(Default)]
pub struct RecordingStore {
    pub objects: Mutex<Vec<StoredObject>>,
    pub attempts: AtomicUsize,
    pub fail_on: Option<usize>,
}

impl RecordingStore {
    pub fn failing_on(call: usize) -> Self {
        Self {
            fail_on: Some(call),
            ..Self::default()
        }
    }

    pub fn stored(&self) -> Vec<StoredObject> {
        self.objects.lock().unwrap().clone()
    }

    pub fn attempt_count(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectStore for RecordingStore {
    async fn put_object(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<()> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on == Some(attempt) {
            return Err(PublishError::Upload("AccessDenied".to_string()));
        }
        self.objects.lock().unwrap().push(StoredObject {
            key: key.to_string(),
            size: body.len(),
            content_type: content_type.to_string(),
        });
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingClipboard {
    pub writes: Mutex<Vec<String>>,
    pub broken: bool,
}

impl RecordingClipboard {
    pub fn broken() -> Self {
        Self {
            broken: true,
            ..Self::default()
        }
    }

    pub fn written(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }
}

impl ClipboardSink for RecordingClipboard {
    fn write_text(&self, text: &str) -> Result<()> {
        if self.broken {
            return Err(PublishError::Clipboard("no display".to_string()));
        }
        self.writes.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

/// Counts acquisitions so tests can assert a source was never read.
pub struct CountingSource {
    pub inner: ImageItem,
    pub reads: AtomicUsize,
}

impl CountingSource {
    pub fn new(inner: ImageItem) -> Self {
        Self {
            inner,
            reads: AtomicUsize::new(0),
        }
    }

    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl ItemSource for CountingSource {
    fn label(&self) -> String {
        self.inner.source.clone()
    }

    fn acquire(&self) -> Result<ImageItem> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.inner.clone())
    }
}
