use crate::config::StoreConfig;
use crate::constants::GENERIC_CONTENT_TYPE;
use crate::error::{PublishError, Result};
use async_trait::async_trait;
use aws_sdk_s3::config::retry::RetryConfig;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::debug;

/// Content type for a file extension, compared case-insensitively.
pub fn content_type(extension: &str) -> &'static str {
    match extension.to_lowercase().as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        "ico" => "image/x-icon",
        _ => GENERIC_CONTENT_TYPE,
    }
}

/// Write-only view of an object store: one put per object, all or nothing.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put_object(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<()>;
}

/// Uploads to any S3-compatible endpoint (AWS, MinIO, R2, ...).
#[derive(Debug, Clone)]
pub struct S3Uploader {
    client: Client,
    bucket: String,
}

impl S3Uploader {
    pub fn new(config: &StoreConfig) -> Self {
        let credentials = Credentials::new(
            config.access_key_id.clone(),
            config.secret_access_key.clone(),
            None,
            None,
            "img-publish",
        );
        let s3_config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .endpoint_url(config.endpoint.trim_end_matches('/'))
            .credentials_provider(credentials)
            .force_path_style(config.force_path_style())
            .retry_config(RetryConfig::disabled())
            .build();

        Self {
            client: Client::from_conf(s3_config),
            bucket: config.bucket.clone(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3Uploader {
    async fn put_object(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<()> {
        debug!(bucket = %self.bucket, key, bytes = body.len(), content_type, "putting object");
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| PublishError::Upload(DisplayErrorContext(&e).to_string()))?;
        Ok(())
    }
}

/// One-shot upload: opens a session from `config` and puts a single object.
pub async fn upload(
    config: &StoreConfig,
    key: &str,
    body: Vec<u8>,
    content_type: &str,
) -> Result<()> {
    S3Uploader::new(config)
        .put_object(key, body, content_type)
        .await
}
