use crate::constants::{COMPRESSION_COUNT_HEADER, TINIFY_API_USER, TINIFY_SHRINK_URL};
use crate::error::{CompressionPhase, PublishError, Result};
use async_trait::async_trait;
use reqwest::header::LOCATION;
use reqwest::{Client, Response};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressionResult {
    pub output: Vec<u8>,
    pub before_size: u64,
    /// Always `output.len()`.
    pub after_size: u64,
    /// `Compression-Count` as sent by the service, unparsed.
    pub usage_counter: Option<String>,
}

/// A lossy compression backend.
#[async_trait]
pub trait Compressor: Send + Sync {
    async fn compress(&self, input: &[u8], api_key: &str) -> Result<CompressionResult>;
}

/// Client for the Tinify (TinyPNG) shrink API.
///
/// One call is two requests: POST the image to `/shrink`, then GET the
/// `Location` it answers with. Nothing is retried.
#[derive(Debug, Clone)]
pub struct TinifyClient {
    http: Client,
    shrink_url: String,
}

impl TinifyClient {
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(|e| {
            PublishError::Configuration(format!("failed to build HTTP client: {}", e))
        })?;
        Ok(Self {
            http,
            shrink_url: TINIFY_SHRINK_URL.to_string(),
        })
    }

    /// Points the client at a different submit endpoint.
    pub fn with_shrink_url(mut self, url: impl Into<String>) -> Self {
        self.shrink_url = url.into();
        self
    }

    async fn submit(&self, input: &[u8], api_key: &str) -> Result<(String, Option<String>)> {
        let phase = CompressionPhase::Submit;
        let response = self
            .http
            .post(&self.shrink_url)
            .basic_auth(TINIFY_API_USER, Some(api_key))
            .body(input.to_vec())
            .send()
            .await
            .map_err(|e| PublishError::compression(phase, None, e.to_string()))?;
        let response = ensure_success(response, phase).await?;

        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
            .ok_or_else(|| PublishError::compression(phase, None, "missing location"))?;
        let usage_counter = response
            .headers()
            .get(COMPRESSION_COUNT_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        Ok((location, usage_counter))
    }

    async fn download(&self, location: &str, api_key: &str) -> Result<Vec<u8>> {
        let phase = CompressionPhase::Download;
        let response = self
            .http
            .get(location)
            .basic_auth(TINIFY_API_USER, Some(api_key))
            .send()
            .await
            .map_err(|e| PublishError::compression(phase, None, e.to_string()))?;
        let response = ensure_success(response, phase).await?;

        let body = response
            .bytes()
            .await
            .map_err(|e| PublishError::compression(phase, None, e.to_string()))?;
        Ok(body.to_vec())
    }
}

async fn ensure_success(response: Response, phase: CompressionPhase) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(PublishError::compression(phase, Some(status.as_u16()), body))
}

#[async_trait]
impl Compressor for TinifyClient {
    async fn compress(&self, input: &[u8], api_key: &str) -> Result<CompressionResult> {
        debug!(bytes = input.len(), "submitting image for compression");
        let (location, usage_counter) = self.submit(input, api_key).await?;

        debug!(%location, "downloading compressed image");
        let output = self.download(&location, api_key).await?;

        Ok(CompressionResult {
            before_size: input.len() as u64,
            after_size: output.len() as u64,
            output,
            usage_counter,
        })
    }
}
