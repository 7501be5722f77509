use crate::constants::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, ENV_ACCESS_KEY_ID, ENV_SECRET_ACCESS_KEY,
    ENV_TINIFY_API_KEY,
};
use crate::error::{PublishError, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Where the bucket name goes in a store URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressingStyle {
    /// `https://endpoint/bucket/key`
    #[default]
    Path,
    /// `https://bucket.endpoint/key`
    Virtual,
}

impl fmt::Display for AddressingStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressingStyle::Path => write!(f, "path"),
            AddressingStyle::Virtual => write!(f, "virtual"),
        }
    }
}

impl FromStr for AddressingStyle {
    type Err = PublishError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "path" => Ok(AddressingStyle::Path),
            "virtual" => Ok(AddressingStyle::Virtual),
            _ => Err(PublishError::Configuration(format!(
                "unknown addressing style: {}",
                s
            ))),
        }
    }
}

/// Text rendering of a published URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrlFormat {
    #[default]
    Raw,
    Markdown,
    #[serde(rename = "bbcode")]
    BbCode,
}

impl UrlFormat {
    pub fn format_names() -> Vec<&'static str> {
        vec!["raw", "markdown", "bbcode"]
    }
}

impl fmt::Display for UrlFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UrlFormat::Raw => "raw",
            UrlFormat::Markdown => "markdown",
            UrlFormat::BbCode => "bbcode",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for UrlFormat {
    type Err = PublishError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "raw" => Ok(UrlFormat::Raw),
            "markdown" | "md" => Ok(UrlFormat::Markdown),
            "bbcode" => Ok(UrlFormat::BbCode),
            _ => Err(PublishError::Configuration(format!(
                "unknown URL format: {} (expected one of: {})",
                s,
                UrlFormat::format_names().join(", ")
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub endpoint: String,
    pub region: String,
    pub bucket: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub key_prefix: String,
    pub addressing_style: AddressingStyle,
}

impl StoreConfig {
    /// The S3 client addresses buckets by path when the configured style is path.
    pub fn force_path_style(&self) -> bool {
        self.addressing_style == AddressingStyle::Path
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PublicUrlSettings {
    pub use_custom_base: bool,
    pub custom_base: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub format: UrlFormat,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionSettings {
    pub api_key: String,
    /// Unset means the HTTP client's own default applies.
    pub timeout_secs: Option<u64>,
}

impl CompressionSettings {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

/// Everything the pipeline needs, passed in explicitly and never mutated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub store: StoreConfig,
    pub public_url: PublicUrlSettings,
    pub output: OutputSettings,
    pub compression: CompressionSettings,
}

/// Inputs for deriving the public URL of a stored key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicUrlConfig {
    pub use_custom_base: bool,
    pub custom_base: Option<String>,
    pub endpoint: String,
    pub bucket: String,
    pub addressing_style: AddressingStyle,
}

impl Settings {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| PublishError::Configuration(format!("invalid config file: {}", e)))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PublishError::FileNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Loads the file (explicit path or the default location) and applies
    /// environment overrides for the secrets.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => default_config_path()?,
        };
        let mut settings = Self::load(&path)?;
        settings.apply_env_overrides(|name| std::env::var(name).ok());
        Ok(settings)
    }

    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(ENV_TINIFY_API_KEY).filter(|v| !v.is_empty()) {
            self.compression.api_key = key;
        }
        if let Some(id) = lookup(ENV_ACCESS_KEY_ID).filter(|v| !v.is_empty()) {
            self.store.access_key_id = id;
        }
        if let Some(secret) = lookup(ENV_SECRET_ACCESS_KEY).filter(|v| !v.is_empty()) {
            self.store.secret_access_key = secret;
        }
    }

    /// Checks the store settings before any network call.
    ///
    /// The endpoint must be an absolute URL with a host, and bucket, region
    /// and both store credentials must be non-empty.
    pub fn validate(&self) -> Result<()> {
        let endpoint = self.store.endpoint.trim();
        if endpoint.is_empty() {
            return Err(PublishError::Configuration(
                "store.endpoint is not set".to_string(),
            ));
        }
        let has_host = Url::parse(endpoint)
            .map(|url| url.host_str().is_some_and(|h| !h.is_empty()))
            .unwrap_or(false);
        if !has_host {
            return Err(PublishError::Configuration(format!(
                "store.endpoint {:?} is not an absolute URL (e.g. https://s3.example.com)",
                endpoint
            )));
        }
        if self.store.bucket.trim().is_empty() {
            return Err(PublishError::Configuration(
                "store.bucket is not set".to_string(),
            ));
        }
        if self.store.region.trim().is_empty() {
            return Err(PublishError::Configuration(
                "store.region is not set".to_string(),
            ));
        }
        if self.store.access_key_id.trim().is_empty() {
            return Err(PublishError::MissingCredential(format!(
                "store.access_key_id is not set (or export {})",
                ENV_ACCESS_KEY_ID
            )));
        }
        if self.store.secret_access_key.trim().is_empty() {
            return Err(PublishError::MissingCredential(format!(
                "store.secret_access_key is not set (or export {})",
                ENV_SECRET_ACCESS_KEY
            )));
        }
        Ok(())
    }

    pub fn public_url_config(&self) -> PublicUrlConfig {
        PublicUrlConfig {
            use_custom_base: self.public_url.use_custom_base,
            custom_base: self.public_url.custom_base.clone(),
            endpoint: self.store.endpoint.clone(),
            bucket: self.store.bucket.clone(),
            addressing_style: self.store.addressing_style,
        }
    }
}

pub fn default_config_path() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
        .ok_or_else(|| {
            PublishError::Configuration("cannot determine the user config directory".to_string())
        })
}
