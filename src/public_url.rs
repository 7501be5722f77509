use crate::config::{AddressingStyle, PublicUrlConfig, UrlFormat};
use crate::error::{PublishError, Result};
use reqwest::Url;

/// Joins a base URL and a key with exactly one slash between them.
pub fn join_url(base: &str, key: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        key.trim_start_matches('/')
    )
}

/// Public URL for an object that has already been stored under `key`.
///
/// A non-empty custom base wins outright. Otherwise the URL is derived from
/// the store endpoint, placing the bucket in the host (virtual) or in the
/// path (path).
pub fn build_public_url(config: &PublicUrlConfig, key: &str) -> Result<String> {
    if config.use_custom_base {
        if let Some(base) = config.custom_base.as_deref().filter(|b| !b.is_empty()) {
            return Ok(join_url(base, key));
        }
    }

    let endpoint = config.endpoint.trim_end_matches('/');
    let bucket = config.bucket.trim_matches('/');
    let key = key.trim_start_matches('/');

    match config.addressing_style {
        AddressingStyle::Virtual => {
            let mut url = Url::parse(endpoint).map_err(|e| {
                PublishError::Configuration(format!("invalid endpoint {:?}: {}", endpoint, e))
            })?;
            let host = url.host_str().map(str::to_owned).ok_or_else(|| {
                PublishError::Configuration(format!("endpoint {:?} has no host", endpoint))
            })?;
            url.set_host(Some(&format!("{}.{}", bucket, host)))
                .map_err(|e| {
                    PublishError::Configuration(format!("invalid bucket host {:?}: {}", bucket, e))
                })?;
            Ok(format!("{}/{}", url.origin().ascii_serialization(), key))
        }
        AddressingStyle::Path => Ok(format!("{}/{}/{}", endpoint, bucket, key)),
    }
}

pub fn format_url(url: &str, format: UrlFormat) -> String {
    match format {
        UrlFormat::Markdown => format!("![]({})", url),
        UrlFormat::BbCode => format!("[img]{}[/img]", url),
        UrlFormat::Raw => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_config(style: AddressingStyle) -> PublicUrlConfig {
        PublicUrlConfig {
            use_custom_base: false,
            custom_base: None,
            endpoint: "https://s3.example.com".to_string(),
            bucket: "images".to_string(),
            addressing_style: style,
        }
    }

    #[test]
    fn test_join_url_normalizes_slashes() {
        assert_eq!(join_url("https://cdn.example.com", "a.png"), "https://cdn.example.com/a.png");
        assert_eq!(join_url("https://cdn.example.com///", "//a.png"), "https://cdn.example.com/a.png");
    }

    #[test]
    fn test_custom_base() {
        let config = PublicUrlConfig {
            use_custom_base: true,
            custom_base: Some("https://cdn.example.com/img/".to_string()),
            ..store_config(AddressingStyle::Virtual)
        };
        let url = build_public_url(&config, "/shots/a.png").unwrap();
        assert_eq!(url, "https://cdn.example.com/img/shots/a.png");
    }

    #[test]
    fn test_custom_base_ignores_broken_endpoint() {
        let config = PublicUrlConfig {
            use_custom_base: true,
            custom_base: Some("https://cdn.example.com".to_string()),
            endpoint: "not a url".to_string(),
            bucket: String::new(),
            addressing_style: AddressingStyle::Virtual,
        };
        assert_eq!(
            build_public_url(&config, "a.png").unwrap(),
            "https://cdn.example.com/a.png"
        );
    }

    #[test]
    fn test_empty_custom_base_falls_back_to_endpoint() {
        let config = PublicUrlConfig {
            use_custom_base: true,
            custom_base: Some(String::new()),
            ..store_config(AddressingStyle::Path)
        };
        assert_eq!(
            build_public_url(&config, "a.png").unwrap(),
            "https://s3.example.com/images/a.png"
        );
    }

    #[test]
    fn test_custom_base_disabled_is_ignored() {
        let config = PublicUrlConfig {
            use_custom_base: false,
            custom_base: Some("https://cdn.example.com".to_string()),
            ..store_config(AddressingStyle::Path)
        };
        assert_eq!(
            build_public_url(&config, "a.png").unwrap(),
            "https://s3.example.com/images/a.png"
        );
    }

    #[test]
    fn test_path_style() {
        let mut config = store_config(AddressingStyle::Path);
        config.endpoint = "http://localhost:9000/".to_string();
        assert_eq!(
            build_public_url(&config, "/shots/a.png").unwrap(),
            "http://localhost:9000/images/shots/a.png"
        );
    }

    #[test]
    fn test_virtual_style() {
        let config = store_config(AddressingStyle::Virtual);
        assert_eq!(
            build_public_url(&config, "shots/a.png").unwrap(),
            "https://images.s3.example.com/shots/a.png"
        );
    }

    #[test]
    fn test_virtual_style_keeps_port() {
        let mut config = store_config(AddressingStyle::Virtual);
        config.endpoint = "http://minio.local:9000/".to_string();
        assert_eq!(
            build_public_url(&config, "a.png").unwrap(),
            "http://images.minio.local:9000/a.png"
        );
    }

    #[test]
    fn test_virtual_style_invalid_endpoint() {
        let mut config = store_config(AddressingStyle::Virtual);
        config.endpoint = "s3.example.com".to_string();
        assert!(matches!(
            build_public_url(&config, "a.png"),
            Err(PublishError::Configuration(_))
        ));
    }

    #[test]
    fn test_format_url() {
        let url = "https://cdn.example.com/a.png";
        assert_eq!(format_url(url, UrlFormat::Raw), url);
        assert_eq!(format_url(url, UrlFormat::Markdown), "![](https://cdn.example.com/a.png)");
        assert_eq!(
            format_url(url, UrlFormat::BbCode),
            "[img]https://cdn.example.com/a.png[/img]"
        );
    }
}
