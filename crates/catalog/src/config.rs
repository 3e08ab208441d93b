//! Catalog configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `CATALOG_BASE_URL` - Base URL of the catalog service (default: <https://dummyjson.com>)
//! - `CATALOG_PAGE_SIZE` - Products per page, 1 to 100 (default: 10)
//! - `CATALOG_MAX_PRODUCTS` - Cap on accumulated catalog products (default: unbounded)

use thiserror::Error;
use url::Url;

/// Default catalog service.
pub const DEFAULT_BASE_URL: &str = "https://dummyjson.com";

/// Default number of products per page.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Largest page size accepted.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("Invalid page size {0}: must be between 1 and {MAX_PAGE_SIZE}")]
    InvalidPageSize(u32),
}

/// Catalog client configuration.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Base URL of the catalog service, always ending in `/`
    pub base_url: Url,
    /// Products requested per page
    pub page_size: u32,
    /// Optional cap on the accumulated catalog
    pub max_products: Option<usize>,
}

impl CatalogConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let base_url = parse_base_url(&get_env_or_default("CATALOG_BASE_URL", DEFAULT_BASE_URL))?;

        let page_size = get_env_or_default("CATALOG_PAGE_SIZE", "10")
            .parse::<u32>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("CATALOG_PAGE_SIZE".to_string(), e.to_string())
            })?;
        let page_size = validate_page_size(page_size)?;

        let max_products = get_optional_env("CATALOG_MAX_PRODUCTS")
            .map(|value| {
                value.parse::<usize>().map_err(|e| {
                    ConfigError::InvalidEnvVar("CATALOG_MAX_PRODUCTS".to_string(), e.to_string())
                })
            })
            .transpose()?;

        Ok(Self {
            base_url,
            page_size,
            max_products,
        })
    }

    /// Configuration pointing at `base_url` with default paging.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidBaseUrl` if the URL does not parse or is
    /// not http(s).
    pub fn with_base_url(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            page_size: DEFAULT_PAGE_SIZE,
            max_products: None,
        })
    }

    /// Override the base URL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidBaseUrl` if the URL does not parse or is
    /// not http(s).
    pub fn set_base_url(&mut self, base_url: &str) -> Result<(), ConfigError> {
        self.base_url = parse_base_url(base_url)?;
        Ok(())
    }

    /// Override the page size.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidPageSize` outside `1..=MAX_PAGE_SIZE`.
    pub fn set_page_size(&mut self, page_size: u32) -> Result<(), ConfigError> {
        self.page_size = validate_page_size(page_size)?;
        Ok(())
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse a base URL, normalizing the path to end in `/` so relative joins
/// append instead of replacing the last segment.
fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidBaseUrl(e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidBaseUrl(format!(
            "unsupported scheme '{}'",
            url.scheme()
        )));
    }
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidBaseUrl(raw.to_string()));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);

    Ok(url)
}

const fn validate_page_size(page_size: u32) -> Result<u32, ConfigError> {
    if page_size == 0 || page_size > MAX_PAGE_SIZE {
        return Err(ConfigError::InvalidPageSize(page_size));
    }
    Ok(page_size)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_points_at_dummyjson() {
        let config = CatalogConfig::with_base_url(DEFAULT_BASE_URL).unwrap();
        assert_eq!(config.base_url.as_str(), "https://dummyjson.com/");
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
        assert!(config.max_products.is_none());
    }

    #[test]
    fn test_parse_base_url_adds_trailing_slash() {
        let url = parse_base_url("http://127.0.0.1:8080/api").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/api/");
        assert_eq!(
            url.join("products/3").unwrap().as_str(),
            "http://127.0.0.1:8080/api/products/3"
        );
    }

    #[test]
    fn test_parse_base_url_strips_query() {
        let url = parse_base_url("https://dummyjson.com/?limit=5#top").unwrap();
        assert_eq!(url.as_str(), "https://dummyjson.com/");
    }

    #[test]
    fn test_parse_base_url_rejects_other_schemes() {
        let err = parse_base_url("ftp://example.com").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBaseUrl(_)));
        assert!(parse_base_url("not a url").is_err());
    }

    #[test]
    fn test_page_size_bounds() {
        assert!(validate_page_size(0).is_err());
        assert!(validate_page_size(1).is_ok());
        assert!(validate_page_size(MAX_PAGE_SIZE).is_ok());
        assert!(validate_page_size(MAX_PAGE_SIZE + 1).is_err());
    }

    #[test]
    fn test_set_page_size_keeps_old_value_on_error() {
        let mut config = CatalogConfig::with_base_url(DEFAULT_BASE_URL).unwrap();
        assert!(config.set_page_size(500).is_err());
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
        config.set_page_size(25).unwrap();
        assert_eq!(config.page_size, 25);
    }
}
