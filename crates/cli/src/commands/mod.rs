//! Command implementations.

pub mod catalog;
pub mod compare;

use product_compare_catalog::{CatalogClient, CatalogConfig, CatalogError, CompareStore, ConfigError};
use product_compare_core::RejectedOperation;
use thiserror::Error;

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("{0}")]
    Rejected(#[from] RejectedOperation),

    #[error("Catalog fetch failed: {0}")]
    FetchFailed(String),
}

/// Store and paging settings shared by every command.
pub struct Session {
    pub store: CompareStore<CatalogClient>,
    pub page_size: u32,
}

impl Session {
    /// Load configuration, apply command-line overrides and build the store.
    ///
    /// # Errors
    ///
    /// Returns error if configuration is invalid or the HTTP client fails to build.
    pub fn connect(base_url: Option<&str>, page_size: Option<u32>) -> Result<Self, CommandError> {
        let mut config = CatalogConfig::from_env()?;
        if let Some(base_url) = base_url {
            config.set_base_url(base_url)?;
        }
        if let Some(page_size) = page_size {
            config.set_page_size(page_size)?;
        }

        tracing::debug!(base_url = %config.base_url, page_size = config.page_size, "Using catalog");

        let client = CatalogClient::new(&config)?;
        Ok(Self {
            store: CompareStore::with_catalog_cap(client, config.max_products),
            page_size: config.page_size,
        })
    }

    /// Error recorded by the last failed request, or a generic message.
    #[must_use]
    pub fn last_error(&self) -> String {
        self.store
            .snapshot()
            .error
            .unwrap_or_else(|| "unknown error".to_string())
    }
}
