//! REST catalog API client.
//!
//! # Architecture
//!
//! - [`CatalogService`] is the seam between the comparison store and the network.
//!   The store only ever talks to this trait; tests drive it with in-memory fakes.
//! - [`CatalogClient`] implements it over HTTP with `reqwest`.
//! - No response caching at this layer. Every resolution is a fresh request,
//!   the store owns the cache of compared products.
//!
//! # Endpoints
//!
//! - `GET /products?limit=&skip=&sortBy=&order=` - one page of the catalog
//! - `GET /products/{id}` - a single product

mod client;
pub mod types;

pub use client::CatalogClient;
pub use types::*;

use std::future::Future;

use product_compare_core::{Product, ProductId};
use thiserror::Error;

/// Errors that can occur when talking to the catalog service.
///
/// Every variant is a network failure from the store's point of view: it is
/// recorded in the snapshot's `error` field and never terminates anything.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Service returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Product does not exist.
    #[error("Product not found: {0}")]
    NotFound(ProductId),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// The catalog operations the comparison store depends on.
pub trait CatalogService: Send + Sync {
    /// Fetch one page of the catalog.
    fn fetch_page(
        &self,
        request: &PageRequest,
    ) -> impl Future<Output = Result<ProductPage, CatalogError>> + Send;

    /// Fetch a single product by ID.
    fn fetch_product(
        &self,
        id: ProductId,
    ) -> impl Future<Output = Result<Product, CatalogError>> + Send;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_error_display() {
        let err = CatalogError::NotFound(ProductId::new(123).unwrap());
        assert_eq!(err.to_string(), "Product not found: 123");

        let err = CatalogError::Api {
            status: 503,
            message: "maintenance".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 503 - maintenance");
    }

    #[test]
    fn test_parse_error_from_serde() {
        let serde_err = serde_json::from_str::<ProductPage>("{").unwrap_err();
        let err = CatalogError::from(serde_err);
        assert!(err.to_string().starts_with("JSON parse error:"));
    }
}
