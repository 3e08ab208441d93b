//! HTTP implementation of [`CatalogService`] using `reqwest`.

use std::sync::Arc;

use product_compare_core::{Product, ProductId};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::{CatalogError, CatalogService, PageRequest, ProductPage};
use crate::config::CatalogConfig;

const USER_AGENT: &str = concat!("product-compare/", env!("CARGO_PKG_VERSION"));

/// Client for the REST catalog service.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    base_url: Url,
}

impl CatalogClient {
    /// Create a new catalog client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            inner: Arc::new(CatalogClientInner {
                client,
                base_url: config.base_url.clone(),
            }),
        })
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Fetch one page of products.
    ///
    /// An empty page past the end of the catalog is a normal response.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails, the service answers with a
    /// non-success status, or the body does not decode.
    #[instrument(skip(self), fields(limit = request.limit, skip = request.skip))]
    pub async fn get_products(&self, request: &PageRequest) -> Result<ProductPage, CatalogError> {
        let url = self.inner.base_url.join("products")?;
        let response = self.inner.client.get(url).query(request).send().await?;

        let page: ProductPage = Self::decode(response).await?;
        debug!(
            received = page.products.len(),
            total = page.total,
            "Fetched catalog page"
        );
        Ok(page)
    }

    /// Fetch a single product.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` on 404, otherwise the same errors as
    /// [`CatalogClient::get_products`].
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, CatalogError> {
        let url = self.inner.base_url.join(&format!("products/{id}"))?;
        let response = self.inner.client.get(url).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(id));
        }

        let product: Product = Self::decode(response).await?;
        debug!(title = %product.title, "Fetched product");
        Ok(product)
    }

    /// Check the status and decode a JSON body.
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, CatalogError> {
        let status = response.status();

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Catalog service returned non-success status"
            );
            return Err(CatalogError::Api {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::warn!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse catalog response"
            );
            CatalogError::Parse(e)
        })
    }
}

impl CatalogService for CatalogClient {
    async fn fetch_page(&self, request: &PageRequest) -> Result<ProductPage, CatalogError> {
        self.get_products(request).await
    }

    async fn fetch_product(&self, id: ProductId) -> Result<Product, CatalogError> {
        self.get_product(id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_client_keeps_normalized_base_url() {
        let config = CatalogConfig::with_base_url("http://127.0.0.1:9/api").unwrap();
        let client = CatalogClient::new(&config).unwrap();
        assert_eq!(client.base_url().as_str(), "http://127.0.0.1:9/api/");
    }

    #[tokio::test]
    async fn test_unreachable_service_is_http_error() {
        // Port 9 (discard) is not listening on loopback in test environments
        let config = CatalogConfig::with_base_url("http://127.0.0.1:9").unwrap();
        let client = CatalogClient::new(&config).unwrap();

        let err = client
            .get_products(&PageRequest::new(10, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Http(_)));
    }
}
