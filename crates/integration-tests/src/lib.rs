//! Integration test support for Product Compare.
//!
//! [`MockCatalog`] serves the two catalog endpoints the client uses on a
//! random loopback port:
//!
//! - `GET /products?limit=&skip=&sortBy=&order=`
//! - `GET /products/{id}`
//!
//! It records every request and can be told to fail the next N requests.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p product-compare-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::cmp::Ordering;
use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use product_compare_catalog::CatalogConfig;
use product_compare_core::{Price, Product, ProductId};
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::{Mutex, watch};

/// Page size the service uses when `limit` is omitted.
pub const SERVICE_DEFAULT_LIMIT: usize = 30;

const BRANDS: [&str; 4] = ["Essence", "Glamour Beauty", "Velvet Touch", ""];
const CATEGORIES: [&str; 3] = ["beauty", "fragrances", "groceries"];

/// A request seen by the mock, for assertions.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub path: String,
    pub query: HashMap<String, String>,
}

#[derive(Default)]
struct MockState {
    products: Vec<Product>,
    requests: Vec<CapturedRequest>,
    failures: VecDeque<StatusCode>,
}

type SharedState = Arc<Mutex<MockState>>;

/// In-process catalog service.
pub struct MockCatalog {
    pub addr: SocketAddr,
    state: SharedState,
    shutdown: watch::Sender<bool>,
}

impl MockCatalog {
    /// Start a mock serving `products`.
    ///
    /// # Errors
    ///
    /// Returns error if the listener cannot bind.
    pub async fn start(products: Vec<Product>) -> std::io::Result<Self> {
        let state: SharedState = Arc::new(Mutex::new(MockState {
            products,
            ..MockState::default()
        }));

        let app = Router::new()
            .route("/products", get(list_products))
            .route("/products/{id}", get(get_product))
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let (shutdown, mut shutdown_rx) = watch::channel(false);
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.changed().await;
                })
                .await
                .ok();
        });

        Ok(Self {
            addr,
            state,
            shutdown,
        })
    }

    /// Start a mock serving [`sample_products`]`(count)`.
    ///
    /// # Errors
    ///
    /// Returns error if the listener cannot bind.
    pub async fn with_products(count: u32) -> std::io::Result<Self> {
        Self::start(sample_products(count)).await
    }

    /// Base URL of the mock.
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Client configuration pointing at the mock.
    ///
    /// # Errors
    ///
    /// Returns error if the page size is out of range.
    pub fn config(
        &self,
        page_size: u32,
    ) -> Result<CatalogConfig, product_compare_catalog::ConfigError> {
        let mut config = CatalogConfig::with_base_url(&self.url())?;
        config.set_page_size(page_size)?;
        Ok(config)
    }

    /// Answer the next `count` requests with `status`.
    pub async fn fail_next(&self, count: usize, status: StatusCode) {
        let mut state = self.state.lock().await;
        state.failures.extend(std::iter::repeat_n(status, count));
    }

    /// Every request received so far.
    pub async fn requests(&self) -> Vec<CapturedRequest> {
        self.state.lock().await.requests.clone()
    }

    /// Number of requests to `path`.
    pub async fn request_count(&self, path: &str) -> usize {
        self.state
            .lock()
            .await
            .requests
            .iter()
            .filter(|r| r.path == path)
            .count()
    }
}

impl Drop for MockCatalog {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
    }
}

/// `count` products with IDs `1..=count`, varied titles, prices, brands and
/// categories. Every fourth product has no brand.
#[must_use]
pub fn sample_products(count: u32) -> Vec<Product> {
    (1..=count)
        .filter_map(|n| {
            let id = ProductId::new(n)?;
            // Prices descend as IDs rise so price order differs from ID order
            let cents = i64::from(count + 1 - n) * 150 + 99;
            let price = Price::from_cents(cents).ok()?;
            let idx = n as usize;
            Some(Product {
                id,
                title: format!("Product {n:03}"),
                description: format!("Description of product {n}"),
                price,
                brand: pick(&BRANDS, idx).to_string(),
                category: pick(&CATEGORIES, idx).to_string(),
            })
        })
        .collect()
}

fn pick(values: &[&'static str], idx: usize) -> &'static str {
    values.get(idx % values.len()).copied().unwrap_or_default()
}

// =============================================================================
// Handlers
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListParams {
    limit: Option<usize>,
    skip: Option<usize>,
    sort_by: Option<String>,
    order: Option<String>,
}

async fn record(state: &SharedState, uri: &Uri) -> Option<StatusCode> {
    let query = uri
        .query()
        .map(|q| {
            q.split('&')
                .filter_map(|pair| pair.split_once('='))
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect()
        })
        .unwrap_or_default();

    let mut state = state.lock().await;
    state.requests.push(CapturedRequest {
        path: uri.path().to_string(),
        query,
    });
    state.failures.pop_front()
}

fn failure(status: StatusCode) -> Response {
    (status, Json(json!({ "message": "Injected failure" }))).into_response()
}

async fn list_products(
    State(state): State<SharedState>,
    uri: Uri,
    Query(params): Query<ListParams>,
) -> Response {
    if let Some(status) = record(&state, &uri).await {
        return failure(status);
    }

    let mut products = state.lock().await.products.clone();
    if let Some(field) = params.sort_by.as_deref() {
        products.sort_by(|a, b| compare_field(field, a, b));
        if params.order.as_deref() == Some("desc") {
            products.reverse();
        }
    }

    let total = products.len();
    let limit = params.limit.unwrap_or(SERVICE_DEFAULT_LIMIT);
    let skip = params.skip.unwrap_or(0);
    let page: Vec<Product> = products.into_iter().skip(skip).take(limit).collect();

    Json(json!({
        "products": page,
        "total": total,
        "skip": skip,
        "limit": page.len(),
    }))
    .into_response()
}

async fn get_product(
    State(state): State<SharedState>,
    uri: Uri,
    Path(id): Path<u32>,
) -> Response {
    if let Some(status) = record(&state, &uri).await {
        return failure(status);
    }

    let found = state
        .lock()
        .await
        .products
        .iter()
        .find(|p| p.id.as_u32() == id)
        .cloned();

    match found {
        Some(product) => Json(product).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": format!("Product with id '{id}' not found") })),
        )
            .into_response(),
    }
}

fn compare_field(field: &str, a: &Product, b: &Product) -> Ordering {
    match field {
        "title" => a.title.cmp(&b.title),
        "price" => a.price.amount().cmp(&b.price.amount()),
        "brand" => a.brand.cmp(&b.brand),
        "category" => a.category.cmp(&b.category),
        _ => a.id.cmp(&b.id),
    }
}
