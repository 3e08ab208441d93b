//! Product Compare Catalog - API client and comparison store.
//!
//! # Architecture
//!
//! - [`api`] - `reqwest` client for the REST catalog (`/products`, `/products/{id}`)
//!   behind the [`api::CatalogService`] trait so the store can be driven by fakes
//! - [`cursor`] - Pagination cursor tracking page, page size, sort and filters
//! - [`store`] - The comparison store: selection, resolved products, accumulated
//!   catalog pages, loading/error/total flags, published as immutable snapshots
//! - [`config`] - Configuration loaded from environment variables
//!
//! # Example
//!
//! ```rust,ignore
//! use product_compare_catalog::{CatalogClient, CatalogConfig, CompareStore, PaginationCursor};
//!
//! let config = CatalogConfig::from_env()?;
//! let store = CompareStore::new(CatalogClient::new(&config)?);
//!
//! let mut cursor = PaginationCursor::new(config.page_size);
//! store.fetch_page(&mut cursor).await;
//!
//! store.add_and_resolve(product_id).await?;
//! let snapshot = store.snapshot();
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod cursor;
pub mod store;

pub use api::{CatalogClient, CatalogError, CatalogService, PageRequest, ProductPage};
pub use config::{CatalogConfig, ConfigError};
pub use cursor::{CatalogQuery, PaginationCursor};
pub use store::{
    Added, ComparisonView, CompareStore, FetchOutcome, FetchTicket, Notice, NoticeLevel,
    Resolution, StoreSnapshot, Toggled,
};
