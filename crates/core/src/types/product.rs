//! The catalog product record.

use serde::{Deserialize, Serialize};

use super::{Price, ProductId};

/// A product as returned by the catalog service.
///
/// The client never mutates a product; it only caches copies. Fields the
/// service sends beyond these are ignored on decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Server-assigned identifier.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Plain text description.
    #[serde(default)]
    pub description: String,
    /// Unit price.
    pub price: Price,
    /// Brand name. Some catalog entries omit it.
    #[serde(default)]
    pub brand: String,
    /// Category slug.
    #[serde(default)]
    pub category: String,
}
