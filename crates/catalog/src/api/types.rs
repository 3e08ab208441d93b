//! Wire types for the catalog listing endpoint.

use product_compare_core::{Product, SortField, SortOrder};
use serde::{Deserialize, Serialize};

/// Query string for `GET /products`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    /// Page size.
    pub limit: u32,
    /// Number of products to skip.
    pub skip: u32,
    /// Field to sort by. Omitted for server order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<SortField>,
    /// Sort direction. Only sent together with `sort_by`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<SortOrder>,
}

impl PageRequest {
    /// Request `limit` products starting at `skip`, in server order.
    #[must_use]
    pub const fn new(limit: u32, skip: u32) -> Self {
        Self {
            limit,
            skip,
            sort_by: None,
            order: None,
        }
    }

    /// Sort by `field` in `order`.
    #[must_use]
    pub fn sorted(mut self, field: SortField, order: SortOrder) -> Self {
        self.sort_by = Some(field);
        self.order = Some(order);
        self
    }
}

/// Response body of `GET /products`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPage {
    /// Products in this page. Empty past the end of the catalog.
    pub products: Vec<Product>,
    /// Total number of products matching the query.
    pub total: u32,
    /// Offset of the first product in this page.
    pub skip: u32,
    /// Page size the server applied.
    pub limit: u32,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_request_omits_unset_sort() {
        let query = serde_json::to_value(PageRequest::new(10, 20)).unwrap();
        assert_eq!(query, serde_json::json!({"limit": 10, "skip": 20}));
    }

    #[test]
    fn test_request_uses_wire_names() {
        let request = PageRequest::new(5, 0).sorted(SortField::Price, SortOrder::Desc);
        let query = serde_json::to_value(request).unwrap();
        assert_eq!(
            query,
            serde_json::json!({"limit": 5, "skip": 0, "sortBy": "price", "order": "desc"})
        );
    }

    #[test]
    fn test_decode_empty_page() {
        let page: ProductPage =
            serde_json::from_str(r#"{"products": [], "total": 194, "skip": 200, "limit": 0}"#)
                .unwrap();
        assert!(page.products.is_empty());
        assert_eq!(page.total, 194);
    }
}
