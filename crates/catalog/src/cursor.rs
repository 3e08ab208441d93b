//! Pagination cursor for the catalog listing.
//!
//! The cursor holds `{page, page_size, sort_field, sort_order, filters}` plus the
//! total reported by the server. Pages are 1-based; `skip` on the wire is
//! `(page - 1) * page_size`.
//!
//! Changing sort, filters or page size starts a new query: the store clears the
//! accumulated catalog before applying the next page. Advancing `page` keeps the
//! query and appends.

use std::collections::BTreeMap;

use product_compare_core::{SortField, SortOrder};

use crate::api::PageRequest;

/// The parts of a cursor that identify a query.
///
/// Two fetches with equal `CatalogQuery` values accumulate into the same list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CatalogQuery {
    pub page_size: u32,
    pub sort: Option<(SortField, SortOrder)>,
    pub filters: BTreeMap<String, Vec<String>>,
}

/// Tracks the catalog position a view is looking at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationCursor {
    page: u32,
    page_size: u32,
    sort_field: Option<SortField>,
    sort_order: SortOrder,
    filters: BTreeMap<String, Vec<String>>,
    total: Option<u32>,
}

impl PaginationCursor {
    /// Cursor at page 1 in server order. A page size of zero is treated as one.
    #[must_use]
    pub fn new(page_size: u32) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            sort_field: None,
            sort_order: SortOrder::default(),
            filters: BTreeMap::new(),
            total: None,
        }
    }

    /// Cursor at `page`, sorted by `field` if given.
    #[must_use]
    pub fn at(page_size: u32, page: u32, field: Option<SortField>, order: Option<SortOrder>) -> Self {
        let mut cursor = Self::new(page_size);
        cursor.set_sort(field, order.unwrap_or_default());
        cursor.go_to_page(page);
        cursor
    }

    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    #[must_use]
    pub const fn sort_field(&self) -> Option<SortField> {
        self.sort_field
    }

    #[must_use]
    pub const fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    #[must_use]
    pub const fn filters(&self) -> &BTreeMap<String, Vec<String>> {
        &self.filters
    }

    /// Total reported by the last applied page, if any.
    #[must_use]
    pub const fn total(&self) -> Option<u32> {
        self.total
    }

    /// Offset of the first product on the current page.
    #[must_use]
    pub const fn skip(&self) -> u32 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    /// Wire request for the current page.
    #[must_use]
    pub fn request(&self) -> PageRequest {
        let request = PageRequest::new(self.page_size, self.skip());
        match self.sort_field {
            Some(field) => request.sorted(field, self.sort_order),
            None => request,
        }
    }

    /// Identity of the current query, ignoring the page number.
    #[must_use]
    pub fn query(&self) -> CatalogQuery {
        CatalogQuery {
            page_size: self.page_size,
            sort: self.sort_field.map(|field| (field, self.sort_order)),
            filters: self.filters.clone(),
        }
    }

    /// Number of pages, once a total is known.
    #[must_use]
    pub const fn total_pages(&self) -> Option<u32> {
        match self.total {
            Some(total) => Some(total.div_ceil(self.page_size)),
            None => None,
        }
    }

    /// Whether a page after the current one exists. True until a total is known.
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.total_pages().is_none_or(|pages| self.page < pages)
    }

    /// Advance to the next page and return its number. Does not stop at the
    /// last page; a page past the end simply comes back empty.
    pub const fn next_page(&mut self) -> u32 {
        self.page = self.page.saturating_add(1);
        self.page
    }

    /// Jump to `page` (clamped to at least 1) within the same query.
    pub fn go_to_page(&mut self, page: u32) {
        self.page = page.max(1);
    }

    /// Change the sort. Returns whether the query changed; if it did, the
    /// cursor goes back to page 1 and forgets the total.
    pub fn set_sort(&mut self, field: Option<SortField>, order: SortOrder) -> bool {
        let before = self.query();
        self.sort_field = field;
        self.sort_order = order;
        self.restart_if_changed(&before)
    }

    /// Set the accepted values for a filter key. An empty `values` removes the
    /// filter. Returns whether the query changed.
    pub fn set_filter(&mut self, key: impl Into<String>, values: Vec<String>) -> bool {
        let before = self.query();
        let key = key.into();
        if values.is_empty() {
            self.filters.remove(&key);
        } else {
            self.filters.insert(key, values);
        }
        self.restart_if_changed(&before)
    }

    /// Drop all filters. Returns whether the query changed.
    pub fn clear_filters(&mut self) -> bool {
        let before = self.query();
        self.filters.clear();
        self.restart_if_changed(&before)
    }

    /// Change the page size. Returns whether the query changed.
    pub fn set_page_size(&mut self, page_size: u32) -> bool {
        let before = self.query();
        self.page_size = page_size.max(1);
        self.restart_if_changed(&before)
    }

    /// Record the total reported by the server.
    pub const fn record_total(&mut self, total: u32) {
        self.total = Some(total);
    }

    fn restart_if_changed(&mut self, before: &CatalogQuery) -> bool {
        let changed = self.query() != *before;
        if changed {
            self.page = 1;
            self.total = None;
        }
        changed
    }
}
