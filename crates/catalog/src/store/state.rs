//! Store state and its transitions.
//!
//! Everything here is synchronous and free of I/O. [`super::CompareStore`]
//! wraps it in a mutex, performs the network calls in between transitions, and
//! publishes a snapshot after each one.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use product_compare_core::{ComparisonSelection, Product, ProductId, RejectedOperation};

use super::{Added, ComparisonView, FetchOutcome, FetchTicket, Resolution, StoreSnapshot};
use crate::api::{CatalogError, ProductPage};
use crate::cursor::{CatalogQuery, PaginationCursor};

#[derive(Debug, Default)]
pub(crate) struct StoreState {
    selection: ComparisonSelection,
    compared: HashMap<ProductId, Product>,

    /// Accumulated catalog, keyed by page number so late pages land in order.
    pages: BTreeMap<u32, Vec<Product>>,
    /// `pages` flattened, rebuilt only when `pages` changes.
    catalog: Arc<[Product]>,
    query: Option<CatalogQuery>,
    /// Bumped whenever `query` changes; completions from older generations are stale.
    generation: u64,
    next_seq: u64,
    /// Sequence number of the completion `total` was last taken from.
    last_applied_seq: u64,
    /// Fetches of the current generation still outstanding.
    in_flight: BTreeSet<u64>,
    total: u32,
    error: Option<String>,

    catalog_cap: Option<usize>,
}

impl StoreState {
    pub(crate) fn new(catalog_cap: Option<usize>) -> Self {
        Self {
            catalog_cap,
            ..Self::default()
        }
    }

    // =========================================================================
    // Selection
    // =========================================================================

    pub(crate) fn add(&mut self, id: ProductId) -> Result<Added, RejectedOperation> {
        self.selection.add(id)?;
        Ok(Added {
            id,
            needs_resolution: !self.compared.contains_key(&id),
        })
    }

    pub(crate) fn remove(&mut self, id: ProductId) -> bool {
        self.compared.remove(&id);
        self.selection.remove(id)
    }

    pub(crate) const fn selection(&self) -> &ComparisonSelection {
        &self.selection
    }

    /// Selected IDs with no resolved product yet, in selection order.
    pub(crate) fn pending_ids(&self) -> Vec<ProductId> {
        self.selection
            .ids()
            .iter()
            .copied()
            .filter(|id| !self.compared.contains_key(id))
            .collect()
    }

    pub(crate) fn apply_resolution(
        &mut self,
        id: ProductId,
        result: Result<Product, CatalogError>,
    ) -> Resolution {
        match result {
            // Deselected while the request was in flight
            Ok(_) if !self.selection.contains(id) => Resolution::Discarded,
            Ok(product) => {
                self.compared.insert(id, product);
                Resolution::Resolved
            }
            Err(e) => {
                self.error = Some(format!("Failed to load product {id}: {e}"));
                Resolution::Failed
            }
        }
    }

    pub(crate) fn replace_compared(&mut self, products: Vec<Product>) {
        self.compared = products
            .into_iter()
            .filter(|product| self.selection.contains(product.id))
            .map(|product| (product.id, product))
            .collect();
    }

    pub(crate) fn comparison_view(&self) -> Result<ComparisonView, RejectedOperation> {
        self.selection.ensure_comparable()?;
        Ok(ComparisonView {
            products: self.compared_in_order(),
            pending: self.pending_ids(),
        })
    }

    fn compared_in_order(&self) -> Vec<Product> {
        self.selection
            .ids()
            .iter()
            .filter_map(|id| self.compared.get(id))
            .cloned()
            .collect()
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    pub(crate) fn begin_fetch(&mut self, cursor: &PaginationCursor) -> FetchTicket {
        let query = cursor.query();
        if self.query.as_ref() != Some(&query) {
            self.pages.clear();
            self.catalog = Arc::from([]);
            self.in_flight.clear();
            self.total = 0;
            self.last_applied_seq = 0;
            self.generation += 1;
            self.query = Some(query);
        }

        self.next_seq += 1;
        let seq = self.next_seq;
        self.in_flight.insert(seq);
        self.error = None;

        FetchTicket {
            seq,
            generation: self.generation,
            page: cursor.page(),
            request: cursor.request(),
        }
    }

    pub(crate) fn complete_fetch(
        &mut self,
        ticket: &FetchTicket,
        result: Result<ProductPage, CatalogError>,
    ) -> FetchOutcome {
        if ticket.generation != self.generation || !self.in_flight.remove(&ticket.seq) {
            return FetchOutcome::Stale;
        }

        match result {
            Ok(page) => {
                let received = page.products.len();
                if ticket.seq > self.last_applied_seq {
                    self.total = page.total;
                    self.last_applied_seq = ticket.seq;
                }
                self.pages.insert(ticket.page, page.products);
                self.enforce_cap(ticket.page);
                self.catalog = self.pages.values().flatten().cloned().collect();
                FetchOutcome::Applied {
                    received,
                    total: self.total,
                }
            }
            Err(e) => {
                self.error = Some(e.to_string());
                FetchOutcome::Failed
            }
        }
    }

    /// Forget a fetch that will never be completed. Returns whether it was
    /// still outstanding.
    pub(crate) fn abandon_fetch(&mut self, ticket: &FetchTicket) -> bool {
        ticket.generation == self.generation && self.in_flight.remove(&ticket.seq)
    }

    /// Evict pages until the catalog fits the cap, always from the end
    /// farther from `keep`. `keep` itself is never evicted.
    fn enforce_cap(&mut self, keep: u32) {
        let Some(cap) = self.catalog_cap else {
            return;
        };
        while self.pages.len() > 1 && self.catalog_len() > cap {
            let (Some(&first), Some(&last)) =
                (self.pages.keys().next(), self.pages.keys().next_back())
            else {
                break;
            };
            if first != keep && keep.abs_diff(first) >= keep.abs_diff(last) {
                self.pages.pop_first();
            } else if last != keep {
                self.pages.pop_last();
            } else {
                self.pages.pop_first();
            }
        }
    }

    fn catalog_len(&self) -> usize {
        self.pages.values().map(Vec::len).sum()
    }

    pub(crate) fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            compare_list: self.selection.ids().to_vec(),
            compared_products: self.compared_in_order(),
            all_products: Arc::clone(&self.catalog),
            loading: !self.in_flight.is_empty(),
            error: self.error.clone(),
            total: self.total,
            mode: self.selection.mode(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use product_compare_core::{CompareMode, Price};

    fn id(n: u32) -> ProductId {
        ProductId::new(n).unwrap()
    }

    fn product(n: u32) -> Product {
        Product {
            id: id(n),
            title: format!("Product {n}"),
            description: String::new(),
            price: Price::from_cents(i64::from(n) * 100).unwrap(),
            brand: "Acme".to_string(),
            category: "tools".to_string(),
        }
    }

    fn page(range: std::ops::RangeInclusive<u32>, total: u32) -> ProductPage {
        let products: Vec<Product> = range.map(product).collect();
        ProductPage {
            limit: u32::try_from(products.len()).unwrap(),
            products,
            total,
            skip: 0,
        }
    }

    fn failure() -> CatalogError {
        CatalogError::Api {
            status: 500,
            message: "boom".to_string(),
        }
    }

    #[test]
    fn test_remove_drops_cache_entry() {
        let mut state = StoreState::new(None);
        state.add(id(1)).unwrap();
        state.apply_resolution(id(1), Ok(product(1)));
        assert_eq!(state.snapshot().compared_products.len(), 1);

        assert!(state.remove(id(1)));
        let snapshot = state.snapshot();
        assert!(snapshot.compare_list.is_empty());
        assert!(snapshot.compared_products.is_empty());
        assert!(state.add(id(1)).unwrap().needs_resolution);
    }

    #[test]
    fn test_resolution_replaces_in_place() {
        let mut state = StoreState::new(None);
        state.add(id(1)).unwrap();
        state.add(id(2)).unwrap();
        state.apply_resolution(id(1), Ok(product(1)));
        state.apply_resolution(id(2), Ok(product(2)));

        let mut updated = product(1);
        updated.title = "Renamed".to_string();
        assert_eq!(state.apply_resolution(id(1), Ok(updated)), Resolution::Resolved);

        let compared = state.snapshot().compared_products;
        assert_eq!(compared.len(), 2);
        assert_eq!(compared[0].title, "Renamed");
        assert_eq!(compared[1].id, id(2));
    }

    #[test]
    fn test_resolution_for_deselected_id_is_discarded() {
        let mut state = StoreState::new(None);
        state.add(id(3)).unwrap();
        state.remove(id(3));
        assert_eq!(
            state.apply_resolution(id(3), Ok(product(3))),
            Resolution::Discarded
        );
        assert!(state.snapshot().compared_products.is_empty());
    }

    #[test]
    fn test_failed_resolution_keeps_cache_and_sets_error() {
        let mut state = StoreState::new(None);
        state.add(id(1)).unwrap();
        state.apply_resolution(id(1), Ok(product(1)));

        assert_eq!(state.apply_resolution(id(1), Err(failure())), Resolution::Failed);
        let snapshot = state.snapshot();
        assert_eq!(snapshot.compared_products, vec![product(1)]);
        assert!(snapshot.error.unwrap().contains("Failed to load product 1"));
    }

    #[test]
    fn test_replace_compared_keeps_only_selected() {
        let mut state = StoreState::new(None);
        state.add(id(2)).unwrap();
        state.add(id(1)).unwrap();
        state.replace_compared(vec![product(1), product(2), product(9)]);

        let compared = state.snapshot().compared_products;
        assert_eq!(compared, vec![product(2), product(1)]);
    }

    #[test]
    fn test_comparison_view_lists_pending() {
        let mut state = StoreState::new(None);
        state.add(id(1)).unwrap();
        assert!(state.comparison_view().is_err());

        state.add(id(2)).unwrap();
        state.apply_resolution(id(2), Ok(product(2)));
        let view = state.comparison_view().unwrap();
        assert_eq!(view.products, vec![product(2)]);
        assert_eq!(view.pending, vec![id(1)]);
    }

    #[test]
    fn test_pages_accumulate() {
        let mut state = StoreState::new(None);
        let mut cursor = PaginationCursor::new(10);

        let ticket = state.begin_fetch(&cursor);
        assert!(state.snapshot().loading);
        state.complete_fetch(&ticket, Ok(page(1..=10, 100)));

        cursor.next_page();
        let ticket = state.begin_fetch(&cursor);
        state.complete_fetch(&ticket, Ok(page(11..=20, 100)));

        let snapshot = state.snapshot();
        assert!(!snapshot.loading);
        assert_eq!(snapshot.total, 100);
        let ids: Vec<u32> = snapshot.all_products.iter().map(|p| p.id.as_u32()).collect();
        assert_eq!(ids, (1..=20).collect::<Vec<_>>());
        assert_eq!(snapshot.mode, CompareMode::Browsing);
    }

    #[test]
    fn test_refetching_a_page_does_not_duplicate() {
        let mut state = StoreState::new(None);
        let cursor = PaginationCursor::new(10);

        for _ in 0..2 {
            let ticket = state.begin_fetch(&cursor);
            state.complete_fetch(&ticket, Ok(page(1..=10, 30)));
        }
        assert_eq!(state.snapshot().all_products.len(), 10);
    }

    #[test]
    fn test_new_query_clears_and_discards_old_completion() {
        let mut state = StoreState::new(None);
        let mut cursor = PaginationCursor::new(10);

        let first = state.begin_fetch(&cursor);
        state.complete_fetch(&first, Ok(page(1..=10, 100)));

        cursor.next_page();
        let in_flight = state.begin_fetch(&cursor);

        cursor.set_sort(Some(product_compare_core::SortField::Price), Default::default());
        let sorted = state.begin_fetch(&cursor);
        assert!(state.snapshot().all_products.is_empty());

        assert_eq!(
            state.complete_fetch(&in_flight, Ok(page(11..=20, 100))),
            FetchOutcome::Stale
        );
        state.complete_fetch(&sorted, Ok(page(50..=59, 100)));

        let snapshot = state.snapshot();
        assert_eq!(snapshot.all_products.len(), 10);
        assert_eq!(snapshot.all_products[0].id, id(50));
        assert!(!snapshot.loading);
    }

    #[test]
    fn test_out_of_order_pages_keep_newest_total() {
        let mut state = StoreState::new(None);
        let mut cursor = PaginationCursor::new(5);

        let page_one = state.begin_fetch(&cursor);
        cursor.next_page();
        let page_two = state.begin_fetch(&cursor);

        state.complete_fetch(&page_two, Ok(page(6..=10, 42)));
        assert!(state.snapshot().loading);
        state.complete_fetch(&page_one, Ok(page(1..=5, 40)));

        let snapshot = state.snapshot();
        assert!(!snapshot.loading);
        assert_eq!(snapshot.total, 42);
        assert_eq!(snapshot.all_products[0].id, id(1));
        assert_eq!(snapshot.all_products[9].id, id(10));
    }

    #[test]
    fn test_failed_fetch_keeps_items() {
        let mut state = StoreState::new(None);
        let mut cursor = PaginationCursor::new(10);

        let ticket = state.begin_fetch(&cursor);
        state.complete_fetch(&ticket, Ok(page(1..=10, 100)));

        cursor.next_page();
        let ticket = state.begin_fetch(&cursor);
        assert_eq!(state.complete_fetch(&ticket, Err(failure())), FetchOutcome::Failed);

        let snapshot = state.snapshot();
        assert_eq!(snapshot.all_products.len(), 10);
        assert!(!snapshot.loading);
        assert!(snapshot.error.is_some());

        // Next fetch clears the error
        state.begin_fetch(&cursor);
        assert!(state.snapshot().error.is_none());
    }

    #[test]
    fn test_completing_twice_is_stale() {
        let mut state = StoreState::new(None);
        let cursor = PaginationCursor::new(10);
        let ticket = state.begin_fetch(&cursor);
        state.complete_fetch(&ticket, Ok(page(1..=10, 10)));
        assert_eq!(
            state.complete_fetch(&ticket, Ok(page(1..=10, 10))),
            FetchOutcome::Stale
        );
    }

    #[test]
    fn test_abandoned_fetch_clears_loading() {
        let mut state = StoreState::new(None);
        let cursor = PaginationCursor::new(10);

        let ticket = state.begin_fetch(&cursor);
        assert!(state.snapshot().loading);
        assert!(state.abandon_fetch(&ticket));
        assert!(!state.snapshot().loading);

        // A late completion of the abandoned fetch is ignored
        assert_eq!(
            state.complete_fetch(&ticket, Ok(page(1..=10, 10))),
            FetchOutcome::Stale
        );
        assert!(!state.abandon_fetch(&ticket));
    }

    #[test]
    fn test_cap_keeps_page_just_applied() {
        let mut state = StoreState::new(Some(15));
        let mut cursor = PaginationCursor::new(10);

        for (range, page_no) in [(1..=10, 1), (11..=20, 2), (1..=10, 1)] {
            cursor.go_to_page(page_no);
            let ticket = state.begin_fetch(&cursor);
            let outcome = state.complete_fetch(&ticket, Ok(page(range, 100)));
            assert!(matches!(outcome, FetchOutcome::Applied { received: 10, .. }));
        }

        let ids: Vec<u32> = state.snapshot().all_products.iter().map(|p| p.id.as_u32()).collect();
        assert_eq!(ids, (1..=10).collect::<Vec<_>>());
    }

    #[test]
    fn test_cap_evicts_far_end_first() {
        let mut state = StoreState::new(Some(20));
        let mut cursor = PaginationCursor::new(10);

        for (range, page_no) in [(21..=30, 3), (31..=40, 4), (11..=20, 2)] {
            cursor.go_to_page(page_no);
            let ticket = state.begin_fetch(&cursor);
            state.complete_fetch(&ticket, Ok(page(range, 100)));
        }

        // Page 4 is farther from page 2 than page 3 is
        let ids: Vec<u32> = state.snapshot().all_products.iter().map(|p| p.id.as_u32()).collect();
        assert_eq!(ids, (11..=30).collect::<Vec<_>>());
    }

    #[test]
    fn test_selection_change_shares_catalog() {
        let mut state = StoreState::new(None);
        let cursor = PaginationCursor::new(10);
        let ticket = state.begin_fetch(&cursor);
        state.complete_fetch(&ticket, Ok(page(1..=10, 10)));

        let before = state.snapshot().all_products;
        state.add(id(1)).unwrap();
        assert!(Arc::ptr_eq(&before, &state.snapshot().all_products));
    }

    #[test]
    fn test_cap_evicts_oldest_pages() {
        let mut state = StoreState::new(Some(15));
        let mut cursor = PaginationCursor::new(10);

        let ticket = state.begin_fetch(&cursor);
        state.complete_fetch(&ticket, Ok(page(1..=10, 100)));
        cursor.next_page();
        let ticket = state.begin_fetch(&cursor);
        state.complete_fetch(&ticket, Ok(page(11..=20, 100)));

        let snapshot = state.snapshot();
        assert_eq!(snapshot.all_products.len(), 10);
        assert_eq!(snapshot.all_products[0].id, id(11));
    }
}
