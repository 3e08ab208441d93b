//! The comparison store.
//!
//! Holds the comparison selection, the resolved products for it, and the
//! catalog accumulated across pages. Views hold a (cheaply cloneable)
//! [`CompareStore`], issue commands against it, and render from
//! [`StoreSnapshot`]s, either pulled with [`CompareStore::snapshot`] or pushed
//! through [`CompareStore::subscribe`].
//!
//! # Commands
//!
//! | command | effect |
//! |---|---|
//! | `add_to_compare` | append to the selection and start resolving it, or reject (duplicate / full) |
//! | `select_for_compare` | append to the selection only |
//! | `remove_from_compare` | drop from the selection and its cached product |
//! | `resolve_product` | fetch one product into the cache |
//! | `fetch_page` / `fetch_catalog_page` | fetch one catalog page and accumulate it |
//!
//! Selection commands apply synchronously. Network commands apply their
//! completion as a separate transition, so any number of them can be in
//! flight; the state lock is never held across a request.
//!
//! # Catalog fetch ordering
//!
//! Each fetch is issued a sequence number and tagged with the query generation
//! it belongs to. A completion from a superseded query (sort, filter or page
//! size changed since) is dropped. Within one query, pages are stored by page
//! number, and `total` is only taken from the newest completion applied so far.

mod notice;
mod state;

pub use notice::{Notice, NoticeLevel};

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use product_compare_core::{
    CompareMode, Product, ProductId, RejectedOperation, SortField, SortOrder,
};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::{CatalogError, CatalogService, PageRequest, ProductPage};
use crate::cursor::PaginationCursor;
use state::StoreState;

/// Immutable view of the store at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSnapshot {
    /// Selected product IDs, in the order they were added.
    pub compare_list: Vec<ProductId>,
    /// Resolved products for the selection, in selection order. Selected IDs
    /// still being resolved are absent.
    pub compared_products: Vec<Product>,
    /// Catalog accumulated across pages of the current query. Shared between
    /// snapshots until a page is applied or the query changes.
    pub all_products: Arc<[Product]>,
    /// Whether a catalog fetch of the current query is in flight.
    pub loading: bool,
    /// Last network failure, if any.
    pub error: Option<String>,
    /// Total reported by the server for the current query.
    pub total: u32,
    /// Position in the comparison state machine.
    pub mode: CompareMode,
}

impl Default for StoreSnapshot {
    fn default() -> Self {
        Self {
            compare_list: Vec::new(),
            compared_products: Vec::new(),
            all_products: Arc::from([]),
            loading: false,
            error: None,
            total: 0,
            mode: CompareMode::Browsing,
        }
    }
}

/// A product was appended to the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Added {
    pub id: ProductId,
    /// No resolved product is cached for this ID yet.
    pub needs_resolution: bool,
}

/// Result of toggling a product's selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggled {
    Added(Added),
    Removed(ProductId),
}

/// How a product resolution ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Cached (inserted or replaced).
    Resolved,
    /// The product was deselected while the request was in flight.
    Discarded,
    /// The request failed; the error is in the snapshot.
    Failed,
}

/// Handle for one catalog fetch, from [`CompareStore::begin_fetch`] to
/// [`CompareStore::complete_fetch`].
#[derive(Debug, Clone)]
pub struct FetchTicket {
    seq: u64,
    generation: u64,
    page: u32,
    request: PageRequest,
}

impl FetchTicket {
    /// Monotonic sequence number of this fetch.
    #[must_use]
    pub const fn seq(&self) -> u64 {
        self.seq
    }

    /// Page number being fetched.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Wire request to send.
    #[must_use]
    pub const fn request(&self) -> &PageRequest {
        &self.request
    }
}

/// How a catalog fetch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The page was merged. `received` may be zero past the end of the catalog.
    Applied { received: usize, total: u32 },
    /// The request failed; items are unchanged and the error is in the snapshot.
    Failed,
    /// The query changed while the request was in flight; nothing was applied.
    Stale,
}

/// Products ready for the side-by-side view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonView {
    /// Resolved products in selection order.
    pub products: Vec<Product>,
    /// Selected IDs not resolved yet.
    pub pending: Vec<ProductId>,
}

/// The comparison store.
///
/// Cheap to clone; clones share state. Pass it to each view that needs it.
pub struct CompareStore<S> {
    inner: Arc<StoreInner<S>>,
}

struct StoreInner<S> {
    service: S,
    state: Mutex<StoreState>,
    snapshots: watch::Sender<StoreSnapshot>,
}

impl<S> Clone for CompareStore<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: CatalogService> CompareStore<S> {
    /// Create an empty store backed by `service`.
    #[must_use]
    pub fn new(service: S) -> Self {
        Self::with_catalog_cap(service, None)
    }

    /// Create an empty store that keeps at most `cap` catalog products,
    /// evicting the lowest pages first.
    #[must_use]
    pub fn with_catalog_cap(service: S, cap: Option<usize>) -> Self {
        let (snapshots, _) = watch::channel(StoreSnapshot::default());
        Self {
            inner: Arc::new(StoreInner {
                service,
                state: Mutex::new(StoreState::new(cap)),
                snapshots,
            }),
        }
    }

    /// The catalog service this store talks to.
    #[must_use]
    pub fn service(&self) -> &S {
        &self.inner.service
    }

    /// Current state.
    #[must_use]
    pub fn snapshot(&self) -> StoreSnapshot {
        self.inner.snapshots.borrow().clone()
    }

    /// Receiver notified whenever the snapshot changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<StoreSnapshot> {
        self.inner.snapshots.subscribe()
    }

    #[must_use]
    pub fn mode(&self) -> CompareMode {
        self.read(|state| state.selection().mode())
    }

    /// Whether `id` could be added right now (the "Add to Compare" button).
    #[must_use]
    pub fn can_add(&self, id: ProductId) -> bool {
        self.read(|state| state.selection().check_add(id).is_ok())
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Append `id` to the selection without fetching anything.
    ///
    /// If `needs_resolution` is set, follow up with
    /// [`CompareStore::resolve_product`] or [`CompareStore::resolve_all`].
    /// [`CompareStore::add_to_compare`] starts the resolution itself.
    ///
    /// # Errors
    ///
    /// Returns the rejection if `id` is already selected or the selection is
    /// full. State is unchanged in that case.
    pub fn select_for_compare(&self, id: ProductId) -> Result<Added, RejectedOperation> {
        let result = self.update(|state| state.add(id));
        match &result {
            Ok(_) => info!(product_id = %id, "Added product to comparison"),
            Err(rejected) => debug!(product_id = %id, reason = %rejected, "Add rejected"),
        }
        result
    }

    /// Append `id` and resolve it if no product is cached for it.
    ///
    /// A failed resolution is recorded in the snapshot, not returned.
    ///
    /// # Errors
    ///
    /// Same as [`CompareStore::select_for_compare`].
    pub async fn add_and_resolve(&self, id: ProductId) -> Result<Added, RejectedOperation> {
        let added = self.select_for_compare(id)?;
        if added.needs_resolution {
            self.resolve_product(id).await;
        }
        Ok(added)
    }

    /// Remove `id` from the selection and drop its cached product. Returns
    /// whether it was selected.
    pub fn remove_from_compare(&self, id: ProductId) -> bool {
        let removed = self.update(|state| state.remove(id));
        if removed {
            info!(product_id = %id, "Removed product from comparison");
        }
        removed
    }

    /// Replace the cached products wholesale. Products that are not selected
    /// are ignored.
    pub fn replace_compared_products(&self, products: Vec<Product>) {
        self.update(|state| state.replace_compared(products));
    }

    /// Open the comparison view.
    ///
    /// # Errors
    ///
    /// Returns `RejectedOperation::TooFewSelections` with fewer than two
    /// products selected.
    pub fn enter_comparison(&self) -> Result<ComparisonView, RejectedOperation> {
        self.read(StoreState::comparison_view)
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    /// Fetch `id` from the catalog and cache it, replacing any previous entry.
    ///
    /// Not retried on failure; call again to retry.
    pub async fn resolve_product(&self, id: ProductId) -> Resolution {
        let result = self.inner.service.fetch_product(id).await;
        if let Err(e) = &result {
            warn!(product_id = %id, error = %e, "Product resolution failed");
        }

        let resolution = self.update(|state| state.apply_resolution(id, result));
        if resolution == Resolution::Discarded {
            debug!(product_id = %id, "Dropped resolution for deselected product");
        }
        resolution
    }

    /// Resolve every selected product that is not cached yet, concurrently.
    pub async fn resolve_all(&self) -> Vec<(ProductId, Resolution)> {
        let pending = self.read(StoreState::pending_ids);
        if pending.is_empty() {
            return Vec::new();
        }

        debug!(count = pending.len(), "Resolving selected products");
        futures::future::join_all(
            pending
                .into_iter()
                .map(|id| async move { (id, self.resolve_product(id).await) }),
        )
        .await
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Start a catalog fetch for the cursor's current page.
    ///
    /// If the cursor's query differs from the one being accumulated, the
    /// catalog is cleared first. Sets `loading` until the matching
    /// [`CompareStore::complete_fetch`].
    #[must_use]
    pub fn begin_fetch(&self, cursor: &PaginationCursor) -> FetchTicket {
        let ticket = self.update(|state| state.begin_fetch(cursor));
        debug!(
            seq = ticket.seq,
            page = ticket.page,
            skip = ticket.request.skip,
            "Catalog fetch started"
        );
        ticket
    }

    /// Apply the completion of a fetch started with [`CompareStore::begin_fetch`].
    pub fn complete_fetch(
        &self,
        ticket: &FetchTicket,
        result: Result<ProductPage, CatalogError>,
    ) -> FetchOutcome {
        if let Err(e) = &result {
            warn!(seq = ticket.seq, page = ticket.page, error = %e, "Catalog fetch failed");
        }

        let outcome = self.update(|state| state.complete_fetch(ticket, result));
        match outcome {
            FetchOutcome::Applied { received, total } => {
                debug!(seq = ticket.seq, page = ticket.page, received, total, "Catalog page applied");
            }
            FetchOutcome::Stale => {
                debug!(seq = ticket.seq, page = ticket.page, "Discarded stale catalog page");
            }
            FetchOutcome::Failed => {}
        }
        outcome
    }

    /// Fetch the cursor's current page and accumulate it. Records the total on
    /// the cursor when the page is applied.
    ///
    /// Dropping the future before it finishes abandons the fetch.
    pub async fn fetch_page(&self, cursor: &mut PaginationCursor) -> FetchOutcome {
        let ticket = self.begin_fetch(cursor);
        let mut pending = PendingFetch {
            store: self,
            ticket: &ticket,
            armed: true,
        };
        let result = self.inner.service.fetch_page(ticket.request()).await;
        pending.armed = false;
        let outcome = self.complete_fetch(&ticket, result);
        if let FetchOutcome::Applied { total, .. } = outcome {
            cursor.record_total(total);
        }
        outcome
    }

    /// Fetch page `page` (1-based) of `page_size` products, optionally sorted.
    ///
    /// Equivalent to [`CompareStore::fetch_page`] with a fresh cursor: the same
    /// sort as the previous call appends, a different one starts over.
    pub async fn fetch_catalog_page(
        &self,
        page_size: u32,
        page: u32,
        sort_field: Option<SortField>,
        sort_order: Option<SortOrder>,
    ) -> FetchOutcome {
        let mut cursor = PaginationCursor::at(page_size, page, sort_field, sort_order);
        self.fetch_page(&mut cursor).await
    }
}

impl<S> CompareStore<S> {
    /// Forget a fetch started with [`CompareStore::begin_fetch`] that will
    /// never be completed, so it no longer counts toward `loading`.
    pub fn abandon_fetch(&self, ticket: &FetchTicket) {
        if self.update(|state| state.abandon_fetch(ticket)) {
            debug!(seq = ticket.seq, page = ticket.page, "Catalog fetch abandoned");
        }
    }

    // =========================================================================
    // State access
    // =========================================================================

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn read<R>(&self, f: impl FnOnce(&StoreState) -> R) -> R {
        f(&*self.lock())
    }

    /// Apply a transition and publish the new snapshot if anything changed.
    /// Publishing happens under the lock so subscribers see transitions in order.
    fn update<R>(&self, f: impl FnOnce(&mut StoreState) -> R) -> R {
        let mut state = self.lock();
        let result = f(&mut *state);
        let next = state.snapshot();
        self.inner.snapshots.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
        result
    }
}

impl<S> CompareStore<S>
where
    S: CatalogService + Send + Sync + 'static,
{
    /// Append `id` to the selection and, if no product is cached for it,
    /// start resolving it in the background.
    ///
    /// The resolution lands in a later snapshot. Outside a Tokio runtime
    /// nothing is started and the ID stays pending until
    /// [`CompareStore::resolve_all`].
    ///
    /// # Errors
    ///
    /// Same as [`CompareStore::select_for_compare`].
    pub fn add_to_compare(&self, id: ProductId) -> Result<Added, RejectedOperation> {
        let added = self.select_for_compare(id)?;
        if added.needs_resolution {
            self.spawn_resolution(id);
        }
        Ok(added)
    }

    /// Remove `id` if selected, add it otherwise.
    ///
    /// # Errors
    ///
    /// Returns the rejection when adding to a full selection.
    pub fn toggle_compare(&self, id: ProductId) -> Result<Toggled, RejectedOperation> {
        if self.remove_from_compare(id) {
            Ok(Toggled::Removed(id))
        } else {
            self.add_to_compare(id).map(Toggled::Added)
        }
    }

    fn spawn_resolution(&self, id: ProductId) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            debug!(product_id = %id, "No runtime; resolution left pending");
            return;
        };
        let store = self.clone();
        runtime.spawn(async move {
            store.resolve_product(id).await;
        });
    }
}

/// Abandons its ticket on drop while still armed.
struct PendingFetch<'a, S> {
    store: &'a CompareStore<S>,
    ticket: &'a FetchTicket,
    armed: bool,
}

impl<S> Drop for PendingFetch<'_, S> {
    fn drop(&mut self) {
        if self.armed {
            self.store.abandon_fetch(self.ticket);
        }
    }
}
