//! Catalog browsing commands.
//!
//! # Usage
//!
//! ```bash
//! pc-cli products --page 2 --sort-by title
//! pc-cli browse --pages 4 --sort-by price --order desc
//! pc-cli product 12
//! ```

use product_compare_catalog::{FetchOutcome, PaginationCursor};
use product_compare_core::{ProductId, SortField, SortOrder};

use super::{CommandError, Session};
use crate::render;

/// Print a single page of the catalog.
///
/// # Errors
///
/// Returns error if the page request fails.
pub async fn list_page(
    session: &Session,
    page: u32,
    sort_by: Option<SortField>,
    order: Option<SortOrder>,
) -> Result<(), CommandError> {
    let mut cursor = PaginationCursor::at(session.page_size, page, sort_by, order);
    fetch(session, &mut cursor).await?;

    let snapshot = session.store.snapshot();
    render::print(&render::product_table(&snapshot.all_products));
    render::print(&footer(&cursor, snapshot.all_products.len()));
    Ok(())
}

/// Load up to `pages` consecutive pages into the store and print everything
/// loaded. Stops early at the end of the catalog.
///
/// # Errors
///
/// Returns error if any page request fails.
pub async fn browse(
    session: &Session,
    pages: u32,
    sort_by: Option<SortField>,
    order: Option<SortOrder>,
) -> Result<(), CommandError> {
    let mut cursor = PaginationCursor::at(session.page_size, 1, sort_by, order);

    let pages = pages.max(1);
    for loaded in 1..=pages {
        fetch(session, &mut cursor).await?;
        if !cursor.has_more() || loaded == pages {
            break;
        }
        cursor.next_page();
    }

    let snapshot = session.store.snapshot();
    tracing::info!(
        loaded = snapshot.all_products.len(),
        total = snapshot.total,
        "Catalog loaded"
    );
    render::print(&render::product_table(&snapshot.all_products));
    render::print(&footer(&cursor, snapshot.all_products.len()));
    Ok(())
}

/// Print one product's details.
///
/// # Errors
///
/// Returns error if the product does not exist or the request fails.
pub async fn show_product(session: &Session, id: ProductId) -> Result<(), CommandError> {
    let product = session.store.service().get_product(id).await?;
    render::print(&render::product_detail(&product));
    Ok(())
}

async fn fetch(session: &Session, cursor: &mut PaginationCursor) -> Result<(), CommandError> {
    match session.store.fetch_page(cursor).await {
        FetchOutcome::Applied { .. } | FetchOutcome::Stale => Ok(()),
        FetchOutcome::Failed => Err(CommandError::FetchFailed(session.last_error())),
    }
}

fn footer(cursor: &PaginationCursor, shown: usize) -> String {
    match cursor.total_pages() {
        Some(pages) => format!(
            "\nPage {} of {pages} ({shown} shown, {} total)",
            cursor.page(),
            cursor.total().unwrap_or_default()
        ),
        None => format!("\nPage {} ({shown} shown)", cursor.page()),
    }
}
