//! Side-by-side comparison command.
//!
//! # Usage
//!
//! ```bash
//! pc-cli compare 1 5 9
//! ```
//!
//! IDs are added in order with the same rules as the interactive views:
//! duplicates and anything past the fourth product are reported and skipped.

use product_compare_catalog::{Notice, Resolution};
use product_compare_core::ProductId;

use super::{CommandError, Session};
use crate::render;

/// Select `ids`, resolve them and print the comparison grid.
///
/// # Errors
///
/// Returns error if fewer than two distinct products are selected.
pub async fn compare(session: &Session, ids: &[ProductId]) -> Result<(), CommandError> {
    let store = &session.store;

    for &id in ids {
        let notice = Notice::for_add(&store.select_for_compare(id));
        render::print(&render::notice(&notice));
    }

    if let Err(rejected) = store.enter_comparison() {
        render::print(&render::notice(&Notice::Rejected(rejected)));
        return Err(rejected.into());
    }

    let failed = store
        .resolve_all()
        .await
        .into_iter()
        .filter(|(_, resolution)| *resolution == Resolution::Failed)
        .count();
    if failed > 0 {
        tracing::warn!(failed, error = %session.last_error(), "Some products could not be loaded");
    }

    let view = store.enter_comparison()?;
    render::print("");
    render::print(&render::comparison(&view));
    Ok(())
}
