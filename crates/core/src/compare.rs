//! The comparison selection and its mode state machine.
//!
//! A selection is an ordered list of distinct product IDs, at most
//! [`MAX_COMPARE`] long. Insertion order drives display order in the
//! side-by-side view.
//!
//! ```text
//! Browsing (0) -> Selecting (1) -> Ready (2..=3) -> Full (4)
//! ```
//!
//! Transitions are driven only by [`ComparisonSelection::add`] and
//! [`ComparisonSelection::remove`]. Navigating to the comparison view is only
//! permitted from `Ready` or `Full`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::ProductId;

/// Maximum number of products in a comparison.
pub const MAX_COMPARE: usize = 4;

/// Minimum number of products needed to open the comparison view.
pub const MIN_COMPARE: usize = 2;

/// A business-rule violation. Rejected operations never mutate state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RejectedOperation {
    /// The product is already selected.
    #[error("product {0} is already in the comparison")]
    Duplicate(ProductId),

    /// The selection is full.
    #[error("cannot compare more than {limit} products")]
    LimitReached { limit: usize },

    /// Not enough products selected to open the comparison view.
    #[error("select at least {required} products to compare (selected {selected})")]
    TooFewSelections { selected: usize, required: usize },
}

/// Where the selection sits in the comparison state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareMode {
    /// Nothing selected.
    Browsing,
    /// One product selected; comparison not yet available.
    Selecting,
    /// Two or three products selected.
    Ready,
    /// Four products selected; further adds are rejected.
    Full,
}

impl CompareMode {
    /// Mode for a selection of `len` products.
    #[must_use]
    pub const fn for_len(len: usize) -> Self {
        match len {
            0 => Self::Browsing,
            1 => Self::Selecting,
            n if n >= MAX_COMPARE => Self::Full,
            _ => Self::Ready,
        }
    }

    /// Whether the comparison view may be opened.
    #[must_use]
    pub const fn can_compare(&self) -> bool {
        matches!(self, Self::Ready | Self::Full)
    }
}

impl std::fmt::Display for CompareMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Browsing => write!(f, "browsing"),
            Self::Selecting => write!(f, "selecting"),
            Self::Ready => write!(f, "ready"),
            Self::Full => write!(f, "full"),
        }
    }
}

/// Ordered, duplicate-free list of product IDs chosen for comparison.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ComparisonSelection {
    ids: Vec<ProductId>,
}

impl ComparisonSelection {
    /// Create an empty selection.
    #[must_use]
    pub const fn new() -> Self {
        Self { ids: Vec::new() }
    }

    /// Append `id` to the end of the selection.
    ///
    /// # Errors
    ///
    /// - `RejectedOperation::Duplicate` if `id` is already selected
    /// - `RejectedOperation::LimitReached` if the selection is full
    pub fn add(&mut self, id: ProductId) -> Result<(), RejectedOperation> {
        self.check_add(id)?;
        self.ids.push(id);
        Ok(())
    }

    /// Check whether `id` could be added without changing anything.
    ///
    /// The duplicate check runs first, so a selected id in a full selection
    /// reports `Duplicate`.
    ///
    /// # Errors
    ///
    /// Same as [`ComparisonSelection::add`].
    pub fn check_add(&self, id: ProductId) -> Result<(), RejectedOperation> {
        if self.contains(id) {
            return Err(RejectedOperation::Duplicate(id));
        }
        if self.is_full() {
            return Err(RejectedOperation::LimitReached { limit: MAX_COMPARE });
        }
        Ok(())
    }

    /// Remove `id` if present. Returns whether anything was removed.
    pub fn remove(&mut self, id: ProductId) -> bool {
        let before = self.ids.len();
        self.ids.retain(|&selected| selected != id);
        self.ids.len() != before
    }

    /// Whether `id` is selected.
    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.ids.contains(&id)
    }

    /// Selected IDs in insertion order.
    #[must_use]
    pub fn ids(&self) -> &[ProductId] {
        &self.ids
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.ids.len() >= MAX_COMPARE
    }

    /// Current position in the comparison state machine.
    #[must_use]
    pub fn mode(&self) -> CompareMode {
        CompareMode::for_len(self.ids.len())
    }

    /// Guard for opening the comparison view.
    ///
    /// # Errors
    ///
    /// Returns `RejectedOperation::TooFewSelections` below [`MIN_COMPARE`].
    pub fn ensure_comparable(&self) -> Result<(), RejectedOperation> {
        if self.mode().can_compare() {
            Ok(())
        } else {
            Err(RejectedOperation::TooFewSelections {
                selected: self.ids.len(),
                required: MIN_COMPARE,
            })
        }
    }
}
