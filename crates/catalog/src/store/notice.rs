//! User-facing notifications for selection commands.

use product_compare_core::{MAX_COMPARE, MIN_COMPARE, ProductId, RejectedOperation};

use super::{Added, Toggled};

/// How a view should present a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeLevel {
    Success,
    Warning,
}

/// Outcome of a selection command, for display at the call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Added(ProductId),
    Removed(ProductId),
    Rejected(RejectedOperation),
}

impl Notice {
    /// Notice for the result of an add.
    #[must_use]
    pub const fn for_add(result: &Result<Added, RejectedOperation>) -> Self {
        match result {
            Ok(added) => Self::Added(added.id),
            Err(rejected) => Self::Rejected(*rejected),
        }
    }

    /// Notice for the result of a toggle.
    #[must_use]
    pub const fn for_toggle(result: &Result<Toggled, RejectedOperation>) -> Self {
        match result {
            Ok(Toggled::Added(added)) => Self::Added(added.id),
            Ok(Toggled::Removed(id)) => Self::Removed(*id),
            Err(rejected) => Self::Rejected(*rejected),
        }
    }

    #[must_use]
    pub const fn level(&self) -> NoticeLevel {
        match self {
            Self::Added(_) | Self::Removed(_) => NoticeLevel::Success,
            Self::Rejected(_) => NoticeLevel::Warning,
        }
    }

    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Added(_) => "Product added to comparison".to_string(),
            Self::Removed(_) => "Product removed from comparison".to_string(),
            Self::Rejected(RejectedOperation::Duplicate(_)) => {
                "Product is already in the comparison".to_string()
            }
            Self::Rejected(RejectedOperation::LimitReached { .. }) => {
                format!("Cannot compare more than {MAX_COMPARE} products")
            }
            Self::Rejected(RejectedOperation::TooFewSelections { .. }) => {
                format!("Please select at least {MIN_COMPARE} products to compare")
            }
        }
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn id(n: u32) -> ProductId {
        ProductId::new(n).unwrap()
    }

    #[test]
    fn test_added_is_success() {
        let notice = Notice::for_add(&Ok(Added {
            id: id(1),
            needs_resolution: true,
        }));
        assert_eq!(notice, Notice::Added(id(1)));
        assert_eq!(notice.level(), NoticeLevel::Success);
        assert_eq!(notice.to_string(), "Product added to comparison");
    }

    #[test]
    fn test_rejections_are_warnings_with_reason() {
        let limit = Notice::for_add(&Err(RejectedOperation::LimitReached { limit: 4 }));
        assert_eq!(limit.level(), NoticeLevel::Warning);
        assert_eq!(limit.to_string(), "Cannot compare more than 4 products");

        let duplicate = Notice::for_add(&Err(RejectedOperation::Duplicate(id(2))));
        assert_eq!(duplicate.to_string(), "Product is already in the comparison");

        let too_few = Notice::Rejected(RejectedOperation::TooFewSelections {
            selected: 1,
            required: 2,
        });
        assert_eq!(
            too_few.to_string(),
            "Please select at least 2 products to compare"
        );
    }

    #[test]
    fn test_toggle_removed() {
        let notice = Notice::for_toggle(&Ok(Toggled::Removed(id(3))));
        assert_eq!(notice, Notice::Removed(id(3)));
        assert_eq!(notice.to_string(), "Product removed from comparison");
    }
}
