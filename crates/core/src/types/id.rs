//! Newtype ID for catalog products.
//!
//! Product IDs are assigned by the catalog service and are always positive.
//! The wrapper keeps them from being mixed up with page numbers, counts and
//! offsets, which are also plain integers on the wire.

use serde::{Deserialize, Serialize};

/// A catalog product identifier.
///
/// Serializes as a bare integer. Zero is rejected on construction and
/// deserialization.
///
/// # Example
///
/// ```rust
/// # use product_compare_core::ProductId;
/// let id = ProductId::new(42).unwrap();
/// assert_eq!(id.as_u32(), 42);
/// assert!(ProductId::new(0).is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct ProductId(u32);

impl ProductId {
    /// Create a new ID, returning `None` for zero.
    #[must_use]
    pub const fn new(id: u32) -> Option<Self> {
        if id == 0 { None } else { Some(Self(id)) }
    }

    /// Get the underlying u32 value.
    #[must_use]
    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

impl ::core::fmt::Display for ProductId {
    fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u32> for ProductId {
    type Error = String;

    fn try_from(id: u32) -> Result<Self, Self::Error> {
        Self::new(id).ok_or_else(|| "product id must be positive".to_string())
    }
}

impl From<ProductId> for u32 {
    fn from(id: ProductId) -> Self {
        id.0
    }
}

impl std::str::FromStr for ProductId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s
            .trim()
            .parse::<u32>()
            .map_err(|e| format!("invalid product id '{s}': {e}"))?;
        Self::try_from(id).map_err(|e| format!("invalid product id '{s}': {e}"))
    }
}
