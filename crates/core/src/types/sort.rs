//! Sort keys accepted by the catalog listing endpoint.

use serde::{Deserialize, Serialize};

/// Product field the catalog can be sorted by.
///
/// Serializes to the `sortBy` query value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    Id,
    Title,
    Price,
    Brand,
    Category,
}

impl SortField {
    /// Wire name of the field.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Title => "title",
            Self::Price => "price",
            Self::Brand => "brand",
            Self::Category => "category",
        }
    }
}

impl std::fmt::Display for SortField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(Self::Id),
            "title" => Ok(Self::Title),
            "price" => Ok(Self::Price),
            "brand" => Ok(Self::Brand),
            "category" => Ok(Self::Category),
            _ => Err(format!("invalid sort field: {s}")),
        }
    }
}

/// Sort direction, the `order` query value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Asc => write!(f, "asc"),
            Self::Desc => write!(f, "desc"),
        }
    }
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" | "ascend" => Ok(Self::Asc),
            "desc" | "descend" => Ok(Self::Desc),
            _ => Err(format!("invalid sort order: {s}")),
        }
    }
}
