use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// The six browsable catalog categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    People,
    Planets,
    Films,
    Species,
    Vehicles,
    Starships,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::People,
        Category::Planets,
        Category::Films,
        Category::Species,
        Category::Vehicles,
        Category::Starships,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::People => "people",
            Self::Planets => "planets",
            Self::Films => "films",
            Self::Species => "species",
            Self::Vehicles => "vehicles",
            Self::Starships => "starships",
        }
    }

    /// Whether the upstream serves this category in the alternate display
    /// language. Films are only available in the default rendering, so the
    /// toggle is ignored for them.
    pub fn supports_alternate_language(&self) -> bool {
        !matches!(self, Self::Films)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| CatalogError::UnknownCategory(s.to_string()))
    }
}
