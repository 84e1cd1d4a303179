//! Catalog search descriptor
//!
//! Mirrors the big search form of the catalog site. All values are the site's
//! own codes (transmission and fuel selectors are numeric strings there);
//! empty strings mean "not constrained".

use serde::{Deserialize, Serialize};

/// Parameters a listing URL is built from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub make: String,
    pub model: String,
    /// Site transmission code; the special value "AT" expands to both
    /// automatic codes.
    pub gearbox: String,
    pub fuel: String,
    pub drive: String,
    pub min_price: String,
    pub max_price: String,
    pub min_year: String,
    pub max_year: String,
    /// Restrict the search to unused vehicles.
    #[serde(rename = "new")]
    pub new_only: bool,
}

impl SearchQuery {
    pub fn for_make(make: impl Into<String>) -> Self {
        Self {
            make: make.into(),
            ..Self::default()
        }
    }
}
