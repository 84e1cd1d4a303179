//! Target-site markup profile
//!
//! The catalog site's HTML structure is a semi-stable contract; the selector
//! strings and marker tokens live here so a markup change is a data change,
//! not a code change. Defaults describe the current drom.ru markup.

use serde::{Deserialize, Serialize};

/// Icon reference meaning "equipment present".
pub const CHECK_MARK: &str = "#yes";
/// Icon reference meaning "available as a paid option".
pub const OPTION_MARK: &str = "#option";
/// Placeholder text meaning "not offered on this trim".
pub const NO_PLACEHOLDER: &str = "—";
/// Literal marker shown instead of an odometer value on unused vehicles.
pub const NEW_VEHICLE_TEXT: &str = "новый автомобиль";

/// CSS selectors and marker attributes for the target site.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteProfile {
    /// Origin used to qualify relative trim links.
    pub origin: String,
    /// Root of the ad-list region on listing pages.
    pub ad_list_container: String,
    /// Ad title span inside a listing anchor.
    pub ad_title: String,
    /// Ad price span inside a listing anchor.
    pub ad_price: String,
    /// Secondary text node carrying the free-text description.
    pub description: String,
    /// Which match of `description` holds the description text.
    pub description_index: usize,
    /// Thumbnail gallery container on detail pages.
    pub gallery: String,
    /// Inline engine summary span on detail pages.
    pub engine_summary: String,
    /// Value cells of the detail-page characteristics table.
    pub characteristics_cell: String,
    /// Odometer span on detail pages.
    pub kilometerage: String,
    /// Element carrying the new-vehicle marker text.
    pub new_vehicle_marker: String,
    /// Attribute tagging the generation link anchor.
    pub generation_link_attr: String,
    /// Attribute value of the generation link anchor.
    pub generation_link_value: String,
    /// Colspan values delimiting trim-candidate blocks on generation pages.
    pub candidate_colspans: Vec<String>,
}

impl Default for SiteProfile {
    fn default() -> Self {
        Self {
            origin: "https://www.drom.ru".to_string(),
            ad_list_container: "div[data-bulletin-list=true]".to_string(),
            ad_title: "span[data-ftid=bull_title]".to_string(),
            ad_price: "span[data-ftid=bull_price]".to_string(),
            description: "span.css-1kb7l9z.e162wx9x0".to_string(),
            description_index: 1,
            gallery: "div[data-ftid='bull-page_bull-gallery_thumbnails']".to_string(),
            engine_summary: "span.css-1jygg09.e162wx9x0".to_string(),
            characteristics_cell: "td.css-1la7f7n.ezjvm5n0".to_string(),
            kilometerage: "span.css-1osyw3j.ei6iaw00".to_string(),
            new_vehicle_marker: "span.css-ytyb35.e162wx9x0".to_string(),
            generation_link_attr: "data-ga-stats-name".to_string(),
            generation_link_value: "generation_link".to_string(),
            candidate_colspans: vec!["6".to_string(), "7".to_string()],
        }
    }
}
