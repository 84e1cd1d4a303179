//! Trim disambiguation on generation pages
//!
//! A generation page lists several trim candidates, each introduced by a
//! header cell spanning the candidate-block width and summarizing its quick
//! specs ("2.0 л, 150 л.с., бензин, АКПП, передний привод"). The vehicle's
//! normalized quick-spec values are matched against each block's text; the
//! first block containing every value is the vehicle's trim, and its catalog
//! link sits in the row after the header.

use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

use super::dom::{element_text, next_element, parent_element};
use super::error::ResolutionError;
use super::link_collector::compile;
use super::site_profile::SiteProfile;
use crate::domain::quick_spec::QuickSpecSet;

/// Shape of a valid trim-page path.
static TRIM_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/catalog/.+/.+/\d+/").expect("trim link pattern"));

/// Resolves the trim link for a vehicle from its generation page.
pub struct GenerationParser {
    header_cell: Selector,
    anchor: Selector,
    origin: String,
    candidate_colspans: Vec<String>,
}

impl GenerationParser {
    pub fn new(profile: &SiteProfile) -> Result<Self> {
        Ok(Self {
            header_cell: compile("th")?,
            anchor: compile("a")?,
            origin: profile.origin.clone(),
            candidate_colspans: profile.candidate_colspans.clone(),
        })
    }

    /// Selects the candidate whose text contains every normalized quick-spec
    /// value (full coverage; first full match wins and scanning stops) and
    /// returns its absolute trim link.
    pub fn resolve(
        &self,
        document: &Html,
        specs: &QuickSpecSet,
    ) -> Result<String, ResolutionError> {
        for header in document.select(&self.header_cell) {
            let Some(colspan) = header.value().attr("colspan") else {
                continue;
            };
            if !self.candidate_colspans.iter().any(|c| c == colspan) {
                continue;
            }

            let block_text = element_text(header);
            let covered = specs.coverage_in(&block_text);
            debug!(covered, required = specs.len(), "checked trim candidate block");
            if covered != specs.len() {
                continue;
            }

            // The trim link lives in the row following the matched header.
            let link = parent_element(header)
                .and_then(next_element)
                .and_then(|row| row.select(&self.anchor).next())
                .and_then(|anchor| anchor.value().attr("href"))
                .filter(|href| TRIM_LINK_RE.is_match(href));

            return match link {
                Some(href) => Ok(self.qualify(href)),
                None => Err(ResolutionError::MissingTrimLink),
            };
        }

        Err(ResolutionError::NoMatchingTrim {
            required: specs.len(),
        })
    }

    /// Qualifies a relative catalog path against the site origin.
    fn qualify(&self, href: &str) -> String {
        Url::parse(&self.origin)
            .and_then(|origin| origin.join(href))
            .map(String::from)
            .unwrap_or_else(|_| format!("{}{href}", self.origin))
    }
}
