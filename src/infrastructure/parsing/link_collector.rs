//! Listing-page link harvesting
//!
//! Walks the anchors of the ad-list region in document order and collects up
//! to `limit` (link, name, price) triples. An anchor without an href means a
//! non-ad element broke the expected markup pattern, so collection stops
//! immediately even under the limit.

use anyhow::{Context, Result};
use scraper::{Html, Selector};
use tracing::debug;

use super::dom::element_text;
use super::site_profile::SiteProfile;

/// Parallel lists produced from one listing page.
///
/// The three lists always have the same length and positionally correspond to
/// one ad; a missing title or price span leaves an empty string at that
/// position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkBatch {
    pub links: Vec<String>,
    pub names: Vec<String>,
    pub prices: Vec<String>,
}

impl LinkBatch {
    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Ad title at `index`, if one was present on the page.
    pub fn name_at(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str).filter(|name| !name.is_empty())
    }

    /// Ad price text at `index`, if one was present on the page.
    pub fn price_at(&self, index: usize) -> Option<&str> {
        self.prices
            .get(index)
            .map(String::as_str)
            .filter(|price| !price.is_empty())
    }

    fn push(&mut self, link: String, name: String, price: String) {
        self.links.push(link);
        self.names.push(name);
        self.prices.push(price);
    }
}

/// Harvests ad entries from a listing page.
pub struct LinkCollector {
    container: Selector,
    anchor: Selector,
    title: Selector,
    price: Selector,
}

impl LinkCollector {
    pub fn new(profile: &SiteProfile) -> Result<Self> {
        Ok(Self {
            container: compile(&profile.ad_list_container)?,
            anchor: compile("a")?,
            title: compile(&profile.ad_title)?,
            price: compile(&profile.ad_price)?,
        })
    }

    /// Collects up to `limit` ad entries in document order.
    pub fn collect(&self, document: &Html, limit: usize) -> LinkBatch {
        let mut batch = LinkBatch::default();

        let Some(container) = document.select(&self.container).next() else {
            debug!("listing page has no ad-list container");
            return batch;
        };

        for anchor in container.select(&self.anchor) {
            if batch.len() == limit {
                break;
            }

            let Some(href) = anchor.value().attr("href") else {
                debug!(collected = batch.len(), "anchor without href, stopping collection");
                break;
            };

            let name = anchor
                .select(&self.title)
                .next()
                .map(element_text)
                .unwrap_or_default();
            let price = anchor
                .select(&self.price)
                .next()
                .map(element_text)
                .unwrap_or_default();

            batch.push(href.to_string(), name.trim().to_string(), price.trim().to_string());
        }

        debug!(count = batch.len(), "collected ad links");
        batch
    }
}

pub(crate) fn compile(selector: &str) -> Result<Selector> {
    Selector::parse(selector)
        .map_err(|e| anyhow::anyhow!("{e}"))
        .with_context(|| format!("compiling selector '{selector}'"))
}
