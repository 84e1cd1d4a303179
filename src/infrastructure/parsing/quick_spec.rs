//! Quick-spec extraction and normalization
//!
//! A detail page advertises a compact inline summary (engine descriptor,
//! power, gearbox, drive). The raw values are kept verbatim for display; the
//! normalized set rewrites them into the vocabulary used on trim pages so the
//! two sides can be compared textually.

use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;
use scraper::{Html, Selector};

use super::dom::{element_text, prev_element};
use super::link_collector::compile;
use super::site_profile::SiteProfile;
use crate::domain::quick_spec::{QuickSpecKey, QuickSpecSet, RawQuickSpecs};

/// Fuel token + optional displacement + optional hybrid marker, e.g.
/// "бензин, 2.0 л", "бензин, 2.0 л, гибрид" or a bare "электро".
static ENGINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[а-яА-ЯёЁ]+(?:,\s*\d+(?:\.\d+)?\s*л(?:,\s*гибрид)?)?")
        .expect("engine descriptor pattern")
});

/// 2–4 digit power figure immediately followed by the horsepower marker.
static POWER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{2,4}\s?л\.с\.").expect("power pattern"));

const LABEL_POWER: &str = "Мощность";
const LABEL_GEARBOX: &str = "Коробка передач";
const LABEL_DRIVE: &str = "Привод";

const ELECTRIC_SHORT: &str = "электро";
const ELECTRIC_LONG: &str = "электричество";

/// Extracts the compact spec summary from a detail page.
pub struct QuickSpecParser {
    engine_summary: Selector,
    characteristics_cell: Selector,
}

impl QuickSpecParser {
    pub fn new(profile: &SiteProfile) -> Result<Self> {
        Ok(Self {
            engine_summary: compile(&profile.engine_summary)?,
            characteristics_cell: compile(&profile.characteristics_cell)?,
        })
    }

    /// Reads the raw quick-spec values from a detail page.
    pub fn extract(&self, document: &Html) -> RawQuickSpecs {
        let mut raw = RawQuickSpecs::default();

        let summary: String = document
            .select(&self.engine_summary)
            .map(element_text)
            .collect();
        if let Some(m) = ENGINE_RE.find(&summary) {
            raw.engine = m.as_str().to_string();
        }

        for cell in document.select(&self.characteristics_cell) {
            let Some(label_cell) = prev_element(cell) else {
                continue;
            };
            match element_text(label_cell).as_str() {
                LABEL_POWER => {
                    let text = element_text(cell);
                    if let Some(m) = POWER_RE.find(&text) {
                        raw.power = m.as_str().to_string();
                    }
                }
                LABEL_GEARBOX => raw.gearbox = element_text(cell),
                LABEL_DRIVE => raw.drive = element_text(cell),
                _ => {}
            }
        }

        raw
    }

    /// Normalizes raw values into the trim-page vocabulary.
    ///
    /// Power loses its unit suffix, the engine descriptor loses whitespace and
    /// splits into independently-keyed sub-tokens, and the electro descriptor
    /// is rewritten to the long form with the gearbox key dropped entirely
    /// (electric vehicles have no transmission to match against).
    pub fn normalize(raw: &RawQuickSpecs) -> QuickSpecSet {
        let mut specs = QuickSpecSet::new();

        let power = raw.power.replace("л.с.", "");
        specs.insert(QuickSpecKey::Power, power.trim());
        specs.insert(QuickSpecKey::Drive, raw.drive.trim());

        let engine: String = raw.engine.chars().filter(|c| !c.is_whitespace()).collect();
        if engine == ELECTRIC_SHORT {
            specs.insert(QuickSpecKey::EngineFuel, ELECTRIC_LONG);
            return specs;
        }

        let mut tokens = engine.split(',');
        if let Some(fuel) = tokens.next() {
            specs.insert(QuickSpecKey::EngineFuel, fuel);
        }
        if let Some(displacement) = tokens.next() {
            // "2.0л" lost its space above; the trim table shows a bare "2.0".
            specs.insert(
                QuickSpecKey::EngineDisplacement,
                displacement.replacen('л', "", 1),
            );
        }
        if let Some(hybrid) = tokens.next() {
            specs.insert(QuickSpecKey::EngineHybrid, hybrid);
        }

        let gearbox = match raw.gearbox.trim() {
            "механика" => "МКПП",
            "автомат" => "АКПП",
            other => other,
        };
        specs.insert(QuickSpecKey::Gearbox, gearbox);

        specs
    }
}
