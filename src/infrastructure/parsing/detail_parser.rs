//! Detail-page extraction
//!
//! Parses one ad's detail page into a partial vehicle record and discovers
//! the optional trim (complectation) and generation links that drive the
//! next pipeline stage. The parser owns its output: it returns a fresh
//! `DetailPage` instead of mutating a record threaded through the call chain.

use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::debug;

use super::dom::{element_text, prev_element};
use super::error::ExtractionError;
use super::link_collector::compile;
use super::quick_spec::QuickSpecParser;
use super::site_profile::{NEW_VEHICLE_TEXT, SiteProfile};
use crate::domain::quick_spec::RawQuickSpecs;
use crate::domain::vehicle::{SteeringPosition, Vehicle};

static YEAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{4}").expect("year pattern"));

const IMAGE_EXTENSIONS: [&str; 3] = [".jpg", ".jpeg", ".png"];

const LABEL_BODY: &str = "Тип кузова";
const LABEL_COLOR: &str = "Цвет";
const LABEL_STEERING: &str = "Руль";
const LABEL_COMPLECTATION: &str = "Комплектация";

const STEERING_LEFT: &str = "левый";
const STEERING_RIGHT: &str = "правый";

/// Result of parsing one detail page.
#[derive(Debug, Clone, Default)]
pub struct DetailPage {
    /// Vehicle with the detail-level fields populated.
    pub vehicle: Vehicle,
    /// Raw quick specs seeding trim disambiguation.
    pub quick_specs: RawQuickSpecs,
    /// Direct trim link, when the ad names its complectation.
    pub complectation_link: Option<String>,
    /// Generation link, when the ad names its generation.
    pub generation_link: Option<String>,
}

/// Parses detail pages.
pub struct DetailParser {
    description: Selector,
    description_index: usize,
    gallery: Selector,
    anchor: Selector,
    characteristics_cell: Selector,
    kilometerage: Selector,
    new_vehicle_marker: Selector,
    generation_link_attr: String,
    generation_link_value: String,
    quick_specs: QuickSpecParser,
}

impl DetailParser {
    pub fn new(profile: &SiteProfile) -> Result<Self> {
        Ok(Self {
            description: compile(&profile.description)?,
            description_index: profile.description_index,
            gallery: compile(&profile.gallery)?,
            anchor: compile("a")?,
            characteristics_cell: compile(&profile.characteristics_cell)?,
            kilometerage: compile(&profile.kilometerage)?,
            new_vehicle_marker: compile(&profile.new_vehicle_marker)?,
            generation_link_attr: profile.generation_link_attr.clone(),
            generation_link_value: profile.generation_link_value.clone(),
            quick_specs: QuickSpecParser::new(profile)?,
        })
    }

    /// Parses one detail page. `display_name` is the ad title from the
    /// listing page; the model year is taken from its last 4-digit run.
    pub fn parse(
        &self,
        document: &Html,
        display_name: &str,
    ) -> Result<DetailPage, ExtractionError> {
        let mut page = DetailPage::default();
        page.vehicle.full_name = display_name.to_string();
        page.vehicle.offering.year = find_year_of_manufacture(display_name)?;

        if let Some(span) = document.select(&self.description).nth(self.description_index) {
            let text = element_text(span);
            if !text.is_empty() {
                page.vehicle.description = text;
            }
        }

        if let Some(gallery) = document.select(&self.gallery).next() {
            for anchor in gallery.select(&self.anchor) {
                let Some(href) = anchor.value().attr("href") else {
                    continue;
                };
                if IMAGE_EXTENSIONS.iter().any(|ext| href.ends_with(ext)) {
                    page.vehicle.offering.photo_urls.push(href.to_string());
                }
            }
        }

        page.quick_specs = self.quick_specs.extract(document);

        for cell in document.select(&self.characteristics_cell) {
            let Some(label_cell) = prev_element(cell) else {
                continue;
            };
            match element_text(label_cell).as_str() {
                LABEL_BODY => page.vehicle.specs.body = element_text(cell),
                LABEL_COLOR => page.vehicle.features.color = element_text(cell),
                LABEL_STEERING => {
                    page.vehicle.specs.steering.position = match element_text(cell).as_str() {
                        STEERING_LEFT => SteeringPosition::Left,
                        STEERING_RIGHT => SteeringPosition::Right,
                        _ => SteeringPosition::Unknown,
                    };
                }
                LABEL_COMPLECTATION => {
                    page.complectation_link = cell
                        .children()
                        .find_map(scraper::ElementRef::wrap)
                        .and_then(|child| child.value().attr("href"))
                        .map(str::to_string);
                }
                _ => {}
            }
        }

        page.vehicle.offering.kilometerage = document
            .select(&self.kilometerage)
            .map(element_text)
            .collect();

        // Unused vehicles show a marker instead of an odometer value.
        if page.vehicle.offering.kilometerage.is_empty() {
            let marker: String = document
                .select(&self.new_vehicle_marker)
                .map(element_text)
                .collect();
            if marker == NEW_VEHICLE_TEXT {
                page.vehicle.offering.kilometerage = NEW_VEHICLE_TEXT.to_string();
            }
        }

        for anchor in document.select(&self.anchor) {
            if anchor.value().attr(&self.generation_link_attr)
                == Some(self.generation_link_value.as_str())
            {
                page.generation_link = anchor.value().attr("href").map(str::to_string);
                page.vehicle.generation = element_text(anchor);
            }
        }

        debug!(
            name = display_name,
            photos = page.vehicle.offering.photo_urls.len(),
            has_trim_link = page.complectation_link.is_some(),
            has_generation_link = page.generation_link.is_some(),
            "parsed detail page"
        );
        Ok(page)
    }
}

/// Finds the model year: the last 4-digit run of the ad name. Ads commonly
/// prefix other 4-digit numbers (engine codes), so the last run wins.
fn find_year_of_manufacture(display_name: &str) -> Result<i32, ExtractionError> {
    YEAR_RE
        .find_iter(display_name)
        .last()
        .and_then(|m| m.as_str().parse().ok())
        .ok_or_else(|| ExtractionError::NoYearFound {
            display_name: display_name.to_string(),
        })
}
