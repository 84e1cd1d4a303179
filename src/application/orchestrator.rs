//! Extraction orchestration
//!
//! Drives LinkCollector → {DetailExtractor → [TrimResolver] → TrimExtractor}
//! per ad link. Distinct vehicles are embarrassingly parallel, so the per-ad
//! chains run on a bounded worker pool; results land in a pre-sized slot
//! vector indexed by collector position so the output keeps the original
//! listing order regardless of completion order. A failure extracting one
//! vehicle never aborts the others.

use std::sync::Arc;

use anyhow::Result;
use scraper::Html;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domain::search::SearchQuery;
use crate::domain::vehicle::{Vehicle, format_price};
use crate::infrastructure::config::CrawlerConfig;
use crate::infrastructure::http_client::PageFetcher;
use crate::infrastructure::listing_url::{listing_url_for_make, listing_url_for_query};
use crate::infrastructure::parsing::detail_parser::{DetailPage, DetailParser};
use crate::infrastructure::parsing::error::PipelineError;
use crate::infrastructure::parsing::generation_parser::GenerationParser;
use crate::infrastructure::parsing::link_collector::{LinkBatch, LinkCollector};
use crate::infrastructure::parsing::quick_spec::QuickSpecParser;
use crate::infrastructure::parsing::site_profile::SiteProfile;
use crate::infrastructure::parsing::trim_parser::TrimParser;

/// One listing page to harvest, with its ad-link limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRequest {
    pub url: String,
    /// Maximum ad links to harvest from this listing; 0 means the configured
    /// default.
    pub limit: usize,
}

impl ListingRequest {
    pub fn new(url: impl Into<String>, limit: usize) -> Self {
        Self {
            url: url.into(),
            limit,
        }
    }

    /// Listing request for a full search query.
    pub fn for_query(query: &SearchQuery, limit: usize) -> Self {
        Self::new(listing_url_for_query(query), limit)
    }

    /// Listing request for one make constrained only by price.
    pub fn for_make(make: &str, min_price: &str, max_price: &str, limit: usize) -> Self {
        Self::new(listing_url_for_make(make, min_price, max_price), limit)
    }
}

/// One vehicle that could not be extracted, keyed by its collector index.
#[derive(Debug)]
pub struct ExtractionFailure {
    /// Position in the collector output the failed vehicle would have had.
    pub index: usize,
    pub link: String,
    pub error: PipelineError,
}

/// Outcome of one extraction batch.
#[derive(Debug, Default)]
pub struct ExtractionReport {
    /// Successfully extracted vehicles in collector order, ids dense 0..n-1.
    pub vehicles: Vec<Vehicle>,
    pub failures: Vec<ExtractionFailure>,
    /// True when the batch was cut short by cancellation; the vehicles that
    /// completed before the cut are still present.
    pub cancelled: bool,
}

struct PipelineParsers {
    detail: DetailParser,
    generation: GenerationParser,
    trim: TrimParser,
}

/// Drives the full extraction sequence against one fetcher.
pub struct ExtractionOrchestrator<F: PageFetcher + 'static> {
    fetcher: Arc<F>,
    collector: LinkCollector,
    parsers: Arc<PipelineParsers>,
    config: CrawlerConfig,
}

impl<F: PageFetcher + 'static> ExtractionOrchestrator<F> {
    pub fn new(fetcher: Arc<F>, profile: &SiteProfile, config: CrawlerConfig) -> Result<Self> {
        Ok(Self {
            fetcher,
            collector: LinkCollector::new(profile)?,
            parsers: Arc::new(PipelineParsers {
                detail: DetailParser::new(profile)?,
                generation: GenerationParser::new(profile)?,
                trim: TrimParser::new()?,
            }),
            config,
        })
    }

    /// Extracts vehicles from the given listings.
    pub async fn extract(
        &self,
        requests: &[ListingRequest],
    ) -> Result<ExtractionReport, PipelineError> {
        self.extract_with_cancellation(requests, CancellationToken::new())
            .await
    }

    /// Extracts vehicles with caller-side cancellation. On cancellation the
    /// report carries whatever vehicles completed plus the partial-failure
    /// indicator instead of blocking until the batch drains.
    pub async fn extract_with_cancellation(
        &self,
        requests: &[ListingRequest],
        token: CancellationToken,
    ) -> Result<ExtractionReport, PipelineError> {
        let batch = self.collect_links(requests, &token).await?;
        info!(count = batch.len(), "collected ad links, extracting vehicles");

        let total = batch.len();
        let semaphore = Arc::new(Semaphore::new(self.config.workers.max_concurrent.max(1)));
        let mut tasks = Vec::with_capacity(total);

        for index in 0..total {
            let fetcher = Arc::clone(&self.fetcher);
            let parsers = Arc::clone(&self.parsers);
            let permit = Arc::clone(&semaphore);
            let task_token = token.clone();
            let link = batch.links[index].clone();
            let name = batch.name_at(index).unwrap_or_default().to_string();
            let price = batch.price_at(index).map(str::to_string);

            tasks.push(tokio::spawn(async move {
                let _permit = match permit.acquire().await {
                    Ok(permit) => permit,
                    Err(_) => return None,
                };
                if task_token.is_cancelled() {
                    return None;
                }

                // Cancellation drops the in-flight chain, fetches included.
                tokio::select! {
                    _ = task_token.cancelled() => None,
                    result = extract_one(fetcher, parsers, link, name, price) => Some(result),
                }
            }));
        }

        // Pre-sized slots keep collector order independent of completion order.
        let mut slots: Vec<Option<Result<Vehicle, PipelineError>>> = Vec::with_capacity(total);
        slots.resize_with(total, || None);

        for (index, joined) in futures::future::join_all(tasks).await.into_iter().enumerate() {
            match joined {
                Ok(outcome) => slots[index] = outcome,
                Err(e) => warn!(index, error = %e, "extraction task aborted"),
            }
        }

        let mut report = ExtractionReport {
            cancelled: token.is_cancelled(),
            ..ExtractionReport::default()
        };
        for (index, slot) in slots.into_iter().enumerate() {
            match slot {
                Some(Ok(mut vehicle)) => {
                    vehicle.id = report.vehicles.len();
                    report.vehicles.push(vehicle);
                }
                Some(Err(error)) => {
                    warn!(index, error = %error, "vehicle extraction failed");
                    report.failures.push(ExtractionFailure {
                        index,
                        link: batch.links[index].clone(),
                        error,
                    });
                }
                None => {}
            }
        }

        info!(
            extracted = report.vehicles.len(),
            failed = report.failures.len(),
            cancelled = report.cancelled,
            "extraction batch finished"
        );
        Ok(report)
    }

    async fn collect_links(
        &self,
        requests: &[ListingRequest],
        token: &CancellationToken,
    ) -> Result<LinkBatch, PipelineError> {
        let mut combined = LinkBatch::default();

        for request in requests {
            if token.is_cancelled() {
                break;
            }

            let limit = if request.limit > 0 {
                request.limit
            } else {
                self.config.default_ad_limit
            };

            let markup = self.fetcher.fetch(&request.url).await?;
            let page_batch = {
                let document = Html::parse_document(&markup);
                self.collector.collect(&document, limit)
            };
            debug!(url = %request.url, count = page_batch.len(), "harvested listing");

            combined.links.extend(page_batch.links);
            combined.names.extend(page_batch.names);
            combined.prices.extend(page_batch.prices);
        }

        Ok(combined)
    }
}

/// Extracts one vehicle: detail page, then the trim stage state machine —
/// a direct trim link goes straight to the trim page, a generation link goes
/// through trim resolution first, and a resolution miss keeps the vehicle
/// with its detail-level fields only.
async fn extract_one<F: PageFetcher>(
    fetcher: Arc<F>,
    parsers: Arc<PipelineParsers>,
    link: String,
    name: String,
    price: Option<String>,
) -> Result<Vehicle, PipelineError> {
    let markup = fetcher.fetch(&link).await?;
    let page = {
        let document = Html::parse_document(&markup);
        parsers.detail.parse(&document, &name)?
    };
    drop(markup);

    let DetailPage {
        mut vehicle,
        quick_specs,
        complectation_link,
        generation_link,
    } = page;

    if let Some(raw_price) = price {
        vehicle.offering.price = format_price(&raw_price);
    }

    let trim_link = match (complectation_link, generation_link) {
        (Some(direct), _) => Some(direct),
        (None, Some(generation)) => {
            let markup = fetcher.fetch(&generation).await?;
            let specs = QuickSpecParser::normalize(&quick_specs);
            let resolved = {
                let document = Html::parse_document(&markup);
                parsers.generation.resolve(&document, &specs)
            };
            match resolved {
                Ok(resolved_link) => Some(resolved_link),
                Err(e) => {
                    // Terminal with partial data: the vehicle keeps its
                    // detail-level fields.
                    debug!(link = %generation, error = %e, "trim resolution failed");
                    None
                }
            }
        }
        (None, None) => None,
    };

    if let Some(trim) = trim_link {
        let markup = fetcher.fetch(&trim).await?;
        vehicle = {
            let document = Html::parse_document(&markup);
            parsers.trim.apply(&document, vehicle)?
        };
    }

    Ok(vehicle)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;

    use super::*;
    use crate::infrastructure::http_client::FetchError;

    /// In-memory fetcher over canned pages.
    struct StubFetcher {
        pages: HashMap<String, String>,
    }

    impl StubFetcher {
        fn new(pages: &[(&str, String)]) -> Self {
            Self {
                pages: pages
                    .iter()
                    .map(|(url, markup)| ((*url).to_string(), markup.clone()))
                    .collect(),
            }
        }
    }

    #[async_trait]
    impl PageFetcher for StubFetcher {
        async fn fetch(&self, url: &str) -> Result<String, FetchError> {
            self.pages.get(url).cloned().ok_or_else(|| FetchError::Parse {
                url: url.to_string(),
                reason: "no such page".to_string(),
            })
        }
    }

    fn listing_page(ads: &[(&str, &str, &str)]) -> String {
        let anchors: String = ads
            .iter()
            .map(|(href, name, price)| {
                format!(
                    "<a href=\"{href}\">\
                       <span data-ftid=\"bull_title\">{name}</span>\
                       <span data-ftid=\"bull_price\">{price}</span>\
                     </a>"
                )
            })
            .collect();
        format!(
            "<html><body><div data-bulletin-list=\"true\">{anchors}</div></body></html>"
        )
    }

    fn bare_detail_page() -> String {
        "<html><body><span class=\"css-1osyw3j ei6iaw00\">35 000 км</span></body></html>"
            .to_string()
    }

    fn orchestrator(fetcher: StubFetcher) -> ExtractionOrchestrator<StubFetcher> {
        ExtractionOrchestrator::new(
            Arc::new(fetcher),
            &SiteProfile::default(),
            CrawlerConfig::default(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn assigns_dense_ids_in_collector_order() {
        let fetcher = StubFetcher::new(&[
            (
                "http://listing.test/",
                listing_page(&[
                    ("http://ad.test/1", "Kia Rio, 2018", "900000"),
                    ("http://ad.test/2", "Kia Rio, 2019", "1100000"),
                    ("http://ad.test/3", "Kia Rio, 2020", "1300000"),
                ]),
            ),
            ("http://ad.test/1", bare_detail_page()),
            ("http://ad.test/2", bare_detail_page()),
            ("http://ad.test/3", bare_detail_page()),
        ]);

        let report = orchestrator(fetcher)
            .extract(&[ListingRequest::new("http://listing.test/", 10)])
            .await
            .unwrap();

        assert_eq!(report.vehicles.len(), 3);
        assert!(report.failures.is_empty());
        for (i, vehicle) in report.vehicles.iter().enumerate() {
            assert_eq!(vehicle.id, i);
        }
        assert_eq!(report.vehicles[0].offering.year, 2018);
        assert_eq!(report.vehicles[2].offering.year, 2020);
        assert_eq!(report.vehicles[1].offering.price, "1 100 000 ₽");
    }

    #[tokio::test]
    async fn per_vehicle_failures_are_isolated() {
        // The middle ad's detail page is missing entirely.
        let fetcher = StubFetcher::new(&[
            (
                "http://listing.test/",
                listing_page(&[
                    ("http://ad.test/1", "Kia Rio, 2018", "900000"),
                    ("http://ad.test/missing", "Kia Rio, 2019", "1100000"),
                    ("http://ad.test/3", "Kia Rio, 2020", "1300000"),
                ]),
            ),
            ("http://ad.test/1", bare_detail_page()),
            ("http://ad.test/3", bare_detail_page()),
        ]);

        let report = orchestrator(fetcher)
            .extract(&[ListingRequest::new("http://listing.test/", 10)])
            .await
            .unwrap();

        assert_eq!(report.vehicles.len(), 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].index, 1);
        assert_eq!(report.failures[0].link, "http://ad.test/missing");
        // Ids stay dense over the successful subset.
        assert_eq!(report.vehicles[0].id, 0);
        assert_eq!(report.vehicles[1].id, 1);
        assert_eq!(report.vehicles[1].offering.year, 2020);
    }

    #[tokio::test]
    async fn cancelled_batch_reports_partial_failure() {
        let fetcher = StubFetcher::new(&[(
            "http://listing.test/",
            listing_page(&[("http://ad.test/1", "Kia Rio, 2018", "900000")]),
        )]);

        let token = CancellationToken::new();
        token.cancel();

        let report = orchestrator(fetcher)
            .extract_with_cancellation(&[ListingRequest::new("http://listing.test/", 10)], token)
            .await
            .unwrap();

        assert!(report.cancelled);
        assert!(report.vehicles.is_empty());
        assert!(report.failures.is_empty());
    }

    #[test]
    fn listing_request_builds_query_url() {
        let request = ListingRequest::for_query(&SearchQuery::for_make("toyota"), 5);
        assert_eq!(request.url, "https://auto.drom.ru/toyota/?ph=1&unsold=1");
        assert_eq!(request.limit, 5);
    }

    #[tokio::test]
    async fn missing_year_in_name_is_a_reported_failure() {
        let fetcher = StubFetcher::new(&[
            (
                "http://listing.test/",
                listing_page(&[("http://ad.test/1", "Kia Rio", "900000")]),
            ),
            ("http://ad.test/1", bare_detail_page()),
        ]);

        let report = orchestrator(fetcher)
            .extract(&[ListingRequest::new("http://listing.test/", 10)])
            .await
            .unwrap();

        assert!(report.vehicles.is_empty());
        assert_eq!(report.failures.len(), 1);
        assert!(matches!(
            report.failures[0].error,
            PipelineError::Extraction(_)
        ));
    }
}
