//! One-shot extraction runner: crawl a make's listing and print the vehicles.
//!
//! Usage: `crawl [make] [limit]`

use std::sync::Arc;

use motorscout::application::{ExtractionOrchestrator, ListingRequest};
use motorscout::infrastructure::{AppConfig, HttpClient, SiteProfile, init_logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load_or_default("motorscout.json").await?;
    init_logging(&config.logging)?;

    let mut args = std::env::args().skip(1);
    let make = args.next().unwrap_or_else(|| "toyota".to_string());
    let limit: usize = args
        .next()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(config.crawler.default_ad_limit);

    let fetcher = Arc::new(HttpClient::new(config.crawler.workers.http_client_config())?);
    let orchestrator =
        ExtractionOrchestrator::new(fetcher, &SiteProfile::default(), config.crawler.clone())?;

    let report = orchestrator
        .extract(&[ListingRequest::for_make(&make, "", "", limit)])
        .await?;

    for failure in &report.failures {
        eprintln!("failed #{} {}: {}", failure.index, failure.link, failure.error);
    }
    println!("{}", serde_json::to_string_pretty(&report.vehicles)?);

    Ok(())
}
