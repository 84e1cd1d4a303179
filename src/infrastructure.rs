//! Infrastructure layer: HTTP fetching, configuration, logging, URL building
//! and HTML parsing
//!
//! Everything that touches the outside world (network, filesystem, the target
//! site's markup) lives here; the parsing submodule turns fetched documents
//! into domain records.

pub mod config;
pub mod http_client;
pub mod listing_url;
pub mod logging;
pub mod parsing;

// Re-export commonly used items
pub use config::{AppConfig, CrawlerConfig, WorkerConfig};
pub use http_client::{FetchError, HttpClient, HttpClientConfig, PageFetcher, RequestThrottle};
pub use listing_url::{listing_url_for_make, listing_url_for_query};
pub use logging::init_logging;
pub use parsing::{
    AggregateParseError, DetailPage, DetailParser, ExtractionError, GenerationParser, LinkBatch,
    LinkCollector, PipelineError, QuickSpecParser, ResolutionError, SiteProfile, TrimParser,
};
