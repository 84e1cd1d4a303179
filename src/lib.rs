//! motorscout - classified-ad vehicle data extraction pipeline
//!
//! Turns loosely-structured classified-ad HTML from a catalog site into
//! normalized, strongly-typed vehicle records: listing-page link harvesting,
//! detail-page parsing, trim disambiguation on generation pages, trim-page
//! field extraction, and field normalization. The ranking and persistence
//! layers consuming the extracted list live outside this crate.

// Module declarations
pub mod application;
pub mod domain;
pub mod infrastructure;

// Re-export the main entry points
pub use application::{ExtractionOrchestrator, ExtractionReport, ListingRequest};
pub use domain::{SearchQuery, Vehicle};
pub use infrastructure::{AppConfig, HttpClient, PageFetcher, SiteProfile, init_logging};
