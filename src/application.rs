//! Application layer - extraction orchestration
//!
//! Drives the per-ad extraction chain over a bounded worker pool and
//! assembles the final ordered vehicle list.

pub mod orchestrator;

pub use orchestrator::{
    ExtractionFailure, ExtractionOrchestrator, ExtractionReport, ListingRequest,
};
