//! Domain module - core entities of the extraction pipeline
//!
//! Contains the vehicle record handed to the ranking/persistence collaborators,
//! the quick-spec summary used for trim disambiguation, and the catalog search
//! descriptor. All entities are plain data created fresh per extraction batch.

pub mod quick_spec;
pub mod search;
pub mod vehicle;

// Re-export commonly used items for convenience
pub use quick_spec::{QuickSpecKey, QuickSpecSet, RawQuickSpecs};
pub use search::SearchQuery;
pub use vehicle::{Availability, Offering, SteeringPosition, Vehicle, format_price};
