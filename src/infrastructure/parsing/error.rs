//! Parsing and pipeline error types

use std::fmt;

use thiserror::Error;

use crate::infrastructure::http_client::FetchError;

/// A required detail-page field could not be extracted.
#[derive(Error, Debug, Clone)]
pub enum ExtractionError {
    /// The ad name carries no 4-digit year run.
    #[error("no model year found in ad name '{display_name}'")]
    NoYearFound { display_name: String },
}

/// Trim disambiguation on a generation page failed.
#[derive(Error, Debug, Clone)]
pub enum ResolutionError {
    /// No candidate block contained every normalized quick-spec value.
    #[error("no trim candidate covers all {required} quick-spec values")]
    NoMatchingTrim { required: usize },

    /// A block matched but the row after it carries no valid catalog link.
    #[error("matched trim candidate has no valid catalog link")]
    MissingTrimLink,
}

/// One field-scoped parse failure on a trim page.
#[derive(Debug, Clone)]
pub struct FieldFailure {
    /// The field label as it appears on the page.
    pub field: &'static str,
    pub reason: String,
}

impl FieldFailure {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// One or more typed-field parses failed on a trim page.
///
/// Every failure is field-tagged and retained; the remaining fields of the
/// page were still attempted before this error was produced.
#[derive(Debug, Clone)]
pub struct AggregateParseError {
    failures: Vec<FieldFailure>,
}

impl AggregateParseError {
    /// Panics in debug builds if `failures` is empty; an aggregate error with
    /// nothing in it is a logic error at the call site.
    pub fn new(failures: Vec<FieldFailure>) -> Self {
        debug_assert!(!failures.is_empty());
        Self { failures }
    }

    pub fn failures(&self) -> &[FieldFailure] {
        &self.failures
    }
}

impl fmt::Display for AggregateParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.failures.first() {
            Some(first) => {
                write!(f, "trim field '{}' failed to parse: {}", first.field, first.reason)?;
                if self.failures.len() > 1 {
                    write!(f, " (+{} more)", self.failures.len() - 1)?;
                }
                Ok(())
            }
            None => write!(f, "trim field parse failed"),
        }
    }
}

impl std::error::Error for AggregateParseError {}

/// Umbrella error for one vehicle's extraction chain, reported per collector
/// index by the orchestrator.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    TrimFields(#[from] AggregateParseError),
}
