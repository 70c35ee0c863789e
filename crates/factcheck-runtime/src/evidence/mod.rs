//! Evidence for one assumption.
//!
//! The pipeline asks an [`EvidenceSource`] for records and never sees a
//! search backend directly. [`EvidenceGatherer`] is the production source:
//! it picks a backend, normalizes results and absorbs search failures.

use async_trait::async_trait;
use factcheck_core::EvidenceRecord;
use thiserror::Error;

use crate::search::SearchError;

mod gatherer;

pub use gatherer::{EvidenceGatherer, DEFAULT_RESULTS_LIMIT};

/// Errors an evidence source may surface to the pipeline.
///
/// [`EvidenceGatherer`] never returns these; other sources may, and the
/// pipeline isolates them to the assumption being verified.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvidenceError {
    #[error("Search failed: {0}")]
    Search(#[from] SearchError),

    #[error("Evidence unavailable: {0}")]
    Unavailable(String),
}

/// Source of evidence records for a query.
#[async_trait]
pub trait EvidenceSource: Send + Sync {
    async fn gather(&self, query: &str) -> Result<Vec<EvidenceRecord>, EvidenceError>;

    /// Called once when a verification run starts. Sources holding state
    /// between searches clear it here so runs stay independent.
    fn start_run(&self) {}
}
