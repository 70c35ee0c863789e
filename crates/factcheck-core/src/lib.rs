//! # factcheck-core
//!
//! Deterministic half of the claim verification pipeline.
//!
//! This crate holds everything that does not talk to a model or the network:
//! - The data model for one verification run
//! - Domain-based credibility scoring
//! - Lexical verdict/confidence parsing of model completions
//! - The report JSON Schema
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: Same input always produces same output
//! 2. **No I/O**: No model calls, no search calls
//! 3. **Per-run ownership**: Nothing is shared between runs except static tables
//!
//! ## Example
//!
//! ```rust,ignore
//! use factcheck_core::{parse_verdict, CredibilityScorer, EvidenceBuilder, Verdict};
//!
//! let evidence = vec![EvidenceBuilder::new("https://www.nasa.gov/apollo").build()];
//! assert_eq!(CredibilityScorer::new().score(&evidence), 0.9);
//! assert_eq!(parse_verdict("Verdict: True"), Verdict::True);
//! ```

pub mod credibility;
pub mod evidence;
pub mod parsing;
pub mod report;
pub mod synthesizer;
pub mod types;

// Re-export main types at crate root
pub use credibility::CredibilityScorer;
pub use evidence::{extract_domain, EvidenceBuilder, EvidenceRecord};
pub use parsing::{
    assumption_verdict, extract_verdict_marker, parse_confidence, parse_verdict,
    split_assumptions, POLICY_VERSION,
};
pub use report::{is_valid_report, validate_report, ReportError, SchemaError};
pub use synthesizer::Synthesizer;
pub use types::{
    Assumption, AssumptionVerdict, Claim, CompletedCheck, Confidence, FactCheckReport,
    FinalAnswer, ReportStatus, Verdict, VerificationResult, VerificationResults,
};

use thiserror::Error;

/// Errors raised by core validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Invalid claim")]
    InvalidClaim,
}
