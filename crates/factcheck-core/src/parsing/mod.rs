//! Reading structured signals out of free-text model completions.
//!
//! These rules are a versioned policy: any change to what counts as a
//! verdict or confidence signal bumps [`POLICY_VERSION`], so reports can be
//! compared across revisions.

pub mod assumptions;
pub mod patterns;
pub mod verdict;

pub use assumptions::split_assumptions;
pub use verdict::{assumption_verdict, extract_verdict_marker, parse_confidence, parse_verdict};

/// Revision of the lexical verdict/confidence heuristics.
pub const POLICY_VERSION: &str = "1.0";
