//! Lexical patterns used to read structure out of model completions.
//!
//! All matching is literal substring matching: no word boundaries, no
//! negation handling. "not true" contains "true"; "untrue" does too.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // =========================================================================
    // VERDICT SIGNALS
    // =========================================================================

    /// Positive verdict signal
    pub static ref TRUE_PATTERN: Regex = Regex::new(r"(?i)true").unwrap();

    /// Negative verdict signal
    pub static ref FALSE_PATTERN: Regex = Regex::new(r"(?i)false").unwrap();

    /// `Verdict:` marker in a per-assumption analysis; captures the rest of the line.
    /// The marker itself is case-sensitive.
    pub static ref VERDICT_MARKER_PATTERN: Regex = Regex::new(r"Verdict:([^\n]*)").unwrap();

    // =========================================================================
    // CONFIDENCE SIGNALS
    // =========================================================================

    pub static ref HIGH_CONFIDENCE_PATTERN: Regex = Regex::new(r"(?i)high confidence").unwrap();

    pub static ref MEDIUM_CONFIDENCE_PATTERN: Regex =
        Regex::new(r"(?i)medium confidence").unwrap();
}

/// Check if text carries a positive verdict signal.
pub fn mentions_true(text: &str) -> bool {
    TRUE_PATTERN.is_match(text)
}

/// Check if text carries a negative verdict signal.
pub fn mentions_false(text: &str) -> bool {
    FALSE_PATTERN.is_match(text)
}
