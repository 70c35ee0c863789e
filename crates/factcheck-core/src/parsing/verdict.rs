//! Verdict and confidence extraction.
//!
//! ## Tie-break
//!
//! A text that mentions both "true" and "false" anywhere is read as `False`.
//! The rule favors the negative signal and ignores position and negation.
//! It is kept as-is for behavioral parity and is flagged for product review
//! rather than corrected here.

use crate::types::{Confidence, Verdict};

use super::patterns::{
    mentions_false, mentions_true, HIGH_CONFIDENCE_PATTERN, MEDIUM_CONFIDENCE_PATTERN,
    VERDICT_MARKER_PATTERN,
};

/// Read a verdict from free text.
///
/// | Text contains | Verdict |
/// |---------------|---------|
/// | "true" and not "false" | `True` |
/// | "false" | `False` |
/// | neither | `Uncertain` |
pub fn parse_verdict(text: &str) -> Verdict {
    let has_false = mentions_false(text);
    if mentions_true(text) && !has_false {
        Verdict::True
    } else if has_false {
        Verdict::False
    } else {
        Verdict::Uncertain
    }
}

/// Read a confidence tier from free text. Defaults to `Low`.
pub fn parse_confidence(text: &str) -> Confidence {
    if HIGH_CONFIDENCE_PATTERN.is_match(text) {
        Confidence::High
    } else if MEDIUM_CONFIDENCE_PATTERN.is_match(text) {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

/// The text following the first `Verdict:` marker, up to the next line
/// break, trimmed. `None` when the marker is absent.
pub fn extract_verdict_marker(analysis: &str) -> Option<&str> {
    VERDICT_MARKER_PATTERN
        .captures(analysis)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
}

/// Verdict for one assumption's analysis.
///
/// Without a `Verdict:` marker the assumption is `Uncertain`. With one, the
/// marker's label (`True`, `[False]`, `Uncertain`, ...) is read with
/// [`parse_verdict`].
pub fn assumption_verdict(analysis: &str) -> Verdict {
    match extract_verdict_marker(analysis) {
        Some(label) => parse_verdict(label),
        None => {
            tracing::debug!("analysis has no Verdict: marker, defaulting to Uncertain");
            Verdict::Uncertain
        }
    }
}
