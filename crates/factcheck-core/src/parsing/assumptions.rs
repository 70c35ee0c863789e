//! Splitting an extraction completion into assumptions.

use crate::types::Assumption;

/// Split text into assumptions: one per non-empty trimmed line, in order.
///
/// Duplicates are kept; each one is verified on its own.
pub fn split_assumptions(text: &str) -> Vec<Assumption> {
    text.lines().filter_map(Assumption::from_line).collect()
}
