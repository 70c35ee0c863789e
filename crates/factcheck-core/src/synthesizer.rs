//! Synthesizer: turns verification output into prompt inputs and the final answer.
//!
//! Two directions:
//! 1. Structured -> text: evidence and verification results are serialized
//!    as JSON before they are spliced into prompts.
//! 2. Text -> structured: the synthesis completion becomes a [`FinalAnswer`]
//!    through the lexical rules in [`crate::parsing`].

use crate::evidence::EvidenceRecord;
use crate::parsing::{parse_confidence, parse_verdict};
use crate::types::{FinalAnswer, VerificationResults};

/// Stateless aggregation helpers for the last pipeline stage.
#[derive(Debug, Clone, Copy, Default)]
pub struct Synthesizer;

impl Synthesizer {
    pub fn new() -> Self {
        Self
    }

    /// Build the final answer from the synthesis completion.
    ///
    /// The summary is the full completion text; verdict and confidence are
    /// read from that same text.
    pub fn final_answer(&self, synthesis: &str) -> FinalAnswer {
        FinalAnswer {
            verdict: parse_verdict(synthesis),
            summary: synthesis.to_string(),
            confidence: parse_confidence(synthesis),
        }
    }

    /// Serialized form of the full result mapping, keys in extraction order.
    pub fn serialize_results(&self, results: &VerificationResults) -> String {
        // Plain data with string keys: serialization cannot fail.
        serde_json::to_string(results).unwrap_or_default()
    }

    /// Serialized form of one assumption's evidence.
    pub fn serialize_evidence(&self, evidence: &[EvidenceRecord]) -> String {
        serde_json::to_string(evidence).unwrap_or_default()
    }
}
