//! Data model for one verification run.
//!
//! Every run builds its own object graph from a [`Claim`]; nothing here is
//! shared across runs or persisted.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::evidence::EvidenceRecord;
use crate::CoreError;

/// The user-supplied statement to be fact-checked.
///
/// Construction goes through [`Claim::parse`], so a `Claim` is never blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Claim(String);

impl Claim {
    /// Accept a claim if it is non-empty after trimming whitespace.
    ///
    /// The original text is kept as given; trimming only decides validity.
    pub fn parse(text: impl Into<String>) -> Result<Self, CoreError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(CoreError::InvalidClaim);
        }
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Claim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An independently verifiable sub-claim extracted from the initial response.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Assumption(String);

impl Assumption {
    /// Build from a raw line. Returns `None` for lines that are blank once trimmed.
    pub fn from_line(line: &str) -> Option<Self> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Assumption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Assumption {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Verdict for a claim as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    True,
    False,
    Uncertain,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::True => write!(f, "True"),
            Verdict::False => write!(f, "False"),
            Verdict::Uncertain => write!(f, "Uncertain"),
        }
    }
}

/// Verdict for a single assumption. `Error` marks an assumption whose
/// verification failed and was isolated from the rest of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssumptionVerdict {
    True,
    False,
    Uncertain,
    Error,
}

impl From<Verdict> for AssumptionVerdict {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::True => AssumptionVerdict::True,
            Verdict::False => AssumptionVerdict::False,
            Verdict::Uncertain => AssumptionVerdict::Uncertain,
        }
    }
}

impl fmt::Display for AssumptionVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssumptionVerdict::True => write!(f, "True"),
            AssumptionVerdict::False => write!(f, "False"),
            AssumptionVerdict::Uncertain => write!(f, "Uncertain"),
            AssumptionVerdict::Error => write!(f, "Error"),
        }
    }
}

/// Confidence tier read from the synthesis text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Confidence::High => write!(f, "High"),
            Confidence::Medium => write!(f, "Medium"),
            Confidence::Low => write!(f, "Low"),
        }
    }
}

/// Outcome of verifying one assumption.
///
/// # Invariant
/// A failed result carries only `verdict = Error` and `error`; a checked
/// result carries evidence, credibility and analysis and never an error.
/// The two constructors are the only way to build one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    verdict: AssumptionVerdict,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    evidence: Option<Vec<EvidenceRecord>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    credibility: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    analysis: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl VerificationResult {
    /// A completed verification.
    pub fn checked(
        verdict: Verdict,
        evidence: Vec<EvidenceRecord>,
        credibility: f64,
        analysis: impl Into<String>,
    ) -> Self {
        Self {
            verdict: verdict.into(),
            evidence: Some(evidence),
            credibility: Some(credibility),
            analysis: Some(analysis.into()),
            error: None,
        }
    }

    /// A verification that failed for this assumption only.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            verdict: AssumptionVerdict::Error,
            evidence: None,
            credibility: None,
            analysis: None,
            error: Some(message.into()),
        }
    }

    pub fn verdict(&self) -> AssumptionVerdict {
        self.verdict
    }

    pub fn evidence(&self) -> Option<&[EvidenceRecord]> {
        self.evidence.as_deref()
    }

    pub fn credibility(&self) -> Option<f64> {
        self.credibility
    }

    pub fn analysis(&self) -> Option<&str> {
        self.analysis.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Per-assumption results keyed by assumption text, in extraction order.
///
/// Inserting a key that is already present replaces its value and keeps the
/// original position.
pub type VerificationResults = IndexMap<String, VerificationResult>;

/// Final verdict derived from the synthesis completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalAnswer {
    pub verdict: Verdict,
    pub summary: String,
    pub confidence: Confidence,
}

/// Everything a successful run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedCheck {
    pub claim: String,
    pub claim_type: String,
    pub initial_response: String,
    pub assumptions: Vec<Assumption>,
    pub verification_results: VerificationResults,
    pub final_answer: FinalAnswer,
}

impl CompletedCheck {
    /// Number of assumptions whose verification failed.
    pub fn failed_assumptions(&self) -> usize {
        self.verification_results
            .values()
            .filter(|r| r.is_error())
            .count()
    }
}

/// The single externally visible artifact of a run.
///
/// Serialized with a `status` tag: `"success"` carries the full check,
/// `"error"` carries only a message. There is no partial success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum FactCheckReport {
    Success(CompletedCheck),
    Error { error: String },
}

impl FactCheckReport {
    pub fn error(message: impl Into<String>) -> Self {
        FactCheckReport::Error {
            error: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FactCheckReport::Success(_))
    }

    pub fn status(&self) -> ReportStatus {
        match self {
            FactCheckReport::Success(_) => ReportStatus::Success,
            FactCheckReport::Error { .. } => ReportStatus::Error,
        }
    }

    pub fn completed(&self) -> Option<&CompletedCheck> {
        match self {
            FactCheckReport::Success(check) => Some(check),
            FactCheckReport::Error { .. } => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            FactCheckReport::Success(_) => None,
            FactCheckReport::Error { error } => Some(error),
        }
    }
}

/// Run status as reported in the `status` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Success,
    Error,
}
