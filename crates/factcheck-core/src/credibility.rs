//! Credibility scoring from domain suffixes.
//!
//! The table below is static configuration. A record's score is looked up by
//! `"." + <last dot-separated token of its domain>`; anything unlisted scores
//! as `other`.

use std::collections::BTreeMap;

use lazy_static::lazy_static;

use crate::evidence::EvidenceRecord;

/// Score for domains whose suffix is not in the table.
pub const OTHER_SCORE: f64 = 0.5;

lazy_static! {
    /// Trust score per top-level-domain suffix.
    static ref DOMAIN_SCORES: BTreeMap<&'static str, f64> = BTreeMap::from([
        (".gov", 0.9),
        (".edu", 0.85),
        (".org", 0.8),
        (".com", 0.7),
        (".net", 0.6),
    ]);
}

/// Maps evidence to a trust score in `[0, 1]`.
///
/// Pure and deterministic. Per-record scores are summed in ascending order,
/// so the result does not depend on record order.
#[derive(Debug, Clone, Copy, Default)]
pub struct CredibilityScorer;

impl CredibilityScorer {
    pub fn new() -> Self {
        Self
    }

    /// Mean per-record score rounded to two decimals. Empty evidence scores 0.0.
    ///
    /// Rounding is applied to the binary mean, so `(0.85 + 0.7) / 2` lands
    /// just below 0.775 and gives 0.77.
    pub fn score(&self, evidence: &[EvidenceRecord]) -> f64 {
        if evidence.is_empty() {
            return 0.0;
        }

        let mut scores: Vec<f64> = evidence
            .iter()
            .map(|e| self.score_domain(&e.domain))
            .collect();
        scores.sort_by(f64::total_cmp);
        let mean = scores.iter().sum::<f64>() / scores.len() as f64;
        round_hundredths(mean)
    }

    /// Score a single domain by its last dot-separated token.
    pub fn score_domain(&self, domain: &str) -> f64 {
        let tld = domain.rsplit('.').next().unwrap_or_default().to_lowercase();
        DOMAIN_SCORES
            .get(format!(".{}", tld).as_str())
            .copied()
            .unwrap_or(OTHER_SCORE)
    }

    /// The suffix table as `(suffix, score)` pairs, `other` excluded.
    pub fn table(&self) -> Vec<(&'static str, f64)> {
        DOMAIN_SCORES
            .iter()
            .map(|(suffix, score)| (*suffix, *score))
            .collect()
    }
}

// Decimal formatting rounds the exact binary value, ties to even.
fn round_hundredths(value: f64) -> f64 {
    format!("{:.2}", value).parse().unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evidence::EvidenceBuilder;
    use proptest::prelude::*;

    fn record(domain: &str) -> EvidenceRecord {
        EvidenceBuilder::new(format!("https://{}/page", domain)).build()
    }

    #[test]
    fn test_empty_evidence_scores_zero() {
        assert_eq!(CredibilityScorer::new().score(&[]), 0.0);
    }

    #[test]
    fn test_single_gov_source() {
        assert_eq!(CredibilityScorer::new().score(&[record("x.gov")]), 0.9);
    }

    #[test]
    fn test_mean_is_rounded() {
        let scorer = CredibilityScorer::new();
        assert_eq!(scorer.score(&[record("a.gov"), record("b.com")]), 0.8);
        // (0.85 + 0.6 + 0.5) / 3 = 0.65
        assert_eq!(
            scorer.score(&[record("mit.edu"), record("b.net"), record("c.io")]),
            0.65
        );
    }

    #[test]
    fn test_half_hundredth_means_round_on_binary_value() {
        let scorer = CredibilityScorer::new();
        assert_eq!(scorer.score(&[record("mit.edu"), record("b.com")]), 0.77);
        assert_eq!(scorer.score(&[record("mit.edu"), record("b.net")]), 0.72);
        assert_eq!(scorer.score(&[record("w3.org"), record("mit.edu")]), 0.82);
    }

    #[test]
    fn test_unknown_tld_scores_other() {
        let scorer = CredibilityScorer::new();
        assert_eq!(scorer.score(&[record("x.io")]), 0.5);
        assert_eq!(scorer.score_domain(""), OTHER_SCORE);
        assert_eq!(scorer.score_domain("localhost:8080"), OTHER_SCORE);
    }

    #[test]
    fn test_suffix_match_ignores_case() {
        assert_eq!(CredibilityScorer::new().score_domain("WWW.NIH.GOV"), 0.9);
    }

    fn domain_strategy() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("a.gov".to_string()),
            Just("b.edu".to_string()),
            Just("c.org".to_string()),
            Just("d.com".to_string()),
            Just("e.net".to_string()),
            "[a-z]{1,8}(\\.[a-z]{1,4})?",
        ]
    }

    proptest! {
        #[test]
        fn prop_score_in_unit_interval(domains in prop::collection::vec(domain_strategy(), 0..12)) {
            let evidence: Vec<_> = domains.iter().map(|d| record(d)).collect();
            let score = CredibilityScorer::new().score(&evidence);
            prop_assert!((0.0..=1.0).contains(&score));
        }

        #[test]
        fn prop_score_is_order_independent(domains in prop::collection::vec(domain_strategy(), 1..12)) {
            let evidence: Vec<_> = domains.iter().map(|d| record(d)).collect();
            let mut reversed = evidence.clone();
            reversed.reverse();
            let scorer = CredibilityScorer::new();
            prop_assert_eq!(scorer.score(&evidence), scorer.score(&reversed));
        }
    }
}
