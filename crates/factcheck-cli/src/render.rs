//! Human-readable rendering of a report.

use std::fmt;

use factcheck_core::{FactCheckReport, VerificationResult};

const RULE_WIDTH: usize = 50;

/// Sources listed per assumption.
const SOURCES_SHOWN: usize = 2;

/// Render a report for the terminal.
pub fn render_text(report: &FactCheckReport) -> String {
    TextReport(report).to_string()
}

/// Terminal layout of a report.
pub struct TextReport<'a>(pub &'a FactCheckReport);

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let check = match self.0 {
            FactCheckReport::Success(check) => check,
            FactCheckReport::Error { error } => return writeln!(f, "Error: {error}"),
        };

        writeln!(f, "{}", "=".repeat(RULE_WIDTH))?;
        writeln!(f, "CLAIM: {}", check.claim)?;
        writeln!(f, "TYPE: {}", check.claim_type)?;

        let answer = &check.final_answer;
        writeln!(f, "\nVERDICT: {}", answer.verdict)?;
        writeln!(f, "CONFIDENCE: {}", answer.confidence)?;
        writeln!(f, "\nSUMMARY:\n{}", answer.summary.trim())?;

        writeln!(f, "\nASSUMPTIONS VERIFIED:")?;
        if check.verification_results.is_empty() {
            writeln!(f, "\n(none extracted)")?;
        }
        for (assumption, result) in &check.verification_results {
            writeln!(f, "\n• {assumption}")?;
            write_result(f, result)?;
        }
        Ok(())
    }
}

fn write_result(f: &mut fmt::Formatter<'_>, result: &VerificationResult) -> fmt::Result {
    writeln!(f, "  Verdict: {}", result.verdict())?;

    if let Some(error) = result.error() {
        return writeln!(f, "  Error: {error}");
    }

    if let Some(credibility) = result.credibility() {
        writeln!(f, "  Credibility: {credibility:.2}")?;
    }

    let sources = result.evidence().unwrap_or_default();
    if sources.is_empty() {
        return writeln!(f, "  Sources: none found");
    }

    writeln!(f, "  Sources:")?;
    for (i, source) in sources.iter().take(SOURCES_SHOWN).enumerate() {
        writeln!(
            f,
            "    {}. {}",
            i + 1,
            source.title.as_deref().unwrap_or("Untitled")
        )?;
        if let Some(url) = &source.url {
            writeln!(f, "       {url}")?;
        }
    }
    Ok(())
}
