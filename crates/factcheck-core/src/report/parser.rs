//! Loading saved reports.

use std::fs;
use std::path::Path;
use thiserror::Error;

use super::schema::validate_report;
use crate::types::FactCheckReport;

/// Errors that can occur when loading a report.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to read report file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Report validation failed: {}", .0.join("; "))]
    ValidationError(Vec<String>),
}

impl FactCheckReport {
    /// Parse a report from JSON, validating it against the schema first.
    pub fn from_json_str(json: &str) -> Result<Self, ReportError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        validate_report(&value).map_err(ReportError::ValidationError)?;
        Ok(serde_json::from_value(value)?)
    }

    /// Load and validate a report from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ReportError> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Pretty JSON rendering.
    pub fn to_json_pretty(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
