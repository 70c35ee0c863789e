//! JSON Schema validation for fact-check reports.
//!
//! Reports are validated against `schema/fact_check_report.schema.json`,
//! which encodes the success-or-error shape and the per-assumption result
//! invariant.

use std::sync::OnceLock;
use thiserror::Error;

/// Embedded report schema (loaded at compile time).
const REPORT_SCHEMA_JSON: &str = include_str!("../../../../schema/fact_check_report.schema.json");

/// Compiled JSON Schema validator (initialized once, reused).
static COMPILED_SCHEMA: OnceLock<Result<jsonschema::Validator, String>> = OnceLock::new();

/// Errors from schema validation.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Failed to load schema: {0}")]
    LoadError(String),
}

fn get_validator() -> Result<&'static jsonschema::Validator, SchemaError> {
    let result = COMPILED_SCHEMA.get_or_init(|| {
        let schema_value: serde_json::Value = serde_json::from_str(REPORT_SCHEMA_JSON)
            .map_err(|e| format!("Invalid schema JSON: {}", e))?;

        jsonschema::options()
            .build(&schema_value)
            .map_err(|e| format!("Failed to compile schema: {}", e))
    });

    result
        .as_ref()
        .map_err(|e| SchemaError::LoadError(e.clone()))
}

/// Validate a report JSON value against the schema.
///
/// Returns `Ok(())` if valid, or every validation error with its location.
pub fn validate_report(report_json: &serde_json::Value) -> Result<(), Vec<String>> {
    let validator = get_validator().map_err(|e| vec![e.to_string()])?;

    let errors: Vec<String> = validator
        .iter_errors(report_json)
        .map(|e| format!("{} at {}", e, e.instance_path))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Check if a report JSON value is valid against the schema.
pub fn is_valid_report(report_json: &serde_json::Value) -> bool {
    get_validator()
        .map(|v| v.is_valid(report_json))
        .unwrap_or(false)
}
