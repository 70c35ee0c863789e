//! Report validation and loading.
//!
//! A [`FactCheckReport`](crate::types::FactCheckReport) is the only artifact
//! a run produces. Saved reports are checked against a JSON Schema before
//! they are deserialized.

mod parser;
mod schema;

pub use parser::ReportError;
pub use schema::{is_valid_report, validate_report, SchemaError};
