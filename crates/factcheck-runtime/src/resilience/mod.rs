//! Resilience patterns for factcheck-runtime.
//!
//! This module provides:
//! - Circuit breaker per search backend
//! - Model usage ledger, broken down by pipeline stage

mod circuit_breaker;
mod usage;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use usage::{LlmUsage, UsageReport, UsageTracker};
