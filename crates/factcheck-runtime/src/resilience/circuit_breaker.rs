//! Circuit breaker to stop hammering a failing search backend.
//!
//! When a backend fails repeatedly, its circuit opens and searches against
//! it short-circuit to an empty result until the recovery timeout passes.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Circuit breaker configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircuitBreakerConfig {
    /// Failures before opening circuit
    pub failure_threshold: u32,

    /// Time before attempting recovery, e.g. "30s"
    #[serde(with = "crate::config::duration_str")]
    pub recovery_timeout: Duration,

    /// Successes needed to close circuit
    pub success_threshold: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            recovery_timeout: Duration::from_secs(30),
            success_threshold: 2,
        }
    }
}

/// State of a circuit.
#[derive(Debug, Clone)]
pub enum CircuitState {
    /// Normal operation
    Closed { failures: u32 },

    /// Circuit is open, all calls bypass
    Open { opened_at: Instant },

    /// Testing if circuit can close
    HalfOpen { successes: u32 },
}

/// Circuit breaker keyed by backend name.
///
/// Each backend has its own circuit so one failing provider does not block
/// another.
pub struct CircuitBreaker {
    states: RwLock<HashMap<String, CircuitState>>,
    config: CircuitBreakerConfig,
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            states: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// Check if the circuit for `backend` is open.
    ///
    /// An open circuit whose recovery timeout has passed moves to half-open
    /// and lets the call through.
    pub fn is_open(&self, backend: &str) -> bool {
        let states = self.states.read();
        match states.get(backend) {
            Some(CircuitState::Open { opened_at }) => {
                if opened_at.elapsed() >= self.config.recovery_timeout {
                    drop(states);
                    self.transition_to_half_open(backend);
                    false
                } else {
                    true
                }
            }
            _ => false,
        }
    }

    /// Record a successful call.
    pub fn record_success(&self, backend: &str) {
        let mut states = self.states.write();
        match states.get(backend).cloned() {
            Some(CircuitState::HalfOpen { successes }) => {
                if successes + 1 >= self.config.success_threshold {
                    states.insert(backend.to_string(), CircuitState::Closed { failures: 0 });
                    tracing::info!(backend, "Circuit closed after successful recovery");
                } else {
                    states.insert(
                        backend.to_string(),
                        CircuitState::HalfOpen {
                            successes: successes + 1,
                        },
                    );
                }
            }
            Some(CircuitState::Closed { .. }) => {
                states.insert(backend.to_string(), CircuitState::Closed { failures: 0 });
            }
            _ => {}
        }
    }

    /// Record a failed call.
    pub fn record_failure(&self, backend: &str) {
        let mut states = self.states.write();
        let failures = match states.get(backend).cloned() {
            None => 0,
            Some(CircuitState::Closed { failures }) => failures,
            Some(CircuitState::HalfOpen { .. }) => {
                states.insert(
                    backend.to_string(),
                    CircuitState::Open {
                        opened_at: Instant::now(),
                    },
                );
                tracing::warn!(backend, "Circuit reopened after failed recovery attempt");
                return;
            }
            Some(CircuitState::Open { .. }) => return,
        };

        if failures + 1 >= self.config.failure_threshold {
            states.insert(
                backend.to_string(),
                CircuitState::Open {
                    opened_at: Instant::now(),
                },
            );
            tracing::warn!(
                backend,
                failures = failures + 1,
                "Circuit opened after repeated failures"
            );
        } else {
            states.insert(
                backend.to_string(),
                CircuitState::Closed {
                    failures: failures + 1,
                },
            );
        }
    }

    fn transition_to_half_open(&self, backend: &str) {
        let mut states = self.states.write();
        if matches!(states.get(backend), Some(CircuitState::Open { .. })) {
            states.insert(backend.to_string(), CircuitState::HalfOpen { successes: 0 });
            tracing::info!(backend, "Circuit transitioning to half-open for recovery test");
        }
    }

    /// Current state of a circuit.
    pub fn state(&self, backend: &str) -> CircuitState {
        self.states
            .read()
            .get(backend)
            .cloned()
            .unwrap_or(CircuitState::Closed { failures: 0 })
    }

    /// Reset all circuits to closed.
    pub fn reset(&self) {
        self.states.write().clear();
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(CircuitBreakerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circuit_starts_closed() {
        let cb = CircuitBreaker::default();
        assert!(!cb.is_open("serpapi"));
    }

    #[test]
    fn test_circuit_opens_after_failures() {
        let cb = CircuitBreaker::new(CircuitBreakerConfig {
            failure_threshold: 2,
            ..Default::default()
        });

        cb.record_failure("serpapi");
        assert!(!cb.is_open("serpapi"));

        cb.record_failure("serpapi");
        assert!(cb.is_open("serpapi"));
    }

    #[test]
    fn test_success_resets_failures() {
        let cb = CircuitBreaker::default();

        cb.record_failure("duckduckgo");
        cb.record_failure("duckduckgo");
        cb.record_success("duckduckgo");

        cb.record_failure("duckduckgo");
        cb.record_failure("duckduckgo");
        assert!(!cb.is_open("duckduckgo"));
    }

    #[test]
    fn test_backends_are_independent() {
        let cb = CircuitBreaker::new(CircuitBreakerConfig {
            failure_threshold: 1,
            ..Default::default()
        });

        cb.record_failure("serpapi");
        assert!(cb.is_open("serpapi"));
        assert!(!cb.is_open("duckduckgo"));
    }

    #[test]
    fn test_recovery_after_timeout() {
        let cb = CircuitBreaker::new(CircuitBreakerConfig {
            failure_threshold: 1,
            recovery_timeout: Duration::ZERO,
            success_threshold: 1,
        });

        cb.record_failure("serpapi");
        // Zero timeout: the next check moves straight to half-open.
        assert!(!cb.is_open("serpapi"));
        assert!(matches!(cb.state("serpapi"), CircuitState::HalfOpen { .. }));

        cb.record_success("serpapi");
        assert!(matches!(
            cb.state("serpapi"),
            CircuitState::Closed { failures: 0 }
        ));
    }

    #[test]
    fn test_failed_recovery_reopens() {
        let cb = CircuitBreaker::new(CircuitBreakerConfig {
            failure_threshold: 1,
            recovery_timeout: Duration::ZERO,
            success_threshold: 1,
        });

        cb.record_failure("serpapi");
        assert!(!cb.is_open("serpapi"));
        cb.record_failure("serpapi");
        assert!(matches!(cb.state("serpapi"), CircuitState::Open { .. }));
    }

    #[test]
    fn test_config_from_yaml() {
        let config: CircuitBreakerConfig =
            serde_yaml::from_str("failure_threshold: 5\nrecovery_timeout: 1m 30s\n").unwrap();
        assert_eq!(config.failure_threshold, 5);
        assert_eq!(config.recovery_timeout, Duration::from_secs(90));
        assert_eq!(config.success_threshold, 2);
    }
}
