//! Core types for circuit breaker functionality

use std::time::Instant;

/// Circuit breaker states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Requests pass through and health is counted
    Closed,
    /// Requests are short-circuited
    Open,
    /// A single trial request is allowed to test recovery
    HalfOpen,
}

/// Statistics about circuit breaker state
#[derive(Debug, Clone)]
pub struct CircuitBreakerStats {
    pub state: CircuitState,
    pub request_count: usize,
    pub error_count: usize,
    pub error_percentage: u32,
    pub half_open_calls: usize,
    pub last_failure_time: Option<Instant>,
    pub last_state_change: Instant,
}

/// Admission token handed out by [`CircuitBreaker::allow_request`]
///
/// The outcome of an admitted execution is reported back with the token, and
/// is ignored if the circuit changed state in between.
///
/// [`CircuitBreaker::allow_request`]: super::CircuitBreaker::allow_request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attempt {
    pub(crate) generation: Option<u64>,
}

impl Attempt {
    pub(crate) fn tracked(generation: u64) -> Self {
        Self {
            generation: Some(generation),
        }
    }

    pub(crate) fn untracked() -> Self {
        Self { generation: None }
    }

    /// Whether the outcome of this attempt counts towards circuit health
    pub fn is_tracked(&self) -> bool {
        self.generation.is_some()
    }
}
