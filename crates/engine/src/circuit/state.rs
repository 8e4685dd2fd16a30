//! Circuit breaker admission and outcome recording

use super::config::CircuitBreakerConfig;
use super::metrics::MetricsState;
use super::transitions::StateTransitions;
use super::types::{Attempt, CircuitBreakerStats, CircuitState};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use strix_core::CommandKey;
use tracing::debug;

/// Health tracker for one command
pub struct CircuitBreaker {
    key: CommandKey,
    metrics: Arc<MetricsState>,
    transitions: StateTransitions,
}

impl CircuitBreaker {
    pub fn new(key: CommandKey) -> Self {
        let metrics = Arc::new(MetricsState::new());
        let transitions = StateTransitions::new(key.clone(), Arc::clone(&metrics));

        Self {
            key,
            metrics,
            transitions,
        }
    }

    pub fn key(&self) -> &CommandKey {
        &self.key
    }

    /// Current state, moving an expired open circuit to half-open
    pub async fn state(&self, config: &CircuitBreakerConfig) -> CircuitState {
        let state = *self.metrics.state.read().await;

        if state == CircuitState::Open && self.transitions.check_half_open_transition(config).await {
            return CircuitState::HalfOpen;
        }

        state
    }

    /// Decide whether an execution may proceed
    ///
    /// Returns `None` when the execution must be short-circuited.
    pub async fn allow_request(&self, config: &CircuitBreakerConfig) -> Option<Attempt> {
        if config.force_open {
            debug!(command = %self.key, "circuit forced open");
            return None;
        }
        if !config.enabled {
            return Some(Attempt::untracked());
        }
        if config.force_closed {
            return Some(Attempt::tracked(self.metrics.current_generation()));
        }

        match self.state(config).await {
            CircuitState::Closed => Some(Attempt::tracked(self.metrics.current_generation())),
            CircuitState::HalfOpen => {
                let calls = self.metrics.half_open_calls.fetch_add(1, Ordering::SeqCst);
                if calls >= config.half_open_max_calls {
                    return None;
                }
                Some(Attempt::tracked(self.metrics.current_generation()))
            }
            CircuitState::Open => None,
        }
    }

    /// Report that an admitted execution succeeded
    pub async fn mark_success(&self, attempt: Attempt, config: &CircuitBreakerConfig) {
        if let Some(generation) = attempt.generation {
            self.transitions.record_success(generation, config).await;
        }
    }

    /// Report that an admitted execution failed, timed out or was rejected
    pub async fn mark_failure(&self, attempt: Attempt, config: &CircuitBreakerConfig) {
        if let Some(generation) = attempt.generation {
            self.transitions.record_failure(generation, config).await;
        }
    }

    /// Report that an admitted execution ended without an outcome
    ///
    /// Only matters for a half-open trial, whose slot would otherwise stay
    /// taken; the circuit opens again and a new trial follows after the
    /// sleep window.
    pub async fn mark_abandoned(&self, attempt: Attempt) {
        if let Some(generation) = attempt.generation {
            self.transitions.record_abandoned(generation).await;
        }
    }

    pub async fn stats(&self) -> CircuitBreakerStats {
        self.metrics.stats().await
    }
}

impl std::fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("key", &self.key)
            .field("generation", &self.metrics.current_generation())
            .finish_non_exhaustive()
    }
}
