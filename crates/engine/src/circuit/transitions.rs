//! State transition logic for circuit breaker

use super::config::CircuitBreakerConfig;
use super::metrics::MetricsState;
use super::types::CircuitState;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;
use strix_core::CommandKey;
use tracing::{info, warn};

/// Handles state transitions for one command's circuit
pub struct StateTransitions {
    key: CommandKey,
    metrics: Arc<MetricsState>,
}

impl StateTransitions {
    pub fn new(key: CommandKey, metrics: Arc<MetricsState>) -> Self {
        Self { key, metrics }
    }

    pub async fn transition_to_open(&self) {
        self.transition(CircuitState::Open).await;
    }

    pub async fn transition_to_half_open(&self) {
        self.transition(CircuitState::HalfOpen).await;
    }

    pub async fn transition_to_closed(&self) {
        self.transition(CircuitState::Closed).await;
    }

    async fn transition(&self, next: CircuitState) {
        let mut state = self.metrics.state.write().await;
        if *state == next {
            return;
        }

        match next {
            CircuitState::Open => warn!(
                command = %self.key,
                error_percentage = self.metrics.error_percentage(),
                "circuit opening"
            ),
            CircuitState::HalfOpen => info!(command = %self.key, "circuit half-open, admitting a trial request"),
            CircuitState::Closed => info!(command = %self.key, "circuit closing"),
        }

        *state = next;
        *self.metrics.last_state_change.lock().await = Instant::now();
        self.metrics.increment_generation();
        self.metrics.reset_counters().await;
    }

    /// Record a successful execution admitted in `generation`
    pub async fn record_success(&self, generation: u64, config: &CircuitBreakerConfig) {
        if generation != self.metrics.current_generation() {
            return;
        }

        let state = *self.metrics.state.read().await;
        match state {
            CircuitState::HalfOpen => self.transition_to_closed().await,
            CircuitState::Closed => {
                self.metrics.roll_window(config.rolling_window).await;
                self.metrics.request_count.fetch_add(1, Ordering::SeqCst);
            }
            CircuitState::Open => {}
        }
    }

    /// Record a failed execution admitted in `generation`
    pub async fn record_failure(&self, generation: u64, config: &CircuitBreakerConfig) {
        if generation != self.metrics.current_generation() {
            return;
        }

        *self.metrics.last_failure_time.lock().await = Some(Instant::now());

        let state = *self.metrics.state.read().await;
        match state {
            CircuitState::Closed => {
                self.metrics.roll_window(config.rolling_window).await;
                let requests = self.metrics.request_count.fetch_add(1, Ordering::SeqCst) + 1;
                self.metrics.error_count.fetch_add(1, Ordering::SeqCst);

                if requests >= config.request_volume_threshold
                    && self.metrics.error_percentage() >= config.error_threshold_percentage
                {
                    self.transition_to_open().await;
                }
            }
            // The trial request failed
            CircuitState::HalfOpen => self.transition_to_open().await,
            CircuitState::Open => {}
        }
    }

    /// Release the trial slot of an execution admitted in `generation` that never finished
    pub async fn record_abandoned(&self, generation: u64) {
        if generation != self.metrics.current_generation() {
            return;
        }

        let state = *self.metrics.state.read().await;
        if state == CircuitState::HalfOpen {
            self.transition_to_open().await;
        }
    }

    /// Move from Open to HalfOpen once the sleep window has elapsed
    pub async fn check_half_open_transition(&self, config: &CircuitBreakerConfig) -> bool {
        let state = *self.metrics.state.read().await;
        if state == CircuitState::Open {
            let last_change = *self.metrics.last_state_change.lock().await;
            if last_change.elapsed() >= config.sleep_window {
                self.transition_to_half_open().await;
                return true;
            }
        }
        false
    }
}
