//! Outcome reporting for admitted executions

use super::config::CircuitBreakerConfig;
use super::state::CircuitBreaker;
use super::types::Attempt;
use std::sync::Arc;
use tracing::debug;

/// An execution the circuit let through, reported back exactly once
///
/// Call [`succeeded`](Admission::succeeded) or [`failed`](Admission::failed)
/// when the execution ends. If the admission is dropped first, because the
/// caller stopped waiting or unsubscribed, the outcome is settled on drop:
/// an execution that already produced a value counts as a success, anything
/// else releases a half-open trial by re-opening the circuit.
pub struct Admission {
    breaker: Arc<CircuitBreaker>,
    config: CircuitBreakerConfig,
    attempt: Option<Attempt>,
    emitted: bool,
}

impl Admission {
    /// Ask `breaker` to admit an execution under `config`
    pub async fn begin(breaker: Arc<CircuitBreaker>, config: CircuitBreakerConfig) -> Option<Self> {
        let attempt = breaker.allow_request(&config).await?;
        Some(Self {
            breaker,
            config,
            attempt: Some(attempt),
            emitted: false,
        })
    }

    /// Note that the execution has handed a value to its caller
    pub fn record_emission(&mut self) {
        self.emitted = true;
    }

    pub async fn succeeded(mut self) {
        if let Some(attempt) = self.attempt.take() {
            self.breaker.mark_success(attempt, &self.config).await;
        }
    }

    pub async fn failed(mut self) {
        if let Some(attempt) = self.attempt.take() {
            self.breaker.mark_failure(attempt, &self.config).await;
        }
    }
}

impl Drop for Admission {
    fn drop(&mut self) {
        let Some(attempt) = self.attempt.take() else {
            return;
        };
        if !attempt.is_tracked() {
            return;
        }

        debug!(command = %self.breaker.key(), emitted = self.emitted, "execution abandoned");
        let breaker = Arc::clone(&self.breaker);
        let config = self.config.clone();
        let emitted = self.emitted;
        let settle = async move {
            if emitted {
                breaker.mark_success(attempt, &config).await;
            } else {
                breaker.mark_abandoned(attempt).await;
            }
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(settle);
            }
            Err(_) => futures::executor::block_on(settle),
        }
    }
}

impl std::fmt::Debug for Admission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Admission")
            .field("command", self.breaker.key())
            .field("attempt", &self.attempt)
            .field("emitted", &self.emitted)
            .finish()
    }
}
