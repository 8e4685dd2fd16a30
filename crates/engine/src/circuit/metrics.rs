//! Health counters for one circuit

use super::types::{CircuitBreakerStats, CircuitState};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};

/// Executions and failures counted over the current rolling window
///
/// `generation` advances on every state change; outcomes reported against an
/// older generation are dropped.
#[derive(Debug)]
pub struct MetricsState {
    pub state: RwLock<CircuitState>,
    pub request_count: AtomicUsize,
    pub error_count: AtomicUsize,
    pub half_open_calls: AtomicUsize,
    pub generation: AtomicU64,
    pub last_failure_time: Mutex<Option<Instant>>,
    pub last_state_change: Mutex<Instant>,
    window_start: Mutex<Instant>,
}

impl MetricsState {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            state: RwLock::new(CircuitState::Closed),
            request_count: AtomicUsize::new(0),
            error_count: AtomicUsize::new(0),
            half_open_calls: AtomicUsize::new(0),
            generation: AtomicU64::new(0),
            last_failure_time: Mutex::new(None),
            last_state_change: Mutex::new(now),
            window_start: Mutex::new(now),
        }
    }

    /// Zero every counter and open a fresh window
    pub async fn reset_counters(&self) {
        self.clear_window();
        self.half_open_calls.store(0, Ordering::SeqCst);
        *self.window_start.lock().await = Instant::now();
    }

    /// Open a fresh window once the current one is older than `window`
    pub async fn roll_window(&self, window: Duration) {
        let mut start = self.window_start.lock().await;
        if start.elapsed() >= window {
            self.clear_window();
            *start = Instant::now();
        }
    }

    fn clear_window(&self) {
        self.request_count.store(0, Ordering::SeqCst);
        self.error_count.store(0, Ordering::SeqCst);
    }

    /// Failed share of this window's executions, rounded down
    pub fn error_percentage(&self) -> u32 {
        match self.request_count.load(Ordering::SeqCst) {
            0 => 0,
            requests => (self.error_count.load(Ordering::SeqCst) * 100 / requests) as u32,
        }
    }

    pub async fn stats(&self) -> CircuitBreakerStats {
        CircuitBreakerStats {
            state: *self.state.read().await,
            request_count: self.request_count.load(Ordering::SeqCst),
            error_count: self.error_count.load(Ordering::SeqCst),
            error_percentage: self.error_percentage(),
            half_open_calls: self.half_open_calls.load(Ordering::SeqCst),
            last_failure_time: *self.last_failure_time.lock().await,
            last_state_change: *self.last_state_change.lock().await,
        }
    }

    pub fn increment_generation(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}

impl Default for MetricsState {
    fn default() -> Self {
        Self::new()
    }
}
