//! Per-command circuit breakers
//!
//! A breaker trips when, within the rolling window, at least
//! `request_volume_threshold` executions were recorded and the share of
//! failures reached `error_threshold_percentage`. After the sleep window one
//! trial execution is let through: success closes the circuit, failure opens
//! it again.
//!
//! - [`types`] - circuit states, statistics and admission tokens
//! - [`config`] - thresholds derived from command properties
//! - [`metrics`] - counters for the current rolling window
//! - [`transitions`] - state transition logic
//! - [`state`] - the breaker itself
//! - [`admission`] - settles the outcome of every admitted execution
//! - [`registry`] - one breaker per command key

pub mod admission;
pub mod config;
pub mod metrics;
pub mod registry;
pub mod state;
pub mod transitions;
pub mod types;

pub use admission::Admission;
pub use config::CircuitBreakerConfig;
pub use registry::circuit_breaker;
pub use state::CircuitBreaker;
pub use types::{Attempt, CircuitBreakerStats, CircuitState};
