//! Circuit breaker thresholds

use crate::properties::ResolvedCommandProperties;
use std::time::Duration;

/// Maximum number of trial executions admitted while half-open
const HALF_OPEN_MAX_CALLS: usize = 1;

/// Configuration for circuit breaker behavior
///
/// Built from resolved properties on every execution, so dynamic changes
/// apply to the next call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircuitBreakerConfig {
    /// Whether the breaker tracks health at all
    pub enabled: bool,
    /// Minimum executions in the window before the circuit can trip
    pub request_volume_threshold: usize,
    /// Failure percentage at or above which the circuit trips
    pub error_threshold_percentage: u32,
    /// Time the circuit stays open before admitting a trial
    pub sleep_window: Duration,
    /// Length of the window health is counted over
    pub rolling_window: Duration,
    /// Maximum trial executions while half-open
    pub half_open_max_calls: usize,
    /// Reject everything regardless of health
    pub force_open: bool,
    /// Admit everything regardless of health
    pub force_closed: bool,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self::from(&ResolvedCommandProperties::defaults())
    }
}

impl From<&ResolvedCommandProperties> for CircuitBreakerConfig {
    fn from(properties: &ResolvedCommandProperties) -> Self {
        Self {
            enabled: properties.circuit_breaker_enabled,
            request_volume_threshold: properties.request_volume_threshold as usize,
            error_threshold_percentage: properties.error_threshold_percentage,
            sleep_window: properties.sleep_window,
            rolling_window: properties.rolling_window,
            half_open_max_calls: HALF_OPEN_MAX_CALLS,
            force_open: properties.force_open,
            force_closed: properties.force_closed,
        }
    }
}
