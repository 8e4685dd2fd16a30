//! Per-command execution properties

use super::resolve;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use strix_core::constants::*;
use strix_core::{CommandKey, Result, Validate};

const DEFAULT_TIMEOUT_MS: u64 = 1000;
const DEFAULT_SEMAPHORE_MAX_CONCURRENT_REQUESTS: u32 = 10;
const DEFAULT_REQUEST_VOLUME_THRESHOLD: u32 = 20;
const DEFAULT_ERROR_THRESHOLD_PERCENTAGE: u32 = 50;
const DEFAULT_SLEEP_WINDOW_MS: u64 = 5000;
const DEFAULT_ROLLING_WINDOW_MS: u64 = 10_000;

/// How a command is isolated from its caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IsolationStrategy {
    /// Run on the blocking pool behind a per-pool bulkhead
    Thread,
    /// Run on the calling task behind a per-command semaphore
    Semaphore,
}

/// Overrides for a command's properties
///
/// Unset fields fall back to dynamic defaults and then built-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CommandProperties {
    pub execution_isolation_strategy: Option<IsolationStrategy>,
    pub execution_timeout_in_milliseconds: Option<u64>,
    pub execution_timeout_enabled: Option<bool>,
    pub execution_isolation_semaphore_max_concurrent_requests: Option<u32>,
    pub fallback_enabled: Option<bool>,
    pub circuit_breaker_enabled: Option<bool>,
    pub circuit_breaker_request_volume_threshold: Option<u32>,
    pub circuit_breaker_error_threshold_percentage: Option<u32>,
    pub circuit_breaker_sleep_window_in_milliseconds: Option<u64>,
    pub circuit_breaker_force_open: Option<bool>,
    pub circuit_breaker_force_closed: Option<bool>,
    pub metrics_rolling_statistical_window_in_milliseconds: Option<u64>,
}

impl CommandProperties {
    pub fn with_execution_isolation_strategy(mut self, strategy: IsolationStrategy) -> Self {
        self.execution_isolation_strategy = Some(strategy);
        self
    }

    pub fn with_execution_timeout_in_milliseconds(mut self, millis: u64) -> Self {
        self.execution_timeout_in_milliseconds = Some(millis);
        self
    }

    pub fn with_execution_timeout_enabled(mut self, enabled: bool) -> Self {
        self.execution_timeout_enabled = Some(enabled);
        self
    }

    pub fn with_execution_isolation_semaphore_max_concurrent_requests(mut self, max: u32) -> Self {
        self.execution_isolation_semaphore_max_concurrent_requests = Some(max);
        self
    }

    pub fn with_fallback_enabled(mut self, enabled: bool) -> Self {
        self.fallback_enabled = Some(enabled);
        self
    }

    pub fn with_circuit_breaker_enabled(mut self, enabled: bool) -> Self {
        self.circuit_breaker_enabled = Some(enabled);
        self
    }

    pub fn with_circuit_breaker_request_volume_threshold(mut self, threshold: u32) -> Self {
        self.circuit_breaker_request_volume_threshold = Some(threshold);
        self
    }

    pub fn with_circuit_breaker_error_threshold_percentage(mut self, percentage: u32) -> Self {
        self.circuit_breaker_error_threshold_percentage = Some(percentage);
        self
    }

    pub fn with_circuit_breaker_sleep_window_in_milliseconds(mut self, millis: u64) -> Self {
        self.circuit_breaker_sleep_window_in_milliseconds = Some(millis);
        self
    }

    pub fn with_circuit_breaker_force_open(mut self, force: bool) -> Self {
        self.circuit_breaker_force_open = Some(force);
        self
    }

    pub fn with_circuit_breaker_force_closed(mut self, force: bool) -> Self {
        self.circuit_breaker_force_closed = Some(force);
        self
    }

    pub fn with_metrics_rolling_statistical_window_in_milliseconds(mut self, millis: u64) -> Self {
        self.metrics_rolling_statistical_window_in_milliseconds = Some(millis);
        self
    }

    /// Whether no override is set
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Reject overrides no command could run with
    pub fn validate(&self) -> Result<()> {
        if let Some(millis) = self.execution_timeout_in_milliseconds {
            Validate::in_range(millis, 1, u64::MAX, "executionTimeoutInMilliseconds")?;
        }
        if let Some(max) = self.execution_isolation_semaphore_max_concurrent_requests {
            Validate::in_range(max, 1, u32::MAX, "executionIsolationSemaphoreMaxConcurrentRequests")?;
        }
        if let Some(percentage) = self.circuit_breaker_error_threshold_percentage {
            Validate::in_range(percentage, 0, 100, "circuitBreakerErrorThresholdPercentage")?;
        }
        if let Some(millis) = self.metrics_rolling_statistical_window_in_milliseconds {
            Validate::in_range(millis, 1, u64::MAX, "metricsRollingStatisticalWindowInMilliseconds")?;
        }
        Ok(())
    }

    /// Resolve every property for `key` against dynamic and built-in defaults
    pub fn resolve(&self, key: &CommandKey) -> ResolvedCommandProperties {
        let key = key.as_str();
        let get = |name, configured, default| resolve(command_property, key, name, configured, default);
        let millis = |name, configured, default| {
            Duration::from_millis(resolve(command_property, key, name, configured, default))
        };

        ResolvedCommandProperties {
            isolation_strategy: resolve(
                command_property,
                key,
                EXECUTION_ISOLATION_STRATEGY,
                self.execution_isolation_strategy,
                IsolationStrategy::Thread,
            ),
            execution_timeout: millis(
                EXECUTION_TIMEOUT_IN_MILLISECONDS,
                self.execution_timeout_in_milliseconds,
                DEFAULT_TIMEOUT_MS,
            ),
            execution_timeout_enabled: get(EXECUTION_TIMEOUT_ENABLED, self.execution_timeout_enabled, true),
            semaphore_max_concurrent_requests: resolve(
                command_property,
                key,
                EXECUTION_SEMAPHORE_MAX_CONCURRENT_REQUESTS,
                self.execution_isolation_semaphore_max_concurrent_requests,
                DEFAULT_SEMAPHORE_MAX_CONCURRENT_REQUESTS,
            ),
            fallback_enabled: get(FALLBACK_ENABLED, self.fallback_enabled, true),
            circuit_breaker_enabled: get(CIRCUIT_BREAKER_ENABLED, self.circuit_breaker_enabled, true),
            request_volume_threshold: resolve(
                command_property,
                key,
                CIRCUIT_BREAKER_REQUEST_VOLUME_THRESHOLD,
                self.circuit_breaker_request_volume_threshold,
                DEFAULT_REQUEST_VOLUME_THRESHOLD,
            ),
            error_threshold_percentage: resolve(
                command_property,
                key,
                CIRCUIT_BREAKER_ERROR_THRESHOLD_PERCENTAGE,
                self.circuit_breaker_error_threshold_percentage,
                DEFAULT_ERROR_THRESHOLD_PERCENTAGE,
            ),
            sleep_window: millis(
                CIRCUIT_BREAKER_SLEEP_WINDOW_IN_MILLISECONDS,
                self.circuit_breaker_sleep_window_in_milliseconds,
                DEFAULT_SLEEP_WINDOW_MS,
            ),
            force_open: get(CIRCUIT_BREAKER_FORCE_OPEN, self.circuit_breaker_force_open, false),
            force_closed: get(CIRCUIT_BREAKER_FORCE_CLOSED, self.circuit_breaker_force_closed, false),
            rolling_window: millis(
                METRICS_ROLLING_STATS_IN_MILLISECONDS,
                self.metrics_rolling_statistical_window_in_milliseconds,
                DEFAULT_ROLLING_WINDOW_MS,
            ),
        }
    }
}

/// Effective properties of one command execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCommandProperties {
    pub isolation_strategy: IsolationStrategy,
    pub execution_timeout: Duration,
    pub execution_timeout_enabled: bool,
    pub semaphore_max_concurrent_requests: u32,
    pub fallback_enabled: bool,
    pub circuit_breaker_enabled: bool,
    pub request_volume_threshold: u32,
    pub error_threshold_percentage: u32,
    pub sleep_window: Duration,
    pub force_open: bool,
    pub force_closed: bool,
    pub rolling_window: Duration,
}

impl ResolvedCommandProperties {
    /// Built-in defaults with nothing overridden
    pub fn defaults() -> Self {
        Self {
            isolation_strategy: IsolationStrategy::Thread,
            execution_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            execution_timeout_enabled: true,
            semaphore_max_concurrent_requests: DEFAULT_SEMAPHORE_MAX_CONCURRENT_REQUESTS,
            fallback_enabled: true,
            circuit_breaker_enabled: true,
            request_volume_threshold: DEFAULT_REQUEST_VOLUME_THRESHOLD,
            error_threshold_percentage: DEFAULT_ERROR_THRESHOLD_PERCENTAGE,
            sleep_window: Duration::from_millis(DEFAULT_SLEEP_WINDOW_MS),
            force_open: false,
            force_closed: false,
            rolling_window: Duration::from_millis(DEFAULT_ROLLING_WINDOW_MS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::dynamic;
    use serial_test::serial;

    fn key() -> CommandKey {
        CommandKey::from("Properties-Test")
    }

    #[test]
    #[serial]
    fn test_unset_properties_resolve_to_defaults() {
        dynamic::clear();
        let resolved = CommandProperties::default().resolve(&key());
        assert_eq!(resolved, ResolvedCommandProperties::defaults());
    }

    #[test]
    #[serial]
    fn test_resolution_order() {
        dynamic::clear();
        let overrides = CommandProperties::default().with_execution_timeout_in_milliseconds(250);

        dynamic::set_property(command_property("default", EXECUTION_TIMEOUT_IN_MILLISECONDS), 400);
        dynamic::set_property(command_property("default", FALLBACK_ENABLED), false);
        let resolved = overrides.resolve(&key());
        assert_eq!(resolved.execution_timeout, Duration::from_millis(250));
        assert!(!resolved.fallback_enabled);

        dynamic::set_property(command_property("Properties-Test", EXECUTION_TIMEOUT_IN_MILLISECONDS), 75);
        let resolved = overrides.resolve(&key());
        assert_eq!(resolved.execution_timeout, Duration::from_millis(75));
        dynamic::clear();
    }

    #[test]
    #[serial]
    fn test_isolation_strategy_from_dynamic_value() {
        dynamic::clear();
        dynamic::set_property(
            command_property("Properties-Test", EXECUTION_ISOLATION_STRATEGY),
            "SEMAPHORE",
        );
        let resolved = CommandProperties::default().resolve(&key());
        assert_eq!(resolved.isolation_strategy, IsolationStrategy::Semaphore);
        dynamic::clear();
    }

    #[test]
    fn test_deserialize_camel_case() {
        let properties: CommandProperties = serde_json::from_str(
            r#"{"executionIsolationStrategy": "SEMAPHORE", "circuitBreakerForceOpen": true}"#,
        )
        .unwrap();

        assert_eq!(
            properties,
            CommandProperties::default()
                .with_execution_isolation_strategy(IsolationStrategy::Semaphore)
                .with_circuit_breaker_force_open(true)
        );
        assert!(!properties.is_empty());
        assert!(CommandProperties::default().is_empty());
    }

    #[test]
    fn test_validate_rejects_out_of_range_values() {
        let err = CommandProperties::default()
            .with_circuit_breaker_error_threshold_percentage(150)
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("circuitBreakerErrorThresholdPercentage"));

        assert!(CommandProperties::default()
            .with_execution_isolation_semaphore_max_concurrent_requests(0)
            .validate()
            .is_err());
        assert!(CommandProperties::default()
            .with_execution_timeout_in_milliseconds(10)
            .validate()
            .is_ok());
    }
}
