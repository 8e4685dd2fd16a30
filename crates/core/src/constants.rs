/// Constants used throughout the strix codebase
// Property key prefixes
pub const PROPERTY_PREFIX: &str = "strix";
pub const COMMAND_SCOPE: &str = "command";
pub const THREAD_POOL_SCOPE: &str = "threadpool";
pub const DEFAULT_SCOPE_KEY: &str = "default";

// Command property names
pub const EXECUTION_ISOLATION_STRATEGY: &str = "execution.isolation.strategy";
pub const EXECUTION_TIMEOUT_IN_MILLISECONDS: &str =
    "execution.isolation.thread.timeoutInMilliseconds";
pub const EXECUTION_TIMEOUT_ENABLED: &str = "execution.timeout.enabled";
pub const EXECUTION_SEMAPHORE_MAX_CONCURRENT_REQUESTS: &str =
    "execution.isolation.semaphore.maxConcurrentRequests";
pub const FALLBACK_ENABLED: &str = "fallback.enabled";
pub const CIRCUIT_BREAKER_ENABLED: &str = "circuitBreaker.enabled";
pub const CIRCUIT_BREAKER_REQUEST_VOLUME_THRESHOLD: &str = "circuitBreaker.requestVolumeThreshold";
pub const CIRCUIT_BREAKER_ERROR_THRESHOLD_PERCENTAGE: &str =
    "circuitBreaker.errorThresholdPercentage";
pub const CIRCUIT_BREAKER_SLEEP_WINDOW_IN_MILLISECONDS: &str =
    "circuitBreaker.sleepWindowInMilliseconds";
pub const CIRCUIT_BREAKER_FORCE_OPEN: &str = "circuitBreaker.forceOpen";
pub const CIRCUIT_BREAKER_FORCE_CLOSED: &str = "circuitBreaker.forceClosed";
pub const METRICS_ROLLING_STATS_IN_MILLISECONDS: &str = "metrics.rollingStats.timeInMilliseconds";

// Thread-pool property names
pub const CORE_SIZE: &str = "coreSize";
pub const MAX_QUEUE_SIZE: &str = "maxQueueSize";
pub const QUEUE_SIZE_REJECTION_THRESHOLD: &str = "queueSizeRejectionThreshold";

// Log filter environment variable
pub const STRIX_LOG_VAR: &str = "STRIX_LOG";

/// Full dynamic property name for a command-scoped property
pub fn command_property(command_key: &str, name: &str) -> String {
    format!("{PROPERTY_PREFIX}.{COMMAND_SCOPE}.{command_key}.{name}")
}

/// Full dynamic property name for a thread-pool-scoped property
pub fn thread_pool_property(pool_key: &str, name: &str) -> String {
    format!("{PROPERTY_PREFIX}.{THREAD_POOL_SCOPE}.{pool_key}.{name}")
}
