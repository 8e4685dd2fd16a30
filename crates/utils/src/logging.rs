//! Logging setup built on `tracing-subscriber`

use strix_core::constants::STRIX_LOG_VAR;
use tracing::{span, Level, Span};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the tracing system
///
/// The filter comes from `STRIX_LOG`, then `RUST_LOG`, then defaults to
/// `info`. Output is a compact, non-ANSI formatter on stderr.
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .compact()
        .with_target(false)
        .with_thread_ids(false)
        .with_level(true);

    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

/// Initialize tracing for tests, routing output through the test harness
///
/// Safe to call from every test; only the first call installs a subscriber.
pub fn init_for_tests() {
    let _ = tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().with_test_writer().with_target(true))
        .try_init();
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(STRIX_LOG_VAR)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Create a span for a single command execution
pub fn command_span(group: &str, command: &str) -> Span {
    span!(Level::INFO, "command", group = %group, command = %command)
}
