//! Command execution engine
//!
//! Runs units of work behind per-command circuit breakers, semaphore or
//! thread-pool bulkheads and execution timeouts, and serves fallbacks when
//! the work cannot produce a value. Properties are resolved on every
//! execution, so changes made through [`properties::dynamic`] apply to the
//! next call.

pub mod circuit;
pub mod command;
pub mod isolation;
pub mod observable_command;
pub mod properties;
pub mod setter;
#[cfg(any(test, feature = "test-support"))]
pub mod support;

pub use command::{Command, StrixCommand};
pub use observable_command::{ObservableCommand, StrixObservableCommand};
pub use properties::{CommandProperties, IsolationStrategy, ThreadPoolProperties};
pub use setter::{CommandSetter, ObservableCommandSetter};

use strix_core::CommandKey;

/// Forget every circuit, semaphore and thread pool
///
/// Dynamic properties are left untouched.
pub fn reset() {
    circuit::registry::clear();
    isolation::clear();
}

/// Forget the circuit and semaphore of one command
pub fn reset_command(key: &CommandKey) {
    circuit::registry::remove(key);
    isolation::remove_semaphore(key);
}
