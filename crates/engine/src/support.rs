//! Test helpers for steering commands through dynamic properties

use crate::properties::dynamic;
use serde_json::Value;
use std::time::Duration;
use strix_core::constants::{command_property, CIRCUIT_BREAKER_FORCE_OPEN, EXECUTION_TIMEOUT_IN_MILLISECONDS};
use strix_core::CommandKey;

/// Overrides command properties until dropped
///
/// On drop every touched property gets its previous value back and the
/// affected commands lose their circuit and isolation state.
///
/// ```ignore
/// use strix_engine::support::StrixSupport;
///
/// let _support = StrixSupport::new().force_open("GetUser");
/// // every GetUser execution is short-circuited until `_support` is dropped
/// ```
#[derive(Debug, Default)]
#[must_use = "overrides are removed when the guard is dropped"]
pub struct StrixSupport {
    previous: Vec<(String, Option<Value>)>,
    commands: Vec<CommandKey>,
}

impl StrixSupport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Short-circuit every execution of `command`
    pub fn force_open(self, command: impl Into<CommandKey>) -> Self {
        self.set(command.into(), CIRCUIT_BREAKER_FORCE_OPEN, Value::Bool(true))
    }

    /// Override the execution timeout of `command`
    pub fn timeout(self, command: impl Into<CommandKey>, timeout: Duration) -> Self {
        let millis = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self.set(command.into(), EXECUTION_TIMEOUT_IN_MILLISECONDS, Value::from(millis))
    }

    fn set(mut self, command: CommandKey, name: &str, value: Value) -> Self {
        let name = command_property(command.as_str(), name);
        self.previous.push((name.clone(), dynamic::property(&name)));
        dynamic::set_property(name, value);
        if !self.commands.contains(&command) {
            self.commands.push(command);
        }
        self
    }
}

impl Drop for StrixSupport {
    fn drop(&mut self) {
        for (name, previous) in self.previous.drain(..).rev() {
            match previous {
                Some(value) => dynamic::set_property(name, value),
                None => {
                    dynamic::clear_property(&name);
                }
            }
        }
        for command in self.commands.drain(..) {
            crate::reset_command(&command);
        }
    }
}
