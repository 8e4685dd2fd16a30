//! Identifier newtypes for command groups, commands and thread pools
//!
//! Keys convert from any string so builders can take either a pre-built key
//! or a raw name. Emptiness is checked by [`validate`](CommandKey::validate)
//! when a command is built.

use crate::errors::{Result, Validate};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::ops::Deref;

macro_rules! define_key {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new key, rejecting empty names
            pub fn new(name: impl Into<String>) -> Result<Self> {
                let key = Self(name.into());
                key.validate()?;
                Ok(key)
            }

            /// Check the key is usable as an identifier
            pub fn validate(&self) -> Result<()> {
                Validate::not_empty(&self.0, $label)
            }

            /// Get the inner string
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Convert to String
            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl Deref for $name {
            type Target = str;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(name: &str) -> Self {
                Self(name.to_string())
            }
        }

        impl From<String> for $name {
            fn from(name: String) -> Self {
                Self(name)
            }
        }

        impl From<&$name> for $name {
            fn from(key: &$name) -> Self {
                key.clone()
            }
        }
    };
}

define_key!(
    /// Groups commands for reporting and, by default, thread-pool sharing
    CommandGroupKey,
    "group key"
);

define_key!(
    /// Identifies a command; circuit breakers and semaphores are tracked per key
    CommandKey,
    "command key"
);

define_key!(
    /// Identifies the thread pool a command executes on
    ThreadPoolKey,
    "thread-pool key"
);

impl From<&CommandGroupKey> for CommandKey {
    fn from(group: &CommandGroupKey) -> Self {
        Self(group.as_str().to_string())
    }
}

impl From<&CommandGroupKey> for ThreadPoolKey {
    fn from(group: &CommandGroupKey) -> Self {
        Self(group.as_str().to_string())
    }
}
