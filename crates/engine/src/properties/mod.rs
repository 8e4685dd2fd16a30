//! Command and thread-pool properties
//!
//! Each property resolves in this order: a dynamic value scoped to the
//! instance key, the override supplied with the setter, a dynamic value under
//! the `default` scope, then the built-in default.

pub mod command;
pub mod dynamic;
pub mod thread_pool;

pub use command::{CommandProperties, IsolationStrategy, ResolvedCommandProperties};
pub use thread_pool::{ResolvedThreadPoolProperties, ThreadPoolProperties};

use serde::de::DeserializeOwned;
use strix_core::constants::DEFAULT_SCOPE_KEY;

/// Resolve one property value for `key`, building names with `scoped`
pub(crate) fn resolve<V, F>(scoped: F, key: &str, name: &str, configured: Option<V>, default: V) -> V
where
    V: DeserializeOwned,
    F: Fn(&str, &str) -> String,
{
    dynamic::get(&scoped(key, name))
        .or(configured)
        .or_else(|| dynamic::get(&scoped(DEFAULT_SCOPE_KEY, name)))
        .unwrap_or(default)
}
