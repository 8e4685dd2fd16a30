//! Process-wide store of dynamic property values
//!
//! Names are dotted paths such as
//! `strix.command.GetUser.circuitBreaker.forceOpen`. Values are kept as JSON
//! and converted to the requested type on every read, so changes take effect
//! on the next execution.

use dashmap::DashMap;
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::path::Path;
use strix_core::{Error, Result, ResultExt};
use tracing::{debug, warn};

static PROPERTIES: Lazy<DashMap<String, Value>> = Lazy::new(DashMap::new);

/// Set a property, replacing any previous value
pub fn set_property(name: impl Into<String>, value: impl Into<Value>) {
    let name = name.into();
    let value = value.into();
    debug!(property = %name, %value, "setting dynamic property");
    PROPERTIES.insert(name, value);
}

/// Remove a property, returning its previous value
pub fn clear_property(name: &str) -> Option<Value> {
    PROPERTIES.remove(name).map(|(_, value)| value)
}

/// Remove every property
pub fn clear() {
    PROPERTIES.clear();
}

/// Raw value of a property
pub fn property(name: &str) -> Option<Value> {
    PROPERTIES.get(name).map(|entry| entry.value().clone())
}

/// Typed value of a property
///
/// A value that does not convert to `V` is logged and treated as unset.
pub fn get<V: DeserializeOwned>(name: &str) -> Option<V> {
    let value = property(name)?;
    match serde_json::from_value(value) {
        Ok(typed) => Some(typed),
        Err(e) => {
            warn!(property = name, error = %e, "ignoring dynamic property with unexpected type");
            None
        }
    }
}

/// Load properties from a JSON document, returning how many were set
///
/// Nested objects are flattened into dotted names, so
/// `{"strix": {"command": {"default": {"fallback.enabled": false}}}}` and
/// `{"strix.command.default.fallback.enabled": false}` are equivalent.
pub fn load_json_str(json: &str) -> Result<usize> {
    let document: Value = serde_json::from_str(json).context("invalid property document")?;
    let Value::Object(entries) = document else {
        return Err(Error::configuration(
            "property document must be a JSON object",
        ));
    };

    let mut flattened = Vec::new();
    flatten(None, entries, &mut flattened);
    let count = flattened.len();
    for (name, value) in flattened {
        set_property(name, value);
    }
    Ok(count)
}

/// Load properties from a JSON file
pub fn load_json_file(path: impl AsRef<Path>) -> Result<usize> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .map_err(|e| Error::file_system(path, "read properties", e))?;
    load_json_str(&contents)
        .with_context(|| format!("failed to load properties from {}", path.display()))
}

fn flatten(prefix: Option<&str>, entries: Map<String, Value>, out: &mut Vec<(String, Value)>) {
    for (name, value) in entries {
        let name = match prefix {
            Some(prefix) => format!("{prefix}.{name}"),
            None => name,
        };
        match value {
            Value::Object(nested) => flatten(Some(&name), nested, out),
            leaf => out.push((name, leaf)),
        }
    }
}
