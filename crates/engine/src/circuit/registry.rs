//! One circuit breaker per command key

use super::state::CircuitBreaker;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use std::sync::Arc;
use strix_core::CommandKey;

static BREAKERS: Lazy<DashMap<CommandKey, Arc<CircuitBreaker>>> = Lazy::new(DashMap::new);

/// The breaker for `key`, created closed on first use
pub fn circuit_breaker(key: &CommandKey) -> Arc<CircuitBreaker> {
    if let Some(existing) = BREAKERS.get(key) {
        return Arc::clone(existing.value());
    }
    BREAKERS
        .entry(key.clone())
        .or_insert_with(|| Arc::new(CircuitBreaker::new(key.clone())))
        .value()
        .clone()
}

/// The breaker for `key`, if any execution created one
pub fn find(key: &CommandKey) -> Option<Arc<CircuitBreaker>> {
    BREAKERS.get(key).map(|entry| Arc::clone(entry.value()))
}

pub fn remove(key: &CommandKey) {
    BREAKERS.remove(key);
}

pub fn clear() {
    BREAKERS.clear();
}
