//! Shared fixtures for the DSL tests

#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use strix::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Greeting {
    pub message: String,
}

/// Stand-in for a remote greeting endpoint answering with JSON
#[derive(Debug, Clone, Default)]
pub struct GreetService {
    calls: Arc<AtomicUsize>,
}

impl GreetService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn greet(&self, first_name: &str, last_name: &str) -> Result<Greeting> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let body = format!(r#"{{"message": "Have a nice day {first_name} {last_name}"}}"#);
        Ok(serde_json::from_str(&body)?)
    }

    pub fn unavailable(&self) -> Result<Greeting> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(Error::execution("greeting service unavailable"))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

pub fn fallback_greeting() -> Result<Greeting> {
    Ok(Greeting {
        message: "fallback".to_string(),
    })
}

/// Command key no other test uses
pub fn unique_key(prefix: &str) -> String {
    format!("{prefix}-{}", uuid::Uuid::new_v4())
}
