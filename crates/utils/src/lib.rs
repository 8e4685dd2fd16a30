//! Shared utilities for strix
//!
//! This crate provides the blocking bridge used by synchronous command
//! execution and the logging setup shared by binaries and tests.

pub mod async_runtime;
pub mod logging;

pub use async_runtime::*;
