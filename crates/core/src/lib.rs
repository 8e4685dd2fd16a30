//! Core domain types, errors, and constants for strix.
//!
//! ## Key Components
//!
//! - **`errors`**: Defines the primary `Error` enum and `Result` type alias
//!   shared by the DSL, the execution engine and the reactive adapters.
//! - **`keys`**: Newtype identifiers for command groups, commands and thread
//!   pools.
//! - **`constants`**: Dynamic property names and scopes.

pub mod constants;
pub mod errors;
pub mod keys;

pub use self::{
    errors::{Error, Result, ResultExt, Validate},
    keys::{CommandGroupKey, CommandKey, ThreadPoolKey},
};
