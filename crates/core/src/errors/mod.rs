//! Error types and result extensions for strix operations

mod builders;
mod interop;
mod types;
mod validation;

pub use interop::ResultExt;
pub use types::{Error, Result};
pub use validation::Validate;
