//! Builders accumulating a command's identity, work and properties

mod base;
mod command;
mod observable;

pub use base::CommandDsl;
pub use command::{CommandBuilder, CommandSpec};
pub use observable::{ObservableCommandBuilder, ObservableCommandSpec};
