//! Closure-based DSL for resilient commands
//!
//! A configuration closure fills in a builder; the built command runs on
//! `strix-engine`, which owns circuit breaking, isolation, timeouts and
//! fallbacks.
//!
//! ```no_run
//! use strix::prelude::*;
//!
//! # fn main() -> strix::Result<()> {
//! let greeting: String = strix::command(|c| {
//!     c.group_key("Greetings")
//!         .command_key("Greet")
//!         .command_properties(|p| p.with_execution_timeout_in_milliseconds(500))
//!         .run(|| Ok("Have a nice day".to_string()))
//!         .fallback(|| Ok("fallback".to_string()));
//! })?;
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod reactive;

pub use builder::{
    CommandBuilder, CommandDsl, CommandSpec, ObservableCommandBuilder, ObservableCommandSpec,
};
pub use reactive::{from_flux, from_mono, to_flux, to_mono, Flux, Mono, ObservableExt};
pub use strix_core::{CommandGroupKey, CommandKey, Error, Result, ThreadPoolKey};
pub use strix_engine::{
    CommandProperties, IsolationStrategy, StrixCommand, StrixObservableCommand,
    ThreadPoolProperties,
};
pub use strix_rx::Observable;

/// Everything a configuration closure needs
pub mod prelude {
    pub use crate::builder::{CommandBuilder, CommandDsl, ObservableCommandBuilder};
    pub use crate::reactive::{Flux, Mono, ObservableExt};
    pub use strix_core::{Error, Result};
    pub use strix_engine::{CommandProperties, IsolationStrategy, ThreadPoolProperties};
    pub use strix_rx::Observable;
}

/// Build a command from `configure` without running it
pub fn build_command<T, F>(configure: F) -> Result<StrixCommand<CommandSpec<T>>>
where
    T: Send + 'static,
    F: FnOnce(&mut CommandBuilder<T>),
{
    let mut builder = CommandBuilder::new();
    configure(&mut builder);
    builder.build()
}

/// Build and execute a command, blocking until it yields a value
///
/// Fails with [`Error::Configuration`] when called from inside an async
/// runtime; use [`queue_command`] there.
pub fn command<T, F>(configure: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&mut CommandBuilder<T>),
{
    build_command(configure)?.execute()
}

/// Build and execute a command asynchronously
pub async fn queue_command<T, F>(configure: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&mut CommandBuilder<T>),
{
    build_command(configure)?.queue().await
}

/// Build an observable command and return its cold sequence
///
/// Each subscription to the returned observable executes the command.
pub fn observable_command<T, F>(configure: F) -> Result<Observable<T>>
where
    T: Send + 'static,
    F: FnOnce(&mut ObservableCommandBuilder<T>),
{
    let mut builder = ObservableCommandBuilder::new();
    configure(&mut builder);
    let command = builder.build()?;
    tracing::debug!(
        group = %command.setter().group_key(),
        command = %command.setter().command_key(),
        "built observable command"
    );
    Ok(command.to_observable())
}
