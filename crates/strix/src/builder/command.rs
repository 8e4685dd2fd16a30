//! Builder for synchronous commands

use super::base::{CommandDsl, SpecBase};
use std::fmt;
use std::sync::Arc;
use strix_core::{Error, Result, ThreadPoolKey, Validate};
use strix_engine::{Command, CommandSetter, StrixCommand, ThreadPoolProperties};

type Work<T> = Arc<dyn Fn() -> Result<T> + Send + Sync>;

/// Accumulates everything needed to build a [`StrixCommand`]
pub struct CommandBuilder<T> {
    base: SpecBase,
    work: Option<Work<T>>,
    fallback: Option<Work<T>>,
    thread_pool_key: Option<ThreadPoolKey>,
    thread_pool_properties: ThreadPoolProperties,
}

impl<T> Default for CommandBuilder<T> {
    fn default() -> Self {
        Self {
            base: SpecBase::default(),
            work: None,
            fallback: None,
            thread_pool_key: None,
            thread_pool_properties: ThreadPoolProperties::default(),
        }
    }
}

impl<T> fmt::Debug for CommandBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandBuilder")
            .field("base", &self.base)
            .field("has_work", &self.work.is_some())
            .field("has_fallback", &self.fallback.is_some())
            .field("thread_pool_key", &self.thread_pool_key)
            .field("thread_pool_properties", &self.thread_pool_properties)
            .finish()
    }
}

impl<T> CommandDsl for CommandBuilder<T> {
    fn base_mut(&mut self) -> &mut SpecBase {
        &mut self.base
    }
}

impl<T: Send + 'static> CommandBuilder<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The unit of work; required
    pub fn run<F>(&mut self, work: F) -> &mut Self
    where
        F: Fn() -> Result<T> + Send + Sync + 'static,
    {
        self.work = Some(Arc::new(work));
        self
    }

    /// Value to produce when the work fails, times out or is rejected
    pub fn fallback<F>(&mut self, fallback: F) -> &mut Self
    where
        F: Fn() -> Result<T> + Send + Sync + 'static,
    {
        self.fallback = Some(Arc::new(fallback));
        self
    }

    /// Pool shared by commands isolated on threads; defaults to the group key
    pub fn thread_pool_key(&mut self, key: impl Into<ThreadPoolKey>) -> &mut Self {
        self.thread_pool_key = Some(key.into());
        self
    }

    /// Replace the pool overrides with `configure` applied to an empty set
    pub fn thread_pool_properties<F>(&mut self, configure: F) -> &mut Self
    where
        F: FnOnce(ThreadPoolProperties) -> ThreadPoolProperties,
    {
        self.thread_pool_properties = configure(ThreadPoolProperties::default());
        self
    }

    /// Materialize the command without running it
    pub fn build(self) -> Result<StrixCommand<CommandSpec<T>>> {
        let (group_key, command_key, command_properties) = self.base.validated()?;
        let work = Validate::present(self.work, "run")?;
        self.thread_pool_properties.validate()?;

        let mut setter = CommandSetter::with_group_key(group_key)
            .and_command_key(command_key)
            .and_command_properties_defaults(command_properties)
            .and_thread_pool_properties_defaults(self.thread_pool_properties);
        if let Some(pool) = self.thread_pool_key {
            pool.validate()?;
            setter = setter.and_thread_pool_key(pool);
        }

        Ok(StrixCommand::new(
            setter,
            CommandSpec {
                work,
                fallback: self.fallback,
            },
        ))
    }
}

/// The closures of a built command
pub struct CommandSpec<T> {
    work: Work<T>,
    fallback: Option<Work<T>>,
}

impl<T> CommandSpec<T> {
    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }
}

impl<T: Send + 'static> Command for CommandSpec<T> {
    type Output = T;

    fn run(&self) -> Result<T> {
        (self.work)()
    }

    fn fallback(&self) -> Result<T> {
        match &self.fallback {
            Some(fallback) => fallback(),
            None => Err(Error::fallback_undefined()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_requires_keys_and_work() {
        let mut builder = CommandBuilder::<u8>::new();
        builder.command_key("Cmd").run(|| Ok(1));
        let err = builder.build().unwrap_err();
        assert!(err.to_string().contains("groupKey"));

        let mut builder = CommandBuilder::<u8>::new();
        builder.group_key("Group").run(|| Ok(1));
        let err = builder.build().unwrap_err();
        assert!(err.to_string().contains("commandKey"));

        let mut builder = CommandBuilder::<u8>::new();
        builder.group_key("Group").command_key("Cmd");
        let err = builder.build().unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
        assert!(err.to_string().contains("run"));
    }

    #[test]
    fn test_build_rejects_blank_keys() {
        let mut builder = CommandBuilder::<u8>::new();
        builder.group_key("Group").command_key("  ").run(|| Ok(1));
        assert!(builder.build().is_err());
    }

    #[test]
    fn test_build_wires_setter() {
        let mut builder = CommandBuilder::<u8>::new();
        builder
            .group_key("Group")
            .command_key("Cmd")
            .thread_pool_key("Pool")
            .thread_pool_properties(|p| p.with_core_size(2))
            .command_properties(|p| p.with_execution_timeout_in_milliseconds(10))
            .command_properties(|p| p.with_fallback_enabled(false))
            .run(|| Ok(1));

        let command = builder.build().unwrap();
        let setter = command.setter();
        assert_eq!(setter.group_key().as_str(), "Group");
        assert_eq!(setter.command_key().as_str(), "Cmd");
        assert_eq!(setter.thread_pool_key().as_str(), "Pool");
        assert_eq!(setter.thread_pool_properties().core_size, Some(2));
        assert_eq!(setter.command_properties().execution_timeout_in_milliseconds, None);
        assert_eq!(setter.command_properties().fallback_enabled, Some(false));
        assert!(!command.command().has_fallback());
    }

    #[test]
    fn test_spec_without_fallback_reports_undefined() {
        let mut builder = CommandBuilder::<u8>::new();
        builder.group_key("Group").command_key("Cmd").run(|| Ok(1));
        let command = builder.build().unwrap();

        assert_eq!(command.command().run().unwrap(), 1);
        assert!(command.command().fallback().unwrap_err().is_fallback_undefined());
    }
}
