//! Builder for commands producing sequences

use super::base::{CommandDsl, SpecBase};
use std::fmt;
use std::sync::Arc;
use strix_core::{Error, Result, Validate};
use strix_engine::{ObservableCommand, ObservableCommandSetter, StrixObservableCommand};
use strix_rx::Observable;

type Construct<T> = Arc<dyn Fn() -> Observable<T> + Send + Sync>;

/// Accumulates everything needed to build a [`StrixObservableCommand`]
///
/// Observable commands are always isolated by semaphore, so there is no
/// thread-pool surface.
pub struct ObservableCommandBuilder<T> {
    base: SpecBase,
    construct: Option<Construct<T>>,
    fallback: Option<Construct<T>>,
}

impl<T> Default for ObservableCommandBuilder<T> {
    fn default() -> Self {
        Self {
            base: SpecBase::default(),
            construct: None,
            fallback: None,
        }
    }
}

impl<T> fmt::Debug for ObservableCommandBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableCommandBuilder")
            .field("base", &self.base)
            .field("has_construct", &self.construct.is_some())
            .field("has_fallback", &self.fallback.is_some())
            .finish()
    }
}

impl<T> CommandDsl for ObservableCommandBuilder<T> {
    fn base_mut(&mut self) -> &mut SpecBase {
        &mut self.base
    }
}

impl<T: Send + 'static> ObservableCommandBuilder<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The sequence to relay; required, called once per subscription
    pub fn construct<F>(&mut self, construct: F) -> &mut Self
    where
        F: Fn() -> Observable<T> + Send + Sync + 'static,
    {
        self.construct = Some(Arc::new(construct));
        self
    }

    /// Sequence to continue with when the primary one fails
    pub fn fallback<F>(&mut self, fallback: F) -> &mut Self
    where
        F: Fn() -> Observable<T> + Send + Sync + 'static,
    {
        self.fallback = Some(Arc::new(fallback));
        self
    }

    /// Materialize the command without subscribing to it
    pub fn build(self) -> Result<StrixObservableCommand<ObservableCommandSpec<T>>> {
        let (group_key, command_key, command_properties) = self.base.validated()?;
        let construct = Validate::present(self.construct, "construct")?;

        let setter = ObservableCommandSetter::with_group_key(group_key)
            .and_command_key(command_key)
            .and_command_properties_defaults(command_properties);

        Ok(StrixObservableCommand::new(
            setter,
            ObservableCommandSpec {
                construct,
                fallback: self.fallback,
            },
        ))
    }
}

/// The closures of a built observable command
pub struct ObservableCommandSpec<T> {
    construct: Construct<T>,
    fallback: Option<Construct<T>>,
}

impl<T: Send + 'static> ObservableCommand for ObservableCommandSpec<T> {
    type Output = T;

    fn construct(&self) -> Observable<T> {
        (self.construct)()
    }

    fn resume_with_fallback(&self) -> Observable<T> {
        match &self.fallback {
            Some(fallback) => fallback(),
            None => Observable::error_with(Error::fallback_undefined),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_requires_construct() {
        let mut builder = ObservableCommandBuilder::<u8>::new();
        builder.group_key("Group").command_key("Cmd");
        let err = builder.build().unwrap_err();
        assert!(err.to_string().contains("construct"));
    }

    #[test]
    fn test_build_wires_setter() {
        let mut builder = ObservableCommandBuilder::<u8>::new();
        builder
            .group_key("Group")
            .command_key("Cmd")
            .command_properties(|p| p.with_execution_isolation_semaphore_max_concurrent_requests(3))
            .construct(|| Observable::just(1));

        let command = builder.build().unwrap();
        assert_eq!(command.setter().command_key().as_str(), "Cmd");
        assert_eq!(
            command
                .setter()
                .command_properties()
                .execution_isolation_semaphore_max_concurrent_requests,
            Some(3)
        );
    }

    #[test]
    fn test_invalid_properties_fail_build() {
        let mut builder = ObservableCommandBuilder::<u8>::new();
        builder
            .group_key("Group")
            .command_key("Cmd")
            .command_properties(|p| p.with_circuit_breaker_error_threshold_percentage(101))
            .construct(Observable::empty);
        assert!(matches!(builder.build().unwrap_err(), Error::Configuration { .. }));
    }
}
