//! State and setters shared by both builders

use strix_core::{CommandGroupKey, CommandKey, Result, Validate};
use strix_engine::CommandProperties;

/// Identity and property overrides common to every command spec
#[derive(Debug, Clone, Default)]
pub struct SpecBase {
    pub(crate) group_key: Option<CommandGroupKey>,
    pub(crate) command_key: Option<CommandKey>,
    pub(crate) command_properties: CommandProperties,
}

impl SpecBase {
    /// Check the keys are set and usable, and the overrides are in range
    pub(crate) fn validated(self) -> Result<(CommandGroupKey, CommandKey, CommandProperties)> {
        let group_key = Validate::present(self.group_key, "groupKey")?;
        group_key.validate()?;
        let command_key = Validate::present(self.command_key, "commandKey")?;
        command_key.validate()?;
        self.command_properties.validate()?;
        Ok((group_key, command_key, self.command_properties))
    }
}

/// Setters available on every command builder
pub trait CommandDsl {
    #[doc(hidden)]
    fn base_mut(&mut self) -> &mut SpecBase;

    /// Group the command reports under; required
    fn group_key(&mut self, key: impl Into<CommandGroupKey>) -> &mut Self {
        self.base_mut().group_key = Some(key.into());
        self
    }

    /// Key the command's circuit, semaphore and properties are tracked by; required
    fn command_key(&mut self, key: impl Into<CommandKey>) -> &mut Self {
        self.base_mut().command_key = Some(key.into());
        self
    }

    /// Replace the property overrides with `configure` applied to an empty set
    ///
    /// Calling this twice keeps only the second set.
    fn command_properties<F>(&mut self, configure: F) -> &mut Self
    where
        F: FnOnce(CommandProperties) -> CommandProperties,
    {
        self.base_mut().command_properties = configure(CommandProperties::default());
        self
    }
}
