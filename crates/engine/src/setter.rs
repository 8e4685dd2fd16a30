//! Identity and property defaults handed to a command at construction

use crate::properties::{CommandProperties, ThreadPoolProperties};
use strix_core::{CommandGroupKey, CommandKey, ThreadPoolKey};

/// Setter for a [`StrixCommand`](crate::StrixCommand)
///
/// The command key and thread-pool key default to the group key's name.
#[derive(Debug, Clone)]
pub struct CommandSetter {
    group_key: CommandGroupKey,
    command_key: Option<CommandKey>,
    thread_pool_key: Option<ThreadPoolKey>,
    command_properties: CommandProperties,
    thread_pool_properties: ThreadPoolProperties,
}

impl CommandSetter {
    pub fn with_group_key(group_key: impl Into<CommandGroupKey>) -> Self {
        Self {
            group_key: group_key.into(),
            command_key: None,
            thread_pool_key: None,
            command_properties: CommandProperties::default(),
            thread_pool_properties: ThreadPoolProperties::default(),
        }
    }

    pub fn and_command_key(mut self, key: impl Into<CommandKey>) -> Self {
        self.command_key = Some(key.into());
        self
    }

    pub fn and_thread_pool_key(mut self, key: impl Into<ThreadPoolKey>) -> Self {
        self.thread_pool_key = Some(key.into());
        self
    }

    pub fn and_command_properties_defaults(mut self, properties: CommandProperties) -> Self {
        self.command_properties = properties;
        self
    }

    pub fn and_thread_pool_properties_defaults(mut self, properties: ThreadPoolProperties) -> Self {
        self.thread_pool_properties = properties;
        self
    }

    pub fn group_key(&self) -> &CommandGroupKey {
        &self.group_key
    }

    pub fn command_key(&self) -> CommandKey {
        self.command_key
            .clone()
            .unwrap_or_else(|| CommandKey::from(&self.group_key))
    }

    pub fn thread_pool_key(&self) -> ThreadPoolKey {
        self.thread_pool_key
            .clone()
            .unwrap_or_else(|| ThreadPoolKey::from(&self.group_key))
    }

    pub fn command_properties(&self) -> &CommandProperties {
        &self.command_properties
    }

    pub fn thread_pool_properties(&self) -> &ThreadPoolProperties {
        &self.thread_pool_properties
    }
}

/// Setter for a [`StrixObservableCommand`](crate::StrixObservableCommand)
#[derive(Debug, Clone)]
pub struct ObservableCommandSetter {
    group_key: CommandGroupKey,
    command_key: Option<CommandKey>,
    command_properties: CommandProperties,
}

impl ObservableCommandSetter {
    pub fn with_group_key(group_key: impl Into<CommandGroupKey>) -> Self {
        Self {
            group_key: group_key.into(),
            command_key: None,
            command_properties: CommandProperties::default(),
        }
    }

    pub fn and_command_key(mut self, key: impl Into<CommandKey>) -> Self {
        self.command_key = Some(key.into());
        self
    }

    pub fn and_command_properties_defaults(mut self, properties: CommandProperties) -> Self {
        self.command_properties = properties;
        self
    }

    pub fn group_key(&self) -> &CommandGroupKey {
        &self.group_key
    }

    pub fn command_key(&self) -> CommandKey {
        self.command_key
            .clone()
            .unwrap_or_else(|| CommandKey::from(&self.group_key))
    }

    pub fn command_properties(&self) -> &CommandProperties {
        &self.command_properties
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_default_to_group() {
        let setter = CommandSetter::with_group_key("Users");
        assert_eq!(setter.command_key().as_str(), "Users");
        assert_eq!(setter.thread_pool_key().as_str(), "Users");

        let setter = setter.and_command_key("GetUser").and_thread_pool_key("UserPool");
        assert_eq!(setter.group_key().as_str(), "Users");
        assert_eq!(setter.command_key().as_str(), "GetUser");
        assert_eq!(setter.thread_pool_key().as_str(), "UserPool");
    }

    #[test]
    fn test_properties_replace_previous_defaults() {
        let setter = ObservableCommandSetter::with_group_key("Users")
            .and_command_properties_defaults(
                CommandProperties::default().with_execution_timeout_in_milliseconds(10),
            )
            .and_command_properties_defaults(
                CommandProperties::default().with_fallback_enabled(false),
            );

        assert_eq!(setter.command_properties().execution_timeout_in_milliseconds, None);
        assert_eq!(setter.command_properties().fallback_enabled, Some(false));
        assert_eq!(setter.command_key().as_str(), "Users");
    }
}
