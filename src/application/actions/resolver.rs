//! Action resolver - turns configured identifiers into constructed actions

use std::collections::HashMap;
use std::sync::Arc;

use super::router::CommandRouterAction;
use crate::application::errors::{ActionError, BotError, ConfigError};
use crate::domain::traits::Action;
use crate::infrastructure::config::ActionConfig;

/// Constructor for one kind of action
pub type ActionFactory =
    Arc<dyn Fn(&ActionConfig) -> Result<Arc<dyn Action>, ActionError> + Send + Sync>;

/// Identifier of the built-in command router
pub const COMMANDS_ACTION: &str = "commands";

/// Maps action identifiers to their constructors
#[derive(Clone, Default)]
pub struct ActionResolver {
    factories: HashMap<String, ActionFactory>,
}

impl ActionResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolver knowing the built-in `commands` router
    pub fn with_defaults() -> Self {
        let mut resolver = Self::new();
        resolver.register(COMMANDS_ACTION, |config: &ActionConfig| {
            let mut builder = CommandRouterAction::builder(config.name.clone());
            if let Some(format) = config.output_format() {
                builder = builder.with_formatter(format);
            }
            Ok(Arc::new(builder.build()?) as Arc<dyn Action>)
        });
        resolver
    }

    pub fn register<F>(&mut self, identifier: impl Into<String>, factory: F)
    where
        F: Fn(&ActionConfig) -> Result<Arc<dyn Action>, ActionError> + Send + Sync + 'static,
    {
        let identifier = identifier.into();
        if self.factories.insert(identifier.clone(), Arc::new(factory)).is_some() {
            tracing::warn!("Replaced action factory: {}", identifier);
        }
    }

    pub fn is_known(&self, identifier: &str) -> bool {
        self.factories.contains_key(identifier)
    }

    pub fn identifiers(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Constructs the action a config entry points at.
    ///
    /// Construction errors are returned as-is: a duplicate command is a
    /// defect in the action, not something to skip over.
    pub fn resolve(&self, config: &ActionConfig) -> Result<Arc<dyn Action>, BotError> {
        if !self.is_known(&config.value) {
            tracing::warn!(
                action = %config.name,
                known = ?self.identifiers(),
                "Unknown action identifier: {}",
                config.value
            );
        }
        let factory = self
            .factories
            .get(&config.value)
            .ok_or_else(|| ConfigError::UnknownAction(config.value.clone()))?;

        let action = factory(config)?;
        tracing::debug!(action = %config.name, value = %config.value, "Resolved action");
        Ok(action)
    }
}
