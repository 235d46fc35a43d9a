use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::future::{self, BoxFuture};
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::message::Payload;
use super::result::CommandResult;
use crate::application::errors::{ActionError, HandlerError};

/// Content type used when a command declares no output format
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// What a handler produces: structured data or any error
pub type HandlerResult = Result<Value, HandlerError>;

/// Command handler function type
pub type CommandHandler = Arc<dyn Fn(Invocation) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

/// How a command result is rendered for the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputFormat {
    pub content_type: String,
    pub template: Option<String>,
}

impl OutputFormat {
    pub fn json() -> Self {
        Self {
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            template: None,
        }
    }

    pub fn template(template: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            template: Some(template.into()),
        }
    }

    pub fn has_template(&self) -> bool {
        self.template.is_some()
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::json()
    }
}

/// Name and description of a registered command, as listed by `help`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandInfo {
    pub name: String,
    pub description: String,
}

/// Input handed to a command handler.
///
/// Carries the full inbound payload plus the catalog of commands known to
/// the owning router.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub payload: Payload,
    pub commands: Arc<[CommandInfo]>,
}

impl Invocation {
    pub fn new(payload: Payload) -> Self {
        Self {
            payload,
            commands: Arc::from(Vec::<CommandInfo>::new()),
        }
    }

    pub fn with_commands(mut self, commands: Arc<[CommandInfo]>) -> Self {
        self.commands = commands;
        self
    }
}

/// Represents a named, invokable command
#[derive(Clone)]
pub struct Command {
    pub name: String,
    pub description: String,
    pub format: OutputFormat,
    handler: CommandHandler,
}

impl Command {
    /// Creates a command whose handler returns no data.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            format: OutputFormat::default(),
            handler: Arc::new(|_: Invocation| future::ready(Ok::<_, HandlerError>(Value::Null)).boxed()),
        }
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_template(self, template: impl Into<String>, content_type: impl Into<String>) -> Self {
        self.with_format(OutputFormat::template(template, content_type))
    }

    /// Sets an asynchronous handler
    pub fn with_handler<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(Invocation) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.handler = Arc::new(move |invocation: Invocation| handler(invocation).boxed());
        self
    }

    /// Sets a synchronous handler
    pub fn with_sync_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(Invocation) -> HandlerResult + Send + Sync + 'static,
    {
        self.handler =
            Arc::new(move |invocation: Invocation| future::ready(handler(invocation)).boxed());
        self
    }

    pub fn info(&self) -> CommandInfo {
        CommandInfo {
            name: self.name.clone(),
            description: self.description.clone(),
        }
    }

    /// Runs the handler to completion.
    ///
    /// Every failure, including a panic inside the handler, comes back as
    /// [`ActionError::CommandExecution`] with the original as its source.
    pub async fn invoke(&self, invocation: Invocation) -> Result<CommandResult, ActionError> {
        let handler = Arc::clone(&self.handler);
        let outcome = AssertUnwindSafe(async move { handler(invocation).await })
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(data)) => Ok(CommandResult::new(data, self.format.clone())),
            Ok(Err(source)) => Err(ActionError::CommandExecution {
                command: self.name.clone(),
                source,
            }),
            Err(panic) => Err(ActionError::CommandExecution {
                command: self.name.clone(),
                source: panic_message(panic).into(),
            }),
        }
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("format", &self.format)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        format!("handler panicked: {}", msg)
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        format!("handler panicked: {}", msg)
    } else {
        "handler panicked".to_string()
    }
}

/// Name-keyed command table.
///
/// Lookups go through the map; `describe` follows registration order.
#[derive(Debug, Default, Clone)]
pub struct CommandRegistry {
    commands: HashMap<String, Command>,
    order: Vec<String>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, command: Command) -> Result<(), ActionError> {
        if self.commands.contains_key(&command.name) {
            return Err(ActionError::CommandAlreadyRegistered(command.name));
        }
        self.order.push(command.name.clone());
        self.commands.insert(command.name.clone(), command);
        Ok(())
    }

    pub fn unregister(&mut self, command: &Command) -> Result<Command, ActionError> {
        let removed = self
            .commands
            .remove(&command.name)
            .ok_or_else(|| ActionError::CommandNotFound(command.name.clone()))?;
        self.order.retain(|name| name != &command.name);
        Ok(removed)
    }

    pub fn lookup(&self, name: &str) -> Result<&Command, ActionError> {
        self.commands
            .get(name)
            .ok_or_else(|| ActionError::CommandNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    pub fn describe(&self) -> Vec<CommandInfo> {
        self.order
            .iter()
            .filter_map(|name| self.commands.get(name))
            .map(Command::info)
            .collect()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
