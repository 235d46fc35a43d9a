//! Application layer errors

use thiserror::Error;

/// Error type returned by command handlers.
///
/// Handlers may fail with anything; the command boundary folds it into
/// [`ActionError::CommandExecution`].
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// General bot errors
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Action error: {0}")]
    Action(#[from] ActionError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Errors raised by actions while handling a message.
///
/// Everything except `CommandAlreadyRegistered` is contained per action by
/// the dispatcher; duplicate registration aborts action construction.
#[derive(Error, Debug)]
pub enum ActionError {
    #[error("Command not found: {0}")]
    CommandNotFound(String),

    #[error("Command already registered: {0}")]
    CommandAlreadyRegistered(String),

    #[error("Command `{command}` failed")]
    CommandExecution {
        command: String,
        #[source]
        source: HandlerError,
    },

    #[error("Formatting error: {0}")]
    Formatting(String),

    #[error("Emit failed: {0}")]
    Emit(String),
}

/// Transport errors
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Connection closed")]
    Closed,

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
