//! Action-dispatch kernel for messenger bots.
//!
//! A bot owns a list of [`Action`]s. Every inbound message is handed to all
//! of them; the built-in [`CommandRouterAction`] resolves the message's
//! `name` field to a registered [`Command`], runs it and emits the formatted
//! [`CommandResult`] back over the connection.

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::actions::{ActionResolver, CommandRouterAction, EmitPolicy};
pub use application::errors::{ActionError, BotError, ConfigError, TransportError};
pub use application::messaging::{ActionDispatcher, BotClient, ChannelEmitter, DispatchReport};
pub use application::services::BotService;
pub use domain::entities::{
    Command, CommandInfo, CommandRegistry, CommandResult, Invocation, OutputFormat, Payload, Reply,
};
pub use domain::traits::{Action, Emitter, Transport};
pub use infrastructure::config::Config;
