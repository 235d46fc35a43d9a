//! Message handling - Event-driven dispatch to actions

pub mod client;
pub mod dispatcher;
pub mod emitter;

pub use client::{BotClient, ClientStats};
pub use dispatcher::{ActionDispatcher, DispatchReport};
pub use emitter::ChannelEmitter;
