//! Domain entities - Commands, results and the messages that carry them

pub mod command;
pub mod message;
pub mod result;
pub mod template;

pub use command::{
    Command, CommandHandler, CommandInfo, CommandRegistry, HandlerResult, Invocation, OutputFormat,
    DEFAULT_CONTENT_TYPE,
};
pub use message::{OutboundEvent, Payload, Reply, TransportEvent, DEFAULT_NAMESPACE, MESSAGE_EVENT};
pub use result::CommandResult;
