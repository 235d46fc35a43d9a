//! Actions - Pluggable message handlers and how they are constructed

pub mod resolver;
pub mod router;

pub use resolver::{ActionFactory, ActionResolver, COMMANDS_ACTION};
pub use router::{CommandRouterAction, CommandRouterBuilder, EmitPolicy};
