use async_trait::async_trait;

use super::Emitter;
use crate::application::errors::ActionError;
use crate::domain::entities::{CommandInfo, Payload};

/// Action trait - a pluggable unit reacting to inbound messages for one bot
#[async_trait]
pub trait Action: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &str;

    /// Handle one inbound message, emitting at most the replies it needs
    async fn on_message(&self, data: &Payload, emit: &dyn Emitter) -> Result<(), ActionError>;

    /// Commands this action answers to, for introspection
    fn list_commands(&self) -> Vec<CommandInfo> {
        Vec::new()
    }
}
