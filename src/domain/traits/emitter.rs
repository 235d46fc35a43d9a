use async_trait::async_trait;

use crate::application::errors::ActionError;
use crate::domain::entities::Reply;

/// Emitter trait - sends a reply back over the connection a message came from
#[async_trait]
pub trait Emitter: Send + Sync {
    async fn emit(&self, reply: Reply) -> Result<(), ActionError>;
}
