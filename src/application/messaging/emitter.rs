//! Channel-backed emitter handed to actions

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::application::errors::ActionError;
use crate::domain::entities::{OutboundEvent, Reply};
use crate::domain::traits::Emitter;

/// Sends replies as named outbound events over a connection's channel
#[derive(Debug, Clone)]
pub struct ChannelEmitter {
    sender: mpsc::Sender<OutboundEvent>,
    event: String,
}

impl ChannelEmitter {
    pub fn new(sender: mpsc::Sender<OutboundEvent>, event: impl Into<String>) -> Self {
        Self {
            sender,
            event: event.into(),
        }
    }
}

#[async_trait]
impl Emitter for ChannelEmitter {
    async fn emit(&self, reply: Reply) -> Result<(), ActionError> {
        let event = OutboundEvent::new(self.event.clone(), reply.to_payload());
        self.sender
            .send(event)
            .await
            .map_err(|_| ActionError::Emit("connection closed".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::MESSAGE_EVENT;
    use serde_json::json;

    #[tokio::test]
    async fn test_emit_sends_named_event() {
        let (tx, mut rx) = mpsc::channel(4);
        let emitter = ChannelEmitter::new(tx, MESSAGE_EVENT);

        emitter.emit(Reply::new("text/plain", "pong")).await.unwrap();

        let event = rx.recv().await.unwrap();
        assert_eq!(event.event, "message");
        assert_eq!(event.payload, json!({"content_type": "text/plain", "body": "pong"}));
    }

    #[tokio::test]
    async fn test_emit_on_closed_channel() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let emitter = ChannelEmitter::new(tx, MESSAGE_EVENT);

        let err = emitter.emit(Reply::new("text/plain", "x")).await.unwrap_err();
        assert!(matches!(err, ActionError::Emit(_)));
    }
}
