use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Inbound message payload: opaque key/value data from the messenger.
///
/// The only reserved field is `name`, which selects a command.
pub type Payload = Map<String, Value>;

/// Event name used for replies sent back over the connection
pub const MESSAGE_EVENT: &str = "message";

/// Default messenger namespace a bot connects to
pub const DEFAULT_NAMESPACE: &str = "/messenger";

/// Events delivered by a transport connection
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    Connected,
    Message(Payload),
    Disconnected,
}

impl TransportEvent {
    pub fn as_str(&self) -> &str {
        match self {
            TransportEvent::Connected => "connect",
            TransportEvent::Message(_) => "message",
            TransportEvent::Disconnected => "disconnect",
        }
    }
}

/// Named event sent back over a connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundEvent {
    pub event: String,
    pub payload: Value,
}

impl OutboundEvent {
    pub fn new(event: impl Into<String>, payload: Value) -> Self {
        Self {
            event: event.into(),
            payload,
        }
    }
}

/// A formatted command result ready to be emitted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub content_type: String,
    pub body: String,
}

impl Reply {
    pub fn new(content_type: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            body: body.into(),
        }
    }

    /// Wire representation carried by an outbound `message` event
    pub fn to_payload(&self) -> Value {
        json!({
            "content_type": self.content_type,
            "body": self.body,
        })
    }
}
