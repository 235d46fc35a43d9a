//! In-process loopback transport for tests and embedding

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Mutex;
use tokio::sync::mpsc;

use crate::application::errors::TransportError;
use crate::domain::entities::{OutboundEvent, Payload, TransportEvent};
use crate::domain::traits::{Connection, Transport};

const CHANNEL_CAPACITY: usize = 64;

/// Transport whose far end is a [`LoopbackHandle`] in the same process
pub struct LoopbackTransport {
    pending: Mutex<Option<Connection>>,
    // Weak so that dropping the handle ends the event stream
    control: Mutex<Option<mpsc::WeakSender<TransportEvent>>>,
}

/// The messenger side of a loopback connection
pub struct LoopbackHandle {
    inbound: mpsc::Sender<TransportEvent>,
    outbound: mpsc::Receiver<OutboundEvent>,
}

impl LoopbackTransport {
    /// Creates a transport and the handle that drives it.
    ///
    /// `Connected` is queued first, so events sent through the handle before
    /// the client connects are delivered after it.
    pub fn pair() -> (Self, LoopbackHandle) {
        let (event_tx, event_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let (out_tx, out_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let _ = event_tx.try_send(TransportEvent::Connected);

        let transport = Self {
            pending: Mutex::new(Some(Connection {
                events: event_rx,
                outbound: out_tx,
            })),
            control: Mutex::new(Some(event_tx.downgrade())),
        };
        let handle = LoopbackHandle {
            inbound: event_tx,
            outbound: out_rx,
        };
        (transport, handle)
    }
}

#[async_trait]
impl Transport for LoopbackTransport {
    async fn connect(&self, namespace: &str) -> Result<Connection, TransportError> {
        let connection = self
            .pending
            .lock()
            .map_err(|_| TransportError::Connect("Lock poisoned".to_string()))?
            .take()
            .ok_or_else(|| TransportError::Connect("loopback already connected".to_string()))?;
        tracing::debug!(namespace = %namespace, "Loopback connected");
        Ok(connection)
    }

    async fn close(&self) -> Result<(), TransportError> {
        let control = self
            .control
            .lock()
            .map_err(|_| TransportError::Connect("Lock poisoned".to_string()))?
            .take();
        if let Some(control) = control.and_then(|weak| weak.upgrade()) {
            // The client may already be gone
            let _ = control.try_send(TransportEvent::Disconnected);
        }
        Ok(())
    }
}

impl LoopbackHandle {
    pub async fn send(&self, payload: Payload) -> Result<(), TransportError> {
        self.inbound
            .send(TransportEvent::Message(payload))
            .await
            .map_err(|_| TransportError::Closed)
    }

    /// Sends a JSON object as a message
    pub async fn send_json(&self, value: Value) -> Result<(), TransportError> {
        match value {
            Value::Object(map) => self.send(map).await,
            other => Err(TransportError::InvalidPayload(format!(
                "expected a JSON object, got {}",
                other
            ))),
        }
    }

    pub async fn disconnect(&self) -> Result<(), TransportError> {
        self.inbound
            .send(TransportEvent::Disconnected)
            .await
            .map_err(|_| TransportError::Closed)
    }

    /// Next event the client emitted; `None` once the client is gone
    pub async fn recv(&mut self) -> Option<OutboundEvent> {
        self.outbound.recv().await
    }

    pub fn try_recv(&mut self) -> Option<OutboundEvent> {
        self.outbound.try_recv().ok()
    }
}
