use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::application::errors::TransportError;
use crate::domain::entities::{OutboundEvent, TransportEvent};

/// An open messenger connection.
///
/// Inbound events arrive on `events`; outbound events go through `outbound`.
/// The connection is over once `events` yields `Disconnected` or closes.
#[derive(Debug)]
pub struct Connection {
    pub events: mpsc::Receiver<TransportEvent>,
    pub outbound: mpsc::Sender<OutboundEvent>,
}

/// Transport trait - abstraction for the socket library carrying messages
#[async_trait]
pub trait Transport: Send + Sync {
    /// Open a connection to the given namespace
    async fn connect(&self, namespace: &str) -> Result<Connection, TransportError>;

    /// Close the connection, ending its event stream
    async fn close(&self) -> Result<(), TransportError>;
}
