//! Bot client - Binds one bot's actions to one messenger connection

use chrono::{DateTime, Utc};

use super::dispatcher::{ActionDispatcher, DispatchReport};
use super::emitter::ChannelEmitter;
use crate::application::errors::BotError;
use crate::domain::entities::{Payload, TransportEvent, DEFAULT_NAMESPACE, MESSAGE_EVENT};
use crate::domain::traits::{Connection, Transport};

/// Counters collected over one connection
#[derive(Debug, Clone, Default)]
pub struct ClientStats {
    pub messages: usize,
    pub failures: usize,
    pub connected_at: Option<DateTime<Utc>>,
    pub disconnected_at: Option<DateTime<Utc>>,
}

/// Messenger client for a single bot
pub struct BotClient {
    name: String,
    namespace: String,
    connect_groups: Vec<String>,
    dispatcher: ActionDispatcher,
}

impl BotClient {
    pub fn new(dispatcher: ActionDispatcher) -> Self {
        Self {
            name: dispatcher.bot().to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            connect_groups: Vec::new(),
            dispatcher,
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Groups listed in the bot's automation. Recorded, not joined.
    pub fn with_connect_groups(mut self, groups: Vec<String>) -> Self {
        self.connect_groups = groups;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn connect_groups(&self) -> &[String] {
        &self.connect_groups
    }

    pub fn dispatcher(&self) -> &ActionDispatcher {
        &self.dispatcher
    }

    /// Connects and services events until the connection ends.
    ///
    /// Messages are handled one at a time, in arrival order.
    pub async fn run(&self, transport: &dyn Transport) -> Result<ClientStats, BotError> {
        let Connection {
            mut events,
            outbound,
        } = transport.connect(&self.namespace).await?;
        let emitter = ChannelEmitter::new(outbound, MESSAGE_EVENT);
        let mut stats = ClientStats::default();

        while let Some(event) = events.recv().await {
            tracing::trace!(bot = %self.name, event = event.as_str(), "Received event");
            match event {
                TransportEvent::Connected => {
                    stats.connected_at = Some(Utc::now());
                    self.on_connect();
                }
                TransportEvent::Message(payload) => {
                    let report = self.on_message(&payload, &emitter).await;
                    stats.messages += 1;
                    stats.failures += report.failed.len();
                }
                TransportEvent::Disconnected => break,
            }
        }

        stats.disconnected_at = Some(Utc::now());
        self.on_disconnect();
        drop(emitter);
        transport.close().await?;
        Ok(stats)
    }

    fn on_connect(&self) {
        // Joining groups needs a protocol the messenger does not expose yet
        if !self.connect_groups.is_empty() {
            tracing::debug!(
                bot = %self.name,
                groups = ?self.connect_groups,
                "Connect groups configured but not joined"
            );
        }
        tracing::debug!("Bot {} connected to messenger.", self.name);
    }

    fn on_disconnect(&self) {
        tracing::debug!("Bot {} disconnected from messenger.", self.name);
    }

    async fn on_message(&self, payload: &Payload, emitter: &ChannelEmitter) -> DispatchReport {
        self.dispatcher.dispatch(payload, emitter).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::actions::CommandRouterAction;
    use crate::infrastructure::adapters::loopback::LoopbackTransport;
    use serde_json::json;
    use std::sync::Arc;

    fn client() -> BotClient {
        let router = CommandRouterAction::with_defaults("commands").unwrap();
        BotClient::new(ActionDispatcher::new("tester").with_action(Arc::new(router)))
            .with_connect_groups(vec!["lobby".to_string()])
    }

    #[tokio::test]
    async fn test_run_replies_and_stops_on_disconnect() {
        let (transport, mut handle) = LoopbackTransport::pair();
        let client = client();

        handle.send_json(json!({"name": "test"})).await.unwrap();
        handle.send_json(json!({"name": "unknown"})).await.unwrap();
        handle.disconnect().await.unwrap();

        let stats = client.run(&transport).await.unwrap();
        assert_eq!(stats.messages, 2);
        assert_eq!(stats.failures, 1);
        assert!(stats.connected_at.is_some());
        assert!(stats.disconnected_at >= stats.connected_at);

        let reply = handle.recv().await.unwrap();
        assert_eq!(reply.event, "message");
        assert_eq!(
            reply.payload,
            json!({"content_type": "text/plain", "body": "Bot test command executed."})
        );
        assert!(handle.recv().await.is_none());
    }

    #[test]
    fn test_client_settings() {
        let client = client().with_namespace("/bots");
        assert_eq!(client.name(), "tester");
        assert_eq!(client.namespace(), "/bots");
        assert_eq!(client.connect_groups().to_vec(), vec!["lobby".to_string()]);
        assert_eq!(client.dispatcher().len(), 1);
    }
}
