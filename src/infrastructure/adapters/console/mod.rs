//! Console adapter for development/testing
//!
//! Reads one message per stdin line and prints outbound events as JSON
//! lines. A line is either a JSON object or a `/name` shortcut.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Mutex;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::application::errors::TransportError;
use crate::domain::entities::{OutboundEvent, Payload, TransportEvent};
use crate::domain::traits::{Connection, Transport};

const CHANNEL_CAPACITY: usize = 64;

/// Console transport for local development
#[derive(Default)]
pub struct ConsoleTransport {
    reader: Mutex<Option<JoinHandle<()>>>,
    writer: Mutex<Option<JoinHandle<()>>>,
}

impl ConsoleTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Parses one console line into a message payload
pub fn parse_line(line: &str) -> Result<Option<Payload>, TransportError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    if let Some(name) = line.strip_prefix('/') {
        let mut parts = name.split_whitespace();
        let mut payload = Map::new();
        payload.insert(
            "name".to_string(),
            Value::String(parts.next().unwrap_or_default().to_string()),
        );
        let args: Vec<Value> = parts.map(|a| Value::String(a.to_string())).collect();
        if !args.is_empty() {
            payload.insert("args".to_string(), Value::Array(args));
        }
        return Ok(Some(payload));
    }

    match serde_json::from_str::<Value>(line)? {
        Value::Object(map) => Ok(Some(map)),
        other => Err(TransportError::InvalidPayload(format!(
            "expected a JSON object, got {}",
            other
        ))),
    }
}

#[async_trait]
impl Transport for ConsoleTransport {
    async fn connect(&self, namespace: &str) -> Result<Connection, TransportError> {
        let (event_tx, event_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let (out_tx, mut out_rx) = mpsc::channel::<OutboundEvent>(CHANNEL_CAPACITY);

        event_tx
            .send(TransportEvent::Connected)
            .await
            .map_err(|_| TransportError::Closed)?;

        let reader = tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => match parse_line(&line) {
                        Ok(Some(payload)) => {
                            if event_tx.send(TransportEvent::Message(payload)).await.is_err() {
                                return;
                            }
                        }
                        Ok(None) => {}
                        Err(e) => tracing::warn!("Ignoring console input: {}", e),
                    },
                    Ok(None) => break,
                    Err(e) => {
                        tracing::error!("Failed to read stdin: {}", e);
                        break;
                    }
                }
            }
            let _ = event_tx.send(TransportEvent::Disconnected).await;
        });

        let writer = tokio::spawn(async move {
            while let Some(event) = out_rx.recv().await {
                match serde_json::to_string(&event) {
                    Ok(line) => println!("{}", line),
                    Err(e) => tracing::warn!("Failed to encode outbound event: {}", e),
                }
            }
        });

        *self
            .reader
            .lock()
            .map_err(|_| TransportError::Connect("Lock poisoned".to_string()))? = Some(reader);
        *self
            .writer
            .lock()
            .map_err(|_| TransportError::Connect("Lock poisoned".to_string()))? = Some(writer);

        tracing::info!("Console connected to {} (one JSON object or /command per line)", namespace);
        Ok(Connection {
            events: event_rx,
            outbound: out_tx,
        })
    }

    async fn close(&self) -> Result<(), TransportError> {
        let reader = self
            .reader
            .lock()
            .map_err(|_| TransportError::Connect("Lock poisoned".to_string()))?
            .take();
        if let Some(reader) = reader {
            reader.abort();
        }

        let writer = self
            .writer
            .lock()
            .map_err(|_| TransportError::Connect("Lock poisoned".to_string()))?
            .take();
        if let Some(writer) = writer {
            // Ends once every sender is dropped; flush what is queued
            if let Err(e) = writer.await {
                tracing::warn!("Console writer stopped abnormally: {}", e);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_json_line() {
        let payload = parse_line(r#"{"name": "help", "x": 1}"#).unwrap().unwrap();
        assert_eq!(Value::Object(payload), json!({"name": "help", "x": 1}));
    }

    #[test]
    fn test_parse_slash_command() {
        let payload = parse_line("/test").unwrap().unwrap();
        assert_eq!(Value::Object(payload), json!({"name": "test"}));

        let payload = parse_line("  /echo hello world ").unwrap().unwrap();
        assert_eq!(
            Value::Object(payload),
            json!({"name": "echo", "args": ["hello", "world"]})
        );
    }

    #[test]
    fn test_parse_blank_and_invalid() {
        assert!(parse_line("   ").unwrap().is_none());
        assert!(matches!(
            parse_line("[1]"),
            Err(TransportError::InvalidPayload(_))
        ));
        assert!(matches!(
            parse_line("{not json"),
            Err(TransportError::Serialization(_))
        ));
    }
}
