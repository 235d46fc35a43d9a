//! Action dispatcher - Fans one inbound message out to every action

use std::sync::Arc;

use futures::future::join_all;
use uuid::Uuid;

use crate::application::errors::ActionError;
use crate::domain::entities::Payload;
use crate::domain::traits::{Action, Emitter};

/// Outcome of dispatching one message
#[derive(Debug)]
pub struct DispatchReport {
    pub event_id: Uuid,
    pub handled: usize,
    pub failed: Vec<(String, ActionError)>,
}

impl DispatchReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Holds one bot's actions and delivers messages to all of them
pub struct ActionDispatcher {
    bot: String,
    actions: Vec<Arc<dyn Action>>,
}

impl ActionDispatcher {
    pub fn new(bot: impl Into<String>) -> Self {
        Self {
            bot: bot.into(),
            actions: Vec::new(),
        }
    }

    /// Add an action to the dispatcher
    pub fn with_action(mut self, action: Arc<dyn Action>) -> Self {
        self.actions.push(action);
        self
    }

    pub fn push(&mut self, action: Arc<dyn Action>) {
        self.actions.push(action);
    }

    pub fn bot(&self) -> &str {
        &self.bot
    }

    pub fn actions(&self) -> &[Arc<dyn Action>] {
        &self.actions
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Runs every action on the payload concurrently.
    ///
    /// Action errors are logged and collected; they never stop sibling
    /// actions and are not returned as an error.
    pub async fn dispatch(&self, payload: &Payload, emitter: &dyn Emitter) -> DispatchReport {
        let event_id = Uuid::new_v4();
        tracing::debug!(bot = %self.bot, %event_id, actions = self.actions.len(), "Dispatching message");

        let runs = self.actions.iter().map(|action| async move {
            let outcome = action.on_message(payload, emitter).await;
            (action.name().to_string(), outcome)
        });

        let mut report = DispatchReport {
            event_id,
            handled: 0,
            failed: Vec::new(),
        };

        for (action, outcome) in join_all(runs).await {
            match outcome {
                Ok(()) => report.handled += 1,
                Err(e) => {
                    let cause = std::error::Error::source(&e)
                        .map(|s| s.to_string())
                        .unwrap_or_default();
                    tracing::error!(
                        bot = %self.bot,
                        %event_id,
                        action = %action,
                        payload = %serde_json::Value::Object(payload.clone()),
                        cause = %cause,
                        "Action `{}` cannot process message: {}",
                        action,
                        e
                    );
                    report.failed.push((action, e));
                }
            }
        }

        report
    }
}
