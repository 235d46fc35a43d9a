use std::sync::Arc;

use tokio::task::JoinSet;

use crate::application::actions::ActionResolver;
use crate::application::errors::BotError;
use crate::application::messaging::{ActionDispatcher, BotClient, ClientStats};
use crate::domain::traits::Transport;
use crate::infrastructure::config::{BotConfig, Config};

/// How one bot's connection ended
#[derive(Debug)]
pub struct ClientReport {
    pub bot: String,
    pub stats: ClientStats,
}

/// Service running one messenger client per enabled bot
pub struct BotService {
    clients: Vec<Arc<BotClient>>,
    transports: Vec<Arc<dyn Transport>>,
    tasks: JoinSet<Result<ClientReport, BotError>>,
}

impl BotService {
    pub fn new(clients: Vec<BotClient>) -> Self {
        Self {
            clients: clients.into_iter().map(Arc::new).collect(),
            transports: Vec::new(),
            tasks: JoinSet::new(),
        }
    }

    /// Builds a client for every enabled bot with its enabled actions.
    ///
    /// Any action that fails to resolve or construct aborts the whole build.
    pub fn from_config(config: &Config, resolver: &ActionResolver) -> Result<Self, BotError> {
        let clients = config
            .enabled_bots()
            .map(|bot| build_client(bot, &config.service.namespace, resolver))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::info!("Prepared {} bot client(s)", clients.len());
        Ok(Self::new(clients))
    }

    pub fn clients(&self) -> &[Arc<BotClient>] {
        &self.clients
    }

    pub fn is_running(&self) -> bool {
        !self.tasks.is_empty()
    }

    /// Spawns every client on its own task with a transport from `connect`
    pub fn start<F>(&mut self, mut connect: F)
    where
        F: FnMut(&BotClient) -> Arc<dyn Transport>,
    {
        for client in &self.clients {
            let transport = connect(client);
            self.transports.push(Arc::clone(&transport));

            let client = Arc::clone(client);
            tracing::info!("Starting bot {}", client.name());
            self.tasks.spawn(async move {
                let stats = client.run(transport.as_ref()).await?;
                Ok::<_, BotError>(ClientReport {
                    bot: client.name().to_string(),
                    stats,
                })
            });
        }
    }

    /// Waits for the next client to finish; `None` when none are running
    pub async fn join_next(&mut self) -> Option<Result<ClientReport, BotError>> {
        let joined = self.tasks.join_next().await?;
        Some(joined.unwrap_or_else(|e| Err(BotError::Internal(format!("bot task failed: {}", e)))))
    }

    /// Closes every connection and waits for the clients to wind down
    pub async fn stop(&mut self) -> Vec<Result<ClientReport, BotError>> {
        for transport in self.transports.drain(..) {
            if let Err(e) = transport.close().await {
                tracing::warn!("Failed to close transport: {}", e);
            }
        }

        let mut reports = Vec::new();
        while let Some(report) = self.join_next().await {
            log_report(&report);
            reports.push(report);
        }
        reports
    }
}

/// Logs how a client ended
pub fn log_report(report: &Result<ClientReport, BotError>) {
    match report {
        Ok(r) => tracing::info!(
            "Bot {} stopped after {} message(s), {} action failure(s)",
            r.bot,
            r.stats.messages,
            r.stats.failures
        ),
        Err(e) => tracing::error!("Bot stopped with error: {}", e),
    }
}

fn build_client(
    bot: &BotConfig,
    namespace: &str,
    resolver: &ActionResolver,
) -> Result<BotClient, BotError> {
    let mut dispatcher = ActionDispatcher::new(bot.name.clone());
    for action in bot.enabled_actions() {
        dispatcher.push(resolver.resolve(action)?);
    }
    if dispatcher.is_empty() {
        tracing::warn!("Bot {} has no enabled actions", bot.name);
    }

    Ok(BotClient::new(dispatcher)
        .with_namespace(namespace)
        .with_connect_groups(bot.connect_groups()))
}
