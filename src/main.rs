use clap::{Parser, Subcommand};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anthill_bot::application::actions::ActionResolver;
use anthill_bot::application::errors::BotError;
use anthill_bot::application::services::{log_report, BotService};
use anthill_bot::domain::traits::Transport;
use anthill_bot::infrastructure::adapters::ConsoleTransport;
use anthill_bot::infrastructure::config::Config;

/// How long shutdown waits for blocking work, such as a pending stdin read
const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

#[derive(Parser)]
#[command(name = "anthill-bot")]
#[command(about = "Action-dispatch kernel for messenger bots", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml", env = "BOT_CONFIG")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one bot against the console (JSON or /command per line)
    Run {
        /// Bot to run (defaults to the first enabled bot)
        #[arg(short, long)]
        bot: Option<String>,
    },
    /// List the commands of every configured action
    Commands,
    /// Show version
    Version,
    /// Write the default config
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Run { bot } => run_bot(&cli.config, bot),
        Commands::Commands => list_commands(&cli.config),
        Commands::Version => {
            println!("anthill-bot v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::InitConfig { force } => init_config(&cli.config, force),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(config_path: &str) -> Config {
    if Path::new(config_path).exists() {
        Config::load(config_path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config: {}, using defaults", e);
            Config::load_env()
        })
    } else {
        Config::load_env()
    }
}

fn run_bot(config_path: &str, bot: Option<String>) -> Result<(), BotError> {
    let mut config = load_config(config_path);

    // The console can only feed one bot
    let selected = match bot {
        Some(name) => config
            .bot(&name)
            .map(|b| b.name.clone())
            .ok_or_else(|| BotError::Internal(format!("No bot named {}", name)))?,
        None => config
            .enabled_bots()
            .next()
            .map(|b| b.name.clone())
            .ok_or_else(|| BotError::Internal("No enabled bots configured".to_string()))?,
    };
    config.bots.retain(|b| b.name == selected);
    for bot in &mut config.bots {
        bot.enabled = true;
    }

    tracing::info!("Starting {}: bot {}", config.service.name, selected);

    let resolver = ActionResolver::with_defaults();
    let mut service = BotService::from_config(&config, &resolver)?;

    let rt = tokio::runtime::Runtime::new().map_err(|e| BotError::Internal(e.to_string()))?;
    rt.block_on(async {
        service.start(|_| Arc::new(ConsoleTransport::new()) as Arc<dyn Transport>);

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Interrupted, shutting down");
                    service.stop().await;
                    break;
                }
                next = service.join_next() => match next {
                    Some(report) => log_report(&report),
                    None => break,
                },
            }
        }
    });
    shutdown_runtime(rt);

    Ok(())
}

fn shutdown_runtime(rt: tokio::runtime::Runtime) {
    rt.shutdown_timeout(SHUTDOWN_GRACE);
}

fn list_commands(config_path: &str) -> Result<(), BotError> {
    let config = load_config(config_path);
    let resolver = ActionResolver::with_defaults();

    for bot in &config.bots {
        let status = if bot.enabled { "" } else { " (disabled)" };
        println!("{}{}", bot.name, status);
        for action_config in bot.enabled_actions() {
            let action = resolver.resolve(action_config)?;
            println!("  {}", action.name());
            for command in action.list_commands() {
                println!("    {:<12} {}", command.name, command.description);
            }
        }
    }
    Ok(())
}

fn init_config(config_path: &str, force: bool) -> Result<(), BotError> {
    if Path::new(config_path).exists() && !force {
        return Err(BotError::Internal(format!(
            "{} already exists, use --force to overwrite",
            config_path
        )));
    }

    let yaml = Config::default().to_yaml()?;
    std::fs::write(config_path, yaml)
        .map_err(|e| BotError::Internal(format!("Failed to write {}: {}", config_path, e)))?;
    println!("Wrote default config to {}", config_path);
    Ok(())
}
