//! Application services - Running bots

pub mod bot_service;

pub use bot_service::{log_report, BotService, ClientReport};
