//! Infrastructure layer - External concerns
//! 
//! This layer contains:
//! - Config: Configuration loading
//! - Adapters: Transport implementations (loopback, console)

pub mod adapters;
pub mod config;
