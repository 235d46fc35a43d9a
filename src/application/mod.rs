//! Application layer - Use cases and business logic
//! 
//! This layer contains:
//! - Actions: The command router and the resolver that builds actions
//! - Messaging: Dispatching, emitting and the per-bot client
//! - Services: Running one client per configured bot
//! - Errors: Action, transport and configuration errors

pub mod actions;
pub mod errors;
pub mod messaging;
pub mod services;
