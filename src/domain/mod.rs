//! Domain layer - The action-dispatch kernel's core types
//! 
//! This layer contains:
//! - Entities: Commands, registries, results and wire messages
//! - Traits: Abstractions for actions, emitters and transports

pub mod entities;
pub mod traits;
