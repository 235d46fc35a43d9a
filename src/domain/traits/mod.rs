//! Domain traits - Abstractions the kernel depends on

pub mod action;
pub mod emitter;
pub mod transport;

pub use action::Action;
pub use emitter::Emitter;
pub use transport::{Connection, Transport};
