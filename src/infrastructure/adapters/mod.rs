//! Transport adapters

pub mod console;
pub mod loopback;

pub use console::ConsoleTransport;
pub use loopback::{LoopbackHandle, LoopbackTransport};
