//! CLI command handlers module
//!
//! This module is organized by functional domains:
//! - ask: One-shot chat turns from the terminal
//! - serve: API server
//! - info: Information display (examples, config)

pub mod ask;
pub mod info;
pub mod serve;

// Re-export all public handlers
pub use ask::*;
pub use info::*;
pub use serve::*;
