//! CLI command handlers module
//!
//! This module is organized by functional domains:
//! - serve: Chat server
//! - chat: Terminal chat loop and one-shot questions
//! - profile: Customer profile cache
//! - history: Conversation log inspection
//! - info: Configuration display

pub mod chat;
pub mod history;
pub mod info;
pub mod profile;
pub mod serve;

// Re-export all public handlers
pub use chat::*;
pub use history::*;
pub use info::*;
pub use profile::*;
pub use serve::*;
