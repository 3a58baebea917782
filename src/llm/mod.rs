//! Language-model completion

pub mod client;

use async_trait::async_trait;
pub use client::CompletionClient;

use crate::errors::Result;
use crate::models::ChatMessage;

/// A hosted chat-completion model
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Generate the assistant reply for `messages`
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;
}
