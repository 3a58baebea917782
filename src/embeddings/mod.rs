//! Embeddings generation module
//!
//! The chat pipeline embeds every user message once, using an
//! OpenAI-compatible `/embeddings` endpoint.
//!
//! # Examples
//!
//! ```rust,no_run
//! use shopchat::config::AppConfig;
//! use shopchat::embeddings::EmbeddingClient;
//! use shopchat::embeddings::Embedder;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let client = EmbeddingClient::from_app_config(&config)?;
//!
//!     let embedding = client.embed("running shoes").await?;
//!     println!("Generated embedding with {} dimensions", embedding.len());
//!
//!     Ok(())
//! }
//! ```

pub mod client;

use async_trait::async_trait;
pub use client::EmbeddingClient;

use crate::errors::Result;
use crate::models::EmbeddingVector;

/// Dimension of `text-embedding-3-small` vectors stored in the product index
pub const DEFAULT_EMBEDDING_DIM: usize = 1536;

/// Turns text into a vector comparable with the product index
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<EmbeddingVector>;
}
