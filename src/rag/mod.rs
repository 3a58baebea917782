//! RAG (Retrieval-Augmented Generation) module
//!
//! This module answers customer chat messages:
//! - Semantic retrieval of the nearest products for the message
//! - Optional personalization from the cached customer profile
//! - Prompt assembly (system, user, assistant-context messages)
//! - LLM-based answer generation and best-effort conversation logging
//!
//! # Examples
//!
//! ```rust,no_run
//! use shopchat::config::AppConfig;
//! use shopchat::models::ChatRequest;
//! use shopchat::services::ServiceContainer;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let services = ServiceContainer::from_config(&config)?;
//!
//!     let reply = services
//!         .pipeline
//!         .respond(&ChatRequest::new("Which trail shoes do you have?", false))
//!         .await?;
//!     println!("Answer: {}", reply.bot_message);
//!
//!     Ok(())
//! }
//! ```

pub mod context;
pub mod pipeline;
pub mod prompts;

pub use context::ProductContext;
pub use pipeline::ChatOutcome;
pub use pipeline::ChatPipeline;
pub use pipeline::PipelineOptions;

#[cfg(test)]
mod pipeline_tests;
