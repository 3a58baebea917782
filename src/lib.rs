pub mod api;
pub mod cache;
pub mod cli;
pub mod client;
pub mod config;
pub mod conversation;
pub mod embeddings;
pub mod errors;
pub mod llm;
pub mod logging;
pub mod models;
pub mod rag;
pub mod search;
pub mod services;


pub use config::AppConfig;
pub use errors::*;
