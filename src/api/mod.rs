//! HTTP API serving the chat page and the `/chat` endpoint

pub mod handlers;
pub mod routes;
pub mod server;
pub mod types;

pub use server::build_app;
pub use server::serve_api;
