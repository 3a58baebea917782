//! Append-only conversation log
//!
//! Every completed exchange is appended as a [`ConversationTurn`]. Writes are
//! dispatched off the response path by [`dispatch_append`]; recent turns can
//! be read back to replay session history into the prompt.

#[cfg(feature = "cassandra")]
pub mod cassandra;
pub mod memory;
pub mod redis_log;

use std::sync::Arc;

use async_trait::async_trait;
#[cfg(feature = "cassandra")]
pub use cassandra::CassandraConversationLog;
pub use memory::MemoryConversationLog;
pub use redis_log::RedisConversationLog;
use tokio::task::JoinHandle;
use tracing::debug;
use tracing::warn;

use crate::errors::Result;
use crate::models::ConversationTurn;

#[async_trait]
pub trait ConversationLog: Send + Sync {
    async fn append(&self, turn: &ConversationTurn) -> Result<()>;

    /// Up to `limit` most recent turns for `customer_id`, oldest first
    async fn recent(&self, customer_id: &str, limit: usize) -> Result<Vec<ConversationTurn>>;
}

/// Append `turn` on a detached task
///
/// The caller never waits on the write; failures are only logged.
pub fn dispatch_append(log: Arc<dyn ConversationLog>, turn: ConversationTurn) -> JoinHandle<()> {
    tokio::spawn(async move {
        match log.append(&turn).await {
            Ok(()) => debug!("Logged conversation turn for {}", turn.customer_id),
            Err(e) => warn!(
                customer_id = %turn.customer_id,
                "Failed to write conversation turn: {}", e
            ),
        }
    })
}
