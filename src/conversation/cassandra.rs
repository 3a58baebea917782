//! Conversation log stored in a CQL table
//!
//! One partition per customer (`user_id uuid`), clustered by `timestamp`.
//! The session is opened on first use so a server can start while the
//! cluster is unreachable; failed opens are retried on the next call.

use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use openssl::ssl::SslContext;
use openssl::ssl::SslContextBuilder;
use openssl::ssl::SslMethod;
use openssl::ssl::SslVerifyMode;
use scylla::execution_profile::ExecutionProfile;
use scylla::frame::value::CqlTimestamp;
use scylla::load_balancing::DefaultPolicy;
use scylla::Session;
use scylla::SessionBuilder;
use tokio::sync::OnceCell;
use tracing::info;
use uuid::Uuid;

use super::ConversationLog;
use crate::config::CassandraConfig;
use crate::errors::Result;
use crate::errors::ShopChatError;
use crate::models::ConversationTurn;

type TurnRow = (CqlTimestamp, Option<String>, Option<String>);

pub struct CassandraConversationLog {
    config: CassandraConfig,
    timeout: Duration,
    session: OnceCell<Session>,
}

impl CassandraConversationLog {
    pub fn new(config: &CassandraConfig, timeout: Duration) -> Self {
        Self {
            config: config.clone(),
            timeout,
            session: OnceCell::new(),
        }
    }

    async fn session(&self) -> Result<&Session> {
        self.session.get_or_try_init(|| self.open()).await
    }

    async fn open(&self) -> Result<Session> {
        let policy = DefaultPolicy::builder()
            .prefer_datacenter(self.config.datacenter.clone())
            .token_aware(true)
            .build();
        let profile = ExecutionProfile::builder()
            .load_balancing_policy(policy)
            .request_timeout(Some(self.timeout))
            .build();

        let mut builder = SessionBuilder::new()
            .known_nodes(self.config.known_nodes())
            .connection_timeout(self.timeout)
            .default_execution_profile_handle(profile.into_handle());
        if !self.config.username.is_empty() {
            builder = builder.user(&self.config.username, &self.config.password);
        }
        if let Some(ca_path) = &self.config.ca_cert_path {
            builder = builder.ssl_context(Some(tls_context(ca_path)?));
        }

        let session = tokio::time::timeout(self.timeout, builder.build())
            .await
            .map_err(|_| {
                log_error(format!("Cassandra connect timed out after {:?}", self.timeout))
            })?
            .map_err(|e| log_error(format!("Cassandra connect failed: {e}")))?;

        session
            .query(self.create_table_cql(), ())
            .await
            .map_err(|e| log_error(format!("Cassandra schema setup failed: {e}")))?;

        info!(
            "Connected to Cassandra ({} nodes, dc={}), logging to {}.{}",
            self.config.known_nodes().len(),
            self.config.datacenter,
            self.config.keyspace,
            self.config.table
        );
        Ok(session)
    }

    fn table(&self) -> String {
        format!("{}.{}", self.config.keyspace, self.config.table)
    }

    fn create_table_cql(&self) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {} (user_id uuid, timestamp timestamp, message text, \
             response text, PRIMARY KEY (user_id, timestamp))",
            self.table()
        )
    }

    fn insert_cql(&self) -> String {
        format!(
            "INSERT INTO {} (user_id, timestamp, message, response) VALUES (?, ?, ?, ?)",
            self.table()
        )
    }

    fn select_recent_cql(&self) -> String {
        format!(
            "SELECT timestamp, message, response FROM {} WHERE user_id = ? \
             ORDER BY timestamp DESC LIMIT ?",
            self.table()
        )
    }
}

#[async_trait]
impl ConversationLog for CassandraConversationLog {
    async fn append(&self, turn: &ConversationTurn) -> Result<()> {
        let user_id = partition_key(&turn.customer_id)?;
        let session = self.session().await?;
        session
            .query(
                self.insert_cql(),
                (
                    user_id,
                    CqlTimestamp(turn.timestamp.timestamp_millis()),
                    turn.user_message.as_str(),
                    turn.bot_message.as_str(),
                ),
            )
            .await
            .map_err(|e| log_error(format!("Cassandra insert failed: {e}")))?;
        Ok(())
    }

    async fn recent(&self, customer_id: &str, limit: usize) -> Result<Vec<ConversationTurn>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let user_id = partition_key(customer_id)?;
        let limit = i32::try_from(limit).unwrap_or(i32::MAX);

        let session = self.session().await?;
        let rows = session
            .query(self.select_recent_cql(), (user_id, limit))
            .await
            .map_err(|e| log_error(format!("Cassandra select failed: {e}")))?
            .rows_typed::<TurnRow>()
            .map_err(|e| log_error(format!("Cassandra select returned no rows: {e}")))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| log_error(format!("Unreadable conversation row: {e}")))?;

        Ok(turns_oldest_first(customer_id, rows))
    }
}

fn log_error(message: String) -> ShopChatError {
    ShopChatError::ConversationLogError(message)
}

/// The table is partitioned by UUID, so customer ids must be UUIDs
fn partition_key(customer_id: &str) -> Result<Uuid> {
    Uuid::parse_str(customer_id).map_err(|e| {
        log_error(format!(
            "Customer id {customer_id:?} is not a UUID and cannot key the Cassandra log: {e}"
        ))
    })
}

fn tls_context(ca_path: &str) -> Result<SslContext> {
    let mut builder = SslContextBuilder::new(SslMethod::tls())
        .map_err(|e| log_error(format!("TLS setup failed: {e}")))?;
    builder
        .set_ca_file(ca_path)
        .map_err(|e| log_error(format!("Cannot load CA bundle {ca_path}: {e}")))?;
    builder.set_verify(SslVerifyMode::PEER);
    Ok(builder.build())
}

/// Rows arrive newest first; turn ids are not stored in the table
fn turns_oldest_first(customer_id: &str, rows: Vec<TurnRow>) -> Vec<ConversationTurn> {
    rows.into_iter()
        .rev()
        .filter_map(|(timestamp, message, response)| {
            Some(ConversationTurn {
                id: Uuid::nil(),
                customer_id: customer_id.to_string(),
                timestamp: DateTime::from_timestamp_millis(timestamp.0)?,
                user_message: message.unwrap_or_default(),
                bot_message: response.unwrap_or_default(),
            })
        })
        .collect()
}
