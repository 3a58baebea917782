use std::fmt;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// Embedding vector; dimensionality is fixed by the embedding model
pub type EmbeddingVector = Vec<f32>;

/// Body of `POST /chat`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// Whether the client's transcript already shows earlier turns
    #[serde(rename = "context", default)]
    pub has_prior_context: bool,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>, has_prior_context: bool) -> Self {
        Self {
            message: message.into(),
            has_prior_context,
        }
    }
}

/// Successful response of `POST /chat`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    #[serde(rename = "botMessage")]
    pub bot_message: String,
}

/// A product returned by the k-NN lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductMatch {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

/// One entry of a customer's purchase history
///
/// Profiles written by the import scripts store plain strings; anything else
/// is kept as raw JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionRecord(pub serde_json::Value);

impl fmt::Display for TransactionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            serde_json::Value::String(s) => f.write_str(s),
            other => write!(f, "{other}"),
        }
    }
}

/// Cached customer profile, read-only in the chat flow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerProfile {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub past_transactions: Vec<TransactionRecord>,
}

impl CustomerProfile {
    /// Past transactions joined for prompt interpolation
    #[must_use]
    pub fn transactions_summary(&self) -> String {
        if self.past_transactions.is_empty() {
            return "none".to_string();
        }
        self.past_transactions
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// One completed exchange, appended to the conversation log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub customer_id: String,
    pub timestamp: DateTime<Utc>,
    pub user_message: String,
    pub bot_message: String,
}

impl ConversationTurn {
    pub fn now(
        customer_id: impl Into<String>,
        user_message: impl Into<String>,
        bot_message: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            customer_id: customer_id.into(),
            timestamp: Utc::now(),
            user_message: user_message.into(),
            bot_message: bot_message.into(),
        }
    }
}

/// Chat message role understood by the completion API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// Message sent to the completion service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}
