use axum::http::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShopChatError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Configuration load error: {0}")]
    ConfigLoad(#[from] config::ConfigError),

    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("Embedding service error: {0}")]
    EmbeddingError(String),

    #[error("Product index error: {0}")]
    SearchError(String),

    #[error("Completion provider error: {0}")]
    CompletionError(String),

    #[error("Profile cache error: {0}")]
    CacheError(String),

    #[error("Customer profile {0} is not valid JSON: {1}")]
    ProfileParse(String, String),

    #[error("Conversation log error: {0}")]
    ConversationLogError(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialization(#[from] toml::ser::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Custom(String),
}

impl ShopChatError {
    /// True for failures of the required upstream calls (embed, search, complete)
    #[must_use]
    pub const fn is_dependency_failure(&self) -> bool {
        matches!(
            self,
            Self::EmbeddingError(_) | Self::SearchError(_) | Self::CompletionError(_)
        )
    }

    /// HTTP status reported to chat clients for this error
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        if self.is_dependency_failure() {
            StatusCode::BAD_GATEWAY
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl From<redis::RedisError> for ShopChatError {
    fn from(err: redis::RedisError) -> Self {
        Self::CacheError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ShopChatError>;
