//! Construction of the long-lived service handles
//!
//! Built once at startup and shared read-only by every request.

use std::sync::Arc;

use tracing::info;
use tracing::warn;

use crate::cache::ProfileStore;
use crate::cache::RedisClient;
use crate::cache::RedisProfileStore;
use crate::config::AppConfig;
use crate::config::LogBackend;
use crate::conversation::ConversationLog;
use crate::conversation::MemoryConversationLog;
use crate::conversation::RedisConversationLog;
use crate::embeddings::EmbeddingClient;
use crate::llm::CompletionClient;
use crate::rag::ChatPipeline;
use crate::rag::PipelineOptions;
use crate::search::OpenSearchIndex;
use crate::Result;

pub struct ServiceContainer {
    pub pipeline: Arc<ChatPipeline>,
    pub profiles: Arc<dyn ProfileStore>,
    pub conversation_log: Arc<dyn ConversationLog>,
}

impl ServiceContainer {
    /// Create every client from configuration; no network calls are made here
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let redis = RedisClient::connect(&config.redis, config.request_timeout())?;
        let profiles: Arc<dyn ProfileStore> = Arc::new(RedisProfileStore::new(redis.clone()));

        let conversation_log = conversation_log_from_config(config, redis)?;

        if config.pipeline.history_turns > 0 {
            warn!(
                "pipeline.history_turns={} replays the log of customer {}, which every session shares",
                config.pipeline.history_turns,
                config.customer_id()
            );
        }

        let pipeline = ChatPipeline::new(
            Arc::new(EmbeddingClient::from_app_config(config)?),
            Arc::new(OpenSearchIndex::from_app_config(config)?),
            Arc::new(CompletionClient::from_app_config(config)?),
            PipelineOptions::from_app_config(config),
        )
        .with_profile_store(profiles.clone())
        .with_conversation_log(conversation_log.clone());

        info!(
            "Chat pipeline ready: mode={}, retrieval={}, personalization={}, log={:?}",
            config.pipeline.mode,
            config.pipeline.retrieval,
            config.pipeline.personalization,
            config.conversation_log.backend
        );

        Ok(Self {
            pipeline: Arc::new(pipeline),
            profiles,
            conversation_log,
        })
    }
}

/// Build the configured conversation log backend
pub fn conversation_log_from_config(
    config: &AppConfig,
    redis: RedisClient,
) -> Result<Arc<dyn ConversationLog>> {
    let log: Arc<dyn ConversationLog> = match config.conversation_log.backend {
        LogBackend::Redis => Arc::new(RedisConversationLog::new(redis, &config.conversation_log)),
        LogBackend::Memory => Arc::new(MemoryConversationLog::with_max_turns(
            config.conversation_log.max_turns,
        )),
        #[cfg(feature = "cassandra")]
        LogBackend::Cassandra => Arc::new(crate::conversation::CassandraConversationLog::new(
            &config.cassandra,
            config.request_timeout(),
        )),
        #[cfg(not(feature = "cassandra"))]
        LogBackend::Cassandra => {
            return Err(crate::ShopChatError::ConfigError(
                "conversation_log.backend = \"cassandra\" needs a build with --features cassandra"
                    .to_string(),
            ))
        }
    };
    Ok(log)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_builds_without_network() {
        let mut config = AppConfig::default();
        config.openai.api_key = "sk-test".to_string();
        config.conversation_log.backend = LogBackend::Memory;

        let services = ServiceContainer::from_config(&config).unwrap();
        assert_eq!(services.pipeline.options().customer_id, config.customer.id);
    }

    #[test]
    fn test_container_rejects_bad_search_uri() {
        let mut config = AppConfig::default();
        config.search.uri = "::not a uri::".to_string();
        assert!(ServiceContainer::from_config(&config).is_err());
    }

    #[cfg(not(feature = "cassandra"))]
    #[test]
    fn test_cassandra_backend_needs_feature() {
        let mut config = AppConfig::default();
        config.openai.api_key = "sk-test".to_string();
        config.conversation_log.backend = LogBackend::Cassandra;

        let err = ServiceContainer::from_config(&config).err().unwrap();
        assert!(err.to_string().contains("--features cassandra"));
    }

    #[cfg(feature = "cassandra")]
    #[test]
    fn test_cassandra_backend_connects_lazily() {
        let mut config = AppConfig::default();
        config.openai.api_key = "sk-test".to_string();
        config.conversation_log.backend = LogBackend::Cassandra;
        config.cassandra.contact_points = vec!["127.0.0.1:1".to_string()];

        assert!(ServiceContainer::from_config(&config).is_ok());
    }
}
