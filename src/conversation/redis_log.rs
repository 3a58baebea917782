use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use super::ConversationLog;
use crate::cache::RedisClient;
use crate::config::ConversationLogConfig;
use crate::errors::Result;
use crate::errors::ShopChatError;
use crate::models::ConversationTurn;

/// Conversation log kept as one JSON-per-entry Redis list per customer
pub struct RedisConversationLog {
    redis: RedisClient,
    key_prefix: String,
    ttl: Option<Duration>,
    max_turns: usize,
}

impl RedisConversationLog {
    pub fn new(redis: RedisClient, config: &ConversationLogConfig) -> Self {
        Self {
            redis,
            key_prefix: config.key_prefix.clone(),
            ttl: (config.ttl_secs > 0).then(|| Duration::from_secs(config.ttl_secs)),
            max_turns: config.max_turns,
        }
    }

    fn list_key(&self, customer_id: &str) -> String {
        format!("{}{}", self.key_prefix, customer_id)
    }
}

#[async_trait]
impl ConversationLog for RedisConversationLog {
    async fn append(&self, turn: &ConversationTurn) -> Result<()> {
        let json = serde_json::to_string(turn)?;
        self.redis
            .push_capped(&self.list_key(&turn.customer_id), &json, self.max_turns, self.ttl)
            .await
            .map_err(|e| ShopChatError::ConversationLogError(e.to_string()))
    }

    async fn recent(&self, customer_id: &str, limit: usize) -> Result<Vec<ConversationTurn>> {
        let raw = self
            .redis
            .tail(&self.list_key(customer_id), limit)
            .await
            .map_err(|e| ShopChatError::ConversationLogError(e.to_string()))?;

        Ok(raw
            .iter()
            .filter_map(|entry| match serde_json::from_str::<ConversationTurn>(entry) {
                Ok(turn) => Some(turn),
                Err(e) => {
                    warn!("Skipping unreadable conversation entry: {}", e);
                    None
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RedisConfig;

    #[test]
    fn test_list_key_and_ttl_from_config() {
        let redis = RedisClient::connect(&RedisConfig::default(), Duration::from_secs(5)).unwrap();
        let config = ConversationLogConfig {
            ttl_secs: 300,
            ..ConversationLogConfig::default()
        };
        let log = RedisConversationLog::new(redis, &config);
        assert_eq!(log.list_key("abc"), "conversations:abc");
        assert_eq!(log.ttl, Some(Duration::from_secs(300)));
    }

    #[test]
    fn test_zero_ttl_keeps_entries() {
        let redis = RedisClient::connect(&RedisConfig::default(), Duration::from_secs(5)).unwrap();
        let log = RedisConversationLog::new(redis, &ConversationLogConfig::default());
        assert!(log.ttl.is_none());
    }

    #[tokio::test]
    #[ignore = "Requires a running Redis at redis://127.0.0.1:6379"]
    async fn test_append_and_read_back() {
        let redis = RedisClient::connect(&RedisConfig::default(), Duration::from_secs(5)).unwrap();
        let config = ConversationLogConfig {
            key_prefix: format!("shopchat-test:{}:", uuid::Uuid::new_v4()),
            ttl_secs: 60,
            ..ConversationLogConfig::default()
        };
        let log = RedisConversationLog::new(redis, &config);

        log.append(&ConversationTurn::now("c-1", "q1", "a1")).await.unwrap();
        log.append(&ConversationTurn::now("c-1", "q2", "a2")).await.unwrap();

        let recent = log.recent("c-1", 1).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].user_message, "q2");
    }
}
