use std::future::Future;
use std::time::Duration;

use redis::AsyncCommands;

use crate::config::RedisConfig;

/// Thin async wrapper around a Redis client with key namespacing
///
/// Every command, including the connection handshake, is bounded by the
/// client's timeout and surfaces as a `CacheError` when it expires.
#[derive(Clone)]
pub struct RedisClient {
    client: redis::Client,
    namespace: String,
    timeout: Duration,
}

impl RedisClient {
    /// Parse the URI; no connection is made until the first command
    pub fn connect(config: &RedisConfig, timeout: Duration) -> crate::Result<Self> {
        let client = redis::Client::open(config.uri.as_str())
            .map_err(|e| crate::ShopChatError::CacheError(format!("Redis open error: {e}")))?;

        Ok(Self {
            client,
            namespace: config.namespace.clone(),
            timeout,
        })
    }

    fn key(&self, k: &str) -> String {
        format!("{}{}", self.namespace, k)
    }

    async fn bounded<T, F>(&self, op: &str, fut: F) -> crate::Result<T>
    where
        F: Future<Output = redis::RedisResult<T>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => {
                result.map_err(|e| crate::ShopChatError::CacheError(format!("Redis {op} error: {e}")))
            }
            Err(_) => Err(crate::ShopChatError::CacheError(format!(
                "Redis {op} timed out after {:?}",
                self.timeout
            ))),
        }
    }

    async fn connection(&self) -> crate::Result<redis::aio::MultiplexedConnection> {
        self.bounded("connect", self.client.get_multiplexed_tokio_connection())
            .await
    }

    pub async fn get_string(&self, key: &str) -> crate::Result<Option<String>> {
        let k = self.key(key);
        let mut conn = self.connection().await?;
        self.bounded("GET", conn.get::<_, Option<String>>(k)).await
    }

    pub async fn set_string(&self, key: &str, value: &str) -> crate::Result<()> {
        let k = self.key(key);
        let mut conn = self.connection().await?;
        self.bounded("SET", conn.set::<_, _, ()>(k, value)).await
    }

    /// Append to a list and refresh its expiry
    ///
    /// With `max_len > 0` only the newest `max_len` entries are kept; 0 keeps
    /// every entry.
    pub async fn push_capped(
        &self,
        key: &str,
        value: &str,
        max_len: usize,
        ttl: Option<Duration>,
    ) -> crate::Result<()> {
        let k = self.key(key);
        let mut conn = self.connection().await?;
        let mut pipe = redis::pipe();
        pipe.atomic().rpush(&k, value).ignore();
        if max_len > 0 {
            pipe.ltrim(&k, -(max_len as isize), -1).ignore();
        }
        if let Some(ttl) = ttl {
            pipe.expire(&k, ttl.as_secs() as i64).ignore();
        }
        self.bounded("RPUSH", pipe.query_async::<_, ()>(&mut conn))
            .await
    }

    /// Last `count` entries of a list, oldest first
    pub async fn tail(&self, key: &str, count: usize) -> crate::Result<Vec<String>> {
        if count == 0 {
            return Ok(Vec::new());
        }
        let k = self.key(key);
        let mut conn = self.connection().await?;
        self.bounded(
            "LRANGE",
            conn.lrange::<_, Vec<String>>(k, -(count as isize), -1),
        )
        .await
    }
}
