//! Customer profile cache
//!
//! Profiles are JSON documents stored under the customer id, written by the
//! import tooling (or `shopchat profile set`) and only read by the chat flow.

pub mod redis_client;

use async_trait::async_trait;
pub use redis_client::RedisClient;
use tracing::debug;

use crate::errors::Result;
use crate::errors::ShopChatError;
use crate::models::CustomerProfile;

#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// `Ok(None)` when no profile is cached for `customer_id`
    async fn load(&self, customer_id: &str) -> Result<Option<CustomerProfile>>;
}

/// Decode a cached profile value
pub fn parse_profile(customer_id: &str, raw: &str) -> Result<CustomerProfile> {
    serde_json::from_str(raw)
        .map_err(|e| ShopChatError::ProfileParse(customer_id.to_string(), e.to_string()))
}

pub struct RedisProfileStore {
    redis: RedisClient,
}

impl RedisProfileStore {
    pub const fn new(redis: RedisClient) -> Self {
        Self { redis }
    }

    /// Write a profile in the format the chat flow reads
    pub async fn store(&self, customer_id: &str, profile: &CustomerProfile) -> Result<()> {
        let json = serde_json::to_string(profile)?;
        self.redis.set_string(customer_id, &json).await
    }
}

#[async_trait]
impl ProfileStore for RedisProfileStore {
    async fn load(&self, customer_id: &str) -> Result<Option<CustomerProfile>> {
        let Some(raw) = self.redis.get_string(customer_id).await? else {
            debug!("No cached profile for {}", customer_id);
            return Ok(None);
        };
        parse_profile(customer_id, &raw).map(Some)
    }
}
