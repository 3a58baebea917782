//! Customer profile cache handlers

use crate::cache::ProfileStore;
use crate::cache::RedisClient;
use crate::cache::RedisProfileStore;
use crate::cli::output::print_profile;
use crate::cli::output::print_success;
use crate::cli::output::print_warning;
use crate::models::CustomerProfile;
use crate::models::TransactionRecord;
use crate::AppConfig;
use crate::Result;

pub async fn handle_profile_show(config: &AppConfig, customer: Option<String>) -> Result<()> {
    let customer_id = customer.unwrap_or_else(|| config.customer_id().to_string());
    let store = RedisProfileStore::new(RedisClient::connect(&config.redis, config.request_timeout())?);

    match store.load(&customer_id).await? {
        Some(profile) => print_profile(&customer_id, &profile),
        None => print_warning(&format!("No profile cached for {customer_id}")),
    }
    Ok(())
}

pub async fn handle_profile_set(
    config: &AppConfig,
    customer: Option<String>,
    name: String,
    email: Option<String>,
    transactions: Vec<String>,
) -> Result<()> {
    let customer_id = customer.unwrap_or_else(|| config.customer_id().to_string());
    let profile = CustomerProfile {
        name,
        email,
        past_transactions: transactions.iter().map(|t| parse_transaction(t)).collect(),
    };

    let store = RedisProfileStore::new(RedisClient::connect(&config.redis, config.request_timeout())?);
    store.store(&customer_id, &profile).await?;

    print_success(&format!("Profile stored for {customer_id}"));
    print_profile(&customer_id, &profile);
    Ok(())
}

/// JSON values are kept structured; anything else is stored as a string
fn parse_transaction(raw: &str) -> TransactionRecord {
    TransactionRecord(
        serde_json::from_str(raw).unwrap_or_else(|_| serde_json::Value::String(raw.to_string())),
    )
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_transaction_keeps_json() {
        let record = parse_transaction(r#"{"item":"boots","price":80}"#);
        assert_eq!(record.0, json!({"item": "boots", "price": 80}));
    }

    #[test]
    fn test_parse_transaction_plain_text() {
        let record = parse_transaction("winter boots");
        assert_eq!(record.0, json!("winter boots"));
    }
}
