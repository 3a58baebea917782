//! Conversation log handlers

use crate::cache::RedisClient;
use crate::cli::output::print_history;
use crate::cli::output::print_warning;
use crate::config::LogBackend;
use crate::services::conversation_log_from_config;
use crate::AppConfig;
use crate::Result;

pub async fn handle_history_command(
    config: &AppConfig,
    customer: Option<String>,
    limit: usize,
) -> Result<()> {
    if config.conversation_log.backend == LogBackend::Memory {
        print_warning("The memory conversation log lives inside the server process; nothing to read");
        return Ok(());
    }

    let customer_id = customer.unwrap_or_else(|| config.customer_id().to_string());
    let log = conversation_log_from_config(
        config,
        RedisClient::connect(&config.redis, config.request_timeout())?,
    )?;

    let turns = log.recent(&customer_id, limit).await?;
    print_history(&turns);
    Ok(())
}
