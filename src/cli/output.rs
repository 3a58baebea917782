//! CLI output formatting utilities

use crate::config::AppConfig;
use crate::models::ConversationTurn;
use crate::models::CustomerProfile;

/// Safely truncate a string at character boundary (not byte boundary)
#[must_use]
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{truncated}...")
    } else {
        s.to_string()
    }
}

/// Print the effective configuration with secrets masked
pub fn print_config(config: &AppConfig) {
    let config = config.redacted();

    println!("📋 shopchat Configuration:");
    println!();

    println!("🌐 Server:");
    println!("  Address: {}:{}", config.server.host, config.server.port);
    println!("  CORS: {}", config.server.enable_cors);
    println!();

    println!("📝 Logging:");
    println!("  Level: {}", config.logging.level);
    println!("  File output: {}", config.logging.file_output);
    println!();

    println!("🤖 OpenAI:");
    println!("  Base URL: {}", config.openai_base_url());
    println!("  API key: {}", config.openai.api_key);
    println!("  Embedding model: {}", config.embedding_model());
    println!("  Completion model: {}", config.completion_model());
    println!();

    println!("🔎 Search:");
    println!("  URI: {}", config.search.uri);
    println!("  Index: {} (field: {})", config.search.index, config.search.vector_field);
    println!("  size={} k={}", config.search.size, config.search.k);
    println!();

    println!("🗃️  Redis:");
    println!("  URI: {}", config.redis.uri);
    println!();

    println!("🧩 Pipeline:");
    println!("  Mode: {}", config.pipeline.mode);
    println!("  Retrieval: {}", config.pipeline.retrieval);
    println!("  Personalization: {}", config.pipeline.personalization);
    println!("  Conversation log: {}", config.pipeline.conversation_log);
    println!("  History turns: {}", config.pipeline.history_turns);
    println!("  Customer: {}", config.customer_id());
    println!();

    println!("💬 Conversation log:");
    println!("  Backend: {:?}", config.conversation_log.backend);
    println!("  Max turns: {}", config.conversation_log.max_turns);
}

pub fn print_profile(customer_id: &str, profile: &CustomerProfile) {
    println!("👤 Profile for {customer_id}");
    println!("  Name: {}", profile.name);
    println!("  Email: {}", profile.email.as_deref().unwrap_or("N/A"));
    println!("  Past transactions: {}", profile.transactions_summary());
}

pub fn print_history(turns: &[ConversationTurn]) {
    println!("Found {} turns:", turns.len());
    for turn in turns {
        println!(
            "  [{}] User: {}",
            turn.timestamp.format("%Y-%m-%d %H:%M:%S"),
            truncate_str(&turn.user_message, 80)
        );
        println!("        Bot:  {}", truncate_str(&turn.bot_message, 80));
    }
}

pub fn print_info(msg: &str) {
    println!("ℹ️  {msg}");
}

pub fn print_success(msg: &str) {
    println!("✅ {msg}");
}

pub fn print_warning(msg: &str) {
    println!("⚠️  {msg}");
}

pub fn print_error(msg: &str) {
    eprintln!("❌ {msg}");
}
