//! Logging configuration for shopchat

use std::path::Path;

use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::{self};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Registry;

use crate::config::LoggingConfig;
use crate::Result;

const LOG_FILE_PREFIX: &str = "shopchat.log";

/// Build the filter for a level, letting `RUST_LOG` win when set
fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{level},shopchat={level},tower_http={level}")))
}

/// Initialize logging with configuration
///
/// Console output goes to stderr; when `file_output` is set a daily rolling
/// file is written under `directory` as well.
pub fn init_logging_with_config(config: &LoggingConfig) -> Result<()> {
    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr);

    if !config.file_output {
        Registry::default()
            .with(env_filter(&config.level))
            .with(console_layer)
            .try_init()
            .map_err(|e| crate::ShopChatError::Custom(format!("Logging init failed: {e}")))?;

        tracing::info!("Logging initialized with level: {} - console output", config.level);
        return Ok(());
    }

    // Create logs directory if it doesn't exist
    let logs_dir = Path::new(&config.directory);
    if !logs_dir.exists() {
        std::fs::create_dir_all(logs_dir)?;
    }

    let file_appender = tracing_appender::rolling::daily(logs_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(non_blocking)
        .with_ansi(false); // No colors in file

    Registry::default()
        .with(env_filter(&config.level))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| crate::ShopChatError::Custom(format!("Logging init failed: {e}")))?;

    tracing::info!(
        "Logging initialized with level: {} - console and file output enabled",
        config.level
    );
    tracing::info!(
        "Log files will be saved to: {}/{}.YYYY-MM-DD",
        config.directory,
        LOG_FILE_PREFIX
    );

    // The writer must outlive main; the process exits with it
    std::mem::forget(guard);

    Ok(())
}

/// Initialize logging with custom log level, console only
pub fn init_logging_with_level(level: &str) -> Result<()> {
    init_logging_with_config(&LoggingConfig {
        level: level.to_string(),
        directory: String::new(),
        file_output: false,
    })
}
