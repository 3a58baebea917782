//! Information display handlers

use crate::cli::output::print_config;
use crate::AppConfig;
use crate::Result;

/// Print the effective configuration; secrets are always masked
pub fn handle_config_command(config: &AppConfig, as_toml: bool) -> Result<()> {
    if as_toml {
        print!("{}", render_config_toml(config)?);
    } else {
        print_config(config);
    }
    Ok(())
}

/// Redacted configuration as a TOML document that `--config` accepts
pub fn render_config_toml(config: &AppConfig) -> Result<String> {
    Ok(toml::to_string_pretty(&config.redacted())?)
}
