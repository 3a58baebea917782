use clap::Parser;
use shopchat::cli::*;
use shopchat::config::AppConfig;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::load()?,
    };

    // Initialize logging
    if cli.verbose {
        shopchat::logging::init_logging_with_level("debug")?;
    } else {
        shopchat::logging::init_logging_with_config(&config.logging)?;
    }
    info!("Configuration loaded successfully");

    // Execute the requested command
    match cli.command {
        Commands::Serve { host, port, cors } => {
            handle_serve_command(&config, host, port, cors).await?;
        }
        Commands::Chat { url } => {
            handle_chat_command(&config, &url).await?;
        }
        Commands::Ask {
            message,
            url,
            context,
        } => {
            handle_ask_command(&config, message, url, context).await?;
        }
        Commands::Config { toml } => {
            handle_config_command(&config, toml)?;
        }
        Commands::Profile(ProfileCommands::Show { customer }) => {
            handle_profile_show(&config, customer).await?;
        }
        Commands::Profile(ProfileCommands::Set {
            name,
            email,
            transactions,
            customer,
        }) => {
            handle_profile_set(&config, customer, name, email, transactions).await?;
        }
        Commands::History { customer, limit } => {
            handle_history_command(&config, customer, limit).await?;
        }
    }

    Ok(())
}
