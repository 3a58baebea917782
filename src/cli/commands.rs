//! CLI command definitions and argument parsing

use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

#[derive(Parser)]
#[command(name = "shopchat")]
#[command(about = "Retrieval-augmented shopping assistant: chat server and clients")]
#[command(version)]
pub struct Cli {
    /// Path to a TOML config file (default: config.toml, then config.example.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose debug logging (default: info level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the chat server
    Serve {
        /// Host to bind to (default: from config)
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on (default: from config)
        #[arg(short, long)]
        port: Option<u16>,
        /// Enable CORS for all origins
        #[arg(long)]
        cors: bool,
    },
    /// Interactive terminal chat against a running server
    Chat {
        /// Server base URL
        #[arg(short, long, default_value = "http://localhost:3000")]
        url: String,
    },
    /// Ask a single question
    Ask {
        /// The message to send
        message: String,
        /// Send to a running server instead of answering in-process
        #[arg(short, long)]
        url: Option<String>,
        /// Mark the message as a continuation of an earlier conversation
        #[arg(long)]
        context: bool,
    },
    /// Show current configuration
    Config {
        /// Print as a TOML document instead of a summary
        #[arg(long)]
        toml: bool,
    },
    /// Customer profile cache commands
    #[command(subcommand)]
    Profile(ProfileCommands),
    /// Show recent conversation turns
    History {
        /// Customer id (default: from config)
        #[arg(long)]
        customer: Option<String>,
        /// Maximum number of turns to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
}

#[derive(Subcommand)]
pub enum ProfileCommands {
    /// Print the cached profile
    Show {
        /// Customer id (default: from config)
        #[arg(long)]
        customer: Option<String>,
    },
    /// Write a profile to the cache
    Set {
        /// Customer name
        #[arg(long)]
        name: String,
        /// Customer email
        #[arg(long)]
        email: Option<String>,
        /// Past transaction, as JSON or plain text (repeatable)
        #[arg(short, long = "transaction")]
        transactions: Vec<String>,
        /// Customer id (default: from config)
        #[arg(long)]
        customer: Option<String>,
    },
}
