//! Terminal chat handlers

use std::io::Write;

use tokio::io::AsyncBufReadExt;
use tokio::io::BufReader;

use crate::cli::output::print_error;
use crate::cli::output::print_info;
use crate::client::ChatClient;
use crate::models::ChatRequest;
use crate::services::ServiceContainer;
use crate::AppConfig;
use crate::Result;

/// Typed on its own line to leave the chat loop
const EXIT_COMMAND: &str = "exit";

/// Read lines from stdin and send each to the server until `exit` or EOF
pub async fn handle_chat_command(config: &AppConfig, url: &str) -> Result<()> {
    let mut client = ChatClient::new(url, config.request_timeout() * 4)?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    print_info(&format!("Chatting with {url}. Type '{EXIT_COMMAND}' to quit."));

    loop {
        print!("\nYou: ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim() == EXIT_COMMAND {
            break;
        }

        match client.send(&line).await {
            Ok(turn) => println!("Assistant: {}", turn.assistant),
            Err(e) => print_error(&format!("Message not sent: {e}")),
        }
    }

    print_info(&format!(
        "Session ended after {} turns",
        client.transcript().len()
    ));
    Ok(())
}

/// Answer one message, in-process or through a running server
pub async fn handle_ask_command(
    config: &AppConfig,
    message: String,
    url: Option<String>,
    context: bool,
) -> Result<()> {
    let request = ChatRequest::new(message, context);

    let response = match url {
        Some(url) => {
            let client = ChatClient::new(&url, config.request_timeout() * 4)?;
            client.post(&request).await?
        }
        None => {
            config.validate()?;
            let services = ServiceContainer::from_config(config)?;
            let outcome = services.pipeline.run(&request).await?;
            // Wait for the log write so it is not dropped at exit
            if let Some(task) = outcome.log_task {
                let _ = task.await;
            }
            outcome.response
        }
    };

    println!("{}", response.bot_message);
    Ok(())
}
