//! Chat client for the `/chat` endpoint
//!
//! Mirrors the browser page: each send carries whether the transcript already
//! shows earlier turns, and a successful reply appends exactly one
//! user/assistant pair. Sends take `&mut self`, so turns land in submission
//! order. A failed send leaves the transcript untouched.

pub mod transcript;

use reqwest::Client;
pub use transcript::Transcript;
pub use transcript::TranscriptTurn;
use tracing::debug;

use crate::errors::Result;
use crate::errors::ShopChatError;
use crate::models::ChatRequest;
use crate::models::ChatResponse;

pub struct ChatClient {
    chat_url: String,
    client: Client,
    transcript: Transcript,
}

impl ChatClient {
    /// `base_url` is the server root, e.g. `http://localhost:3000`
    pub fn new(base_url: &str, timeout: std::time::Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ShopChatError::HttpError(e.to_string()))?;

        Ok(Self {
            chat_url: format!("{}/chat", base_url.trim_end_matches('/')),
            client,
            transcript: Transcript::new(),
        })
    }

    #[must_use]
    pub const fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Send one message and record the exchange
    ///
    /// # Errors
    /// - Network failures or a non-2xx status from the server
    pub async fn send(&mut self, message: &str) -> Result<&TranscriptTurn> {
        let request = ChatRequest::new(message, self.transcript.has_prior_context());
        let reply = self.post(&request).await?;
        Ok(self.transcript.push(message, reply.bot_message))
    }

    /// Post a prepared request without touching the transcript
    pub async fn post(&self, request: &ChatRequest) -> Result<ChatResponse> {
        debug!("POST {} (context: {})", self.chat_url, request.has_prior_context);

        let response = self
            .client
            .post(&self.chat_url)
            .json(request)
            .send()
            .await
            .map_err(|e| ShopChatError::HttpError(format!("chat request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ShopChatError::HttpError(format!(
                "chat server returned {status}: {body}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ShopChatError::HttpError(format!("invalid chat response: {e}")))
    }
}
