//! Chat pipeline: Embed -> Retrieve -> Personalize -> Prompt -> Complete -> Log

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::cache::ProfileStore;
use crate::config::AppConfig;
use crate::config::PipelineMode;
use crate::conversation::dispatch_append;
use crate::conversation::ConversationLog;
use crate::embeddings::Embedder;
use crate::errors::Result;
use crate::llm::ChatCompletion;
use crate::models::ChatRequest;
use crate::models::ChatResponse;
use crate::models::ConversationTurn;
use crate::models::CustomerProfile;
use crate::rag::prompts;
use crate::rag::ProductContext;
use crate::search::ProductIndex;

/// Stage switches and fixed inputs of the pipeline
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub mode: PipelineMode,
    pub retrieval: bool,
    pub personalization: bool,
    pub conversation_log: bool,
    pub history_turns: usize,
    pub customer_id: String,
}

impl PipelineOptions {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            mode: config.pipeline.mode,
            retrieval: config.pipeline.retrieval,
            personalization: config.pipeline.personalization,
            conversation_log: config.pipeline.conversation_log,
            history_turns: config.pipeline.history_turns,
            customer_id: config.customer_id().to_string(),
        }
    }

    /// Retrieval runs only in RAG mode with the stage enabled
    #[must_use]
    pub fn retrieval_enabled(&self) -> bool {
        self.mode == PipelineMode::Rag && self.retrieval
    }

    #[must_use]
    pub fn personalization_enabled(&self) -> bool {
        self.mode == PipelineMode::Rag && self.personalization
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self::from_app_config(&AppConfig::default())
    }
}

/// Result of one pipeline run
pub struct ChatOutcome {
    pub response: ChatResponse,
    /// Products carried into the prompt (0, 1 or 2)
    pub products_used: usize,
    pub personalized: bool,
    pub history_turns: usize,
    /// Detached log write, if one was dispatched
    pub log_task: Option<JoinHandle<()>>,
}

/// Request orchestrator shared by all concurrent `/chat` requests
pub struct ChatPipeline {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn ProductIndex>,
    completion: Arc<dyn ChatCompletion>,
    profiles: Option<Arc<dyn ProfileStore>>,
    log: Option<Arc<dyn ConversationLog>>,
    options: PipelineOptions,
}

impl ChatPipeline {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn ProductIndex>,
        completion: Arc<dyn ChatCompletion>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            embedder,
            index,
            completion,
            profiles: None,
            log: None,
            options,
        }
    }

    #[must_use]
    pub fn with_profile_store(mut self, profiles: Arc<dyn ProfileStore>) -> Self {
        self.profiles = Some(profiles);
        self
    }

    #[must_use]
    pub fn with_conversation_log(mut self, log: Arc<dyn ConversationLog>) -> Self {
        self.log = Some(log);
        self
    }

    #[must_use]
    pub const fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Answer one chat request
    ///
    /// # Errors
    /// - Embedding, product search or completion failures
    pub async fn respond(&self, request: &ChatRequest) -> Result<ChatResponse> {
        Ok(self.run(request).await?.response)
    }

    /// Run the pipeline and report what each stage contributed
    ///
    /// Profile, history and log failures degrade instead of failing the request.
    pub async fn run(&self, request: &ChatRequest) -> Result<ChatOutcome> {
        info!(
            "Processing chat message ({} chars, prior context: {}, mode: {})",
            request.message.chars().count(),
            request.has_prior_context,
            self.options.mode
        );

        // Step 1 + 2: embed and retrieve
        let products = if self.options.retrieval_enabled() {
            debug!("Step 1: Embedding user message");
            let vector = self.embedder.embed(&request.message).await?;

            debug!("Step 2: Retrieving nearest products");
            let matches = self.index.nearest(&vector).await?;
            if matches.len() < 2 {
                warn!("Product search returned only {} hit(s)", matches.len());
            }
            Some(ProductContext::from_matches(matches))
        } else {
            None
        };

        // Step 3: profile
        let profile = if self.options.personalization_enabled() {
            debug!("Step 3: Loading customer profile");
            self.load_profile().await
        } else {
            None
        };

        let history = self.load_history(request.has_prior_context).await;

        // Step 4: prompt
        debug!("Step 4: Assembling prompt");
        let messages = match self.options.mode {
            PipelineMode::Rag => prompts::build_rag_messages(
                &request.message,
                products.as_ref(),
                profile.as_ref(),
                &history,
                request.has_prior_context,
            ),
            PipelineMode::Plain => prompts::build_plain_messages(&request.message, &history),
        };

        // Step 5: completion
        debug!("Step 5: Requesting completion ({} messages)", messages.len());
        let bot_message = self.completion.complete(&messages).await?;

        // Step 6: best-effort log
        let log_task = match (&self.log, self.options.conversation_log) {
            (Some(log), true) => Some(dispatch_append(
                log.clone(),
                ConversationTurn::now(
                    self.options.customer_id.clone(),
                    request.message.clone(),
                    bot_message.clone(),
                ),
            )),
            _ => None,
        };

        info!("Chat message answered");

        Ok(ChatOutcome {
            response: ChatResponse { bot_message },
            products_used: products.as_ref().map_or(0, ProductContext::len),
            personalized: profile.is_some(),
            history_turns: history.len(),
            log_task,
        })
    }

    async fn load_profile(&self) -> Option<CustomerProfile> {
        let store = self.profiles.as_ref()?;
        match store.load(&self.options.customer_id).await {
            Ok(Some(profile)) => Some(profile),
            Ok(None) => {
                warn!(
                    "No cached profile for customer {}; continuing without personalization",
                    self.options.customer_id
                );
                None
            }
            Err(e) => {
                warn!("Profile lookup failed ({}); continuing without personalization", e);
                None
            }
        }
    }

    async fn load_history(&self, has_prior_context: bool) -> Vec<ConversationTurn> {
        if !has_prior_context || self.options.history_turns == 0 {
            return Vec::new();
        }
        let Some(log) = &self.log else {
            return Vec::new();
        };
        match log
            .recent(&self.options.customer_id, self.options.history_turns)
            .await
        {
            Ok(turns) => turns,
            Err(e) => {
                warn!("Could not load conversation history: {}", e);
                Vec::new()
            }
        }
    }
}
