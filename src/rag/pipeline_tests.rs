//! Pipeline tests with in-process fakes for every external service

use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::cache::ProfileStore;
use crate::config::PipelineMode;
use crate::conversation::ConversationLog;
use crate::conversation::MemoryConversationLog;
use crate::embeddings::Embedder;
use crate::errors::Result;
use crate::errors::ShopChatError;
use crate::llm::ChatCompletion;
use crate::models::ChatMessage;
use crate::models::ChatRequest;
use crate::models::ConversationTurn;
use crate::models::CustomerProfile;
use crate::models::EmbeddingVector;
use crate::models::ProductMatch;
use crate::models::Role;
use crate::rag::ChatPipeline;
use crate::rag::PipelineOptions;
use crate::search::ProductIndex;

#[derive(Default)]
struct FakeEmbedder {
    calls: AtomicUsize,
    fail: bool,
}

#[async_trait]
impl Embedder for FakeEmbedder {
    async fn embed(&self, _text: &str) -> Result<EmbeddingVector> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ShopChatError::EmbeddingError("unavailable".to_string()));
        }
        Ok(vec![0.1, 0.2, 0.3])
    }
}

struct FakeIndex {
    hits: Vec<ProductMatch>,
    fail: bool,
}

impl FakeIndex {
    fn with(hits: Vec<ProductMatch>) -> Self {
        Self { hits, fail: false }
    }
}

#[async_trait]
impl ProductIndex for FakeIndex {
    async fn nearest(&self, _vector: &[f32]) -> Result<Vec<ProductMatch>> {
        if self.fail {
            return Err(ShopChatError::SearchError("index red".to_string()));
        }
        Ok(self.hits.clone())
    }
}

struct FakeCompletion {
    reply: Option<String>,
    seen: Mutex<Vec<Vec<ChatMessage>>>,
}

impl FakeCompletion {
    fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            seen: Mutex::new(Vec::new()),
        }
    }

    fn failing() -> Self {
        Self {
            reply: None,
            seen: Mutex::new(Vec::new()),
        }
    }

    fn last_messages(&self) -> Vec<ChatMessage> {
        self.seen.lock().unwrap().last().cloned().unwrap_or_default()
    }

    fn call_count(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatCompletion for FakeCompletion {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        self.seen.lock().unwrap().push(messages.to_vec());
        self.reply
            .clone()
            .ok_or_else(|| ShopChatError::CompletionError("provider down".to_string()))
    }
}

enum ProfileBehavior {
    Found(CustomerProfile),
    Missing,
    Broken,
}

struct FakeProfiles(ProfileBehavior);

#[async_trait]
impl ProfileStore for FakeProfiles {
    async fn load(&self, customer_id: &str) -> Result<Option<CustomerProfile>> {
        match &self.0 {
            ProfileBehavior::Found(profile) => Ok(Some(profile.clone())),
            ProfileBehavior::Missing => Ok(None),
            ProfileBehavior::Broken => Err(ShopChatError::ProfileParse(
                customer_id.to_string(),
                "expected value at line 1".to_string(),
            )),
        }
    }
}

struct FailingLog;

#[async_trait]
impl ConversationLog for FailingLog {
    async fn append(&self, _turn: &ConversationTurn) -> Result<()> {
        Err(ShopChatError::ConversationLogError("connection reset".to_string()))
    }

    async fn recent(&self, _customer_id: &str, _limit: usize) -> Result<Vec<ConversationTurn>> {
        Err(ShopChatError::ConversationLogError("connection reset".to_string()))
    }
}

fn product(name: &str, price: f64) -> ProductMatch {
    ProductMatch {
        name: name.to_string(),
        description: format!("{name} description"),
        price,
        score: None,
    }
}

fn two_hits() -> Vec<ProductMatch> {
    vec![product("A", 10.0), product("B", 20.0)]
}

fn options() -> PipelineOptions {
    PipelineOptions {
        customer_id: "customer-1".to_string(),
        ..PipelineOptions::default()
    }
}

fn charles() -> CustomerProfile {
    serde_json::from_str(r#"{"name":"Charles","past_transactions":["PMRS123"]}"#).unwrap()
}

struct Harness {
    embedder: Arc<FakeEmbedder>,
    completion: Arc<FakeCompletion>,
    pipeline: ChatPipeline,
}

fn harness(hits: Vec<ProductMatch>, completion: FakeCompletion, options: PipelineOptions) -> Harness {
    let embedder = Arc::new(FakeEmbedder::default());
    let completion = Arc::new(completion);
    let pipeline = ChatPipeline::new(
        embedder.clone(),
        Arc::new(FakeIndex::with(hits)),
        completion.clone(),
        options,
    );
    Harness {
        embedder,
        completion,
        pipeline,
    }
}

#[tokio::test]
async fn test_round_trip_returns_completion_text() {
    let h = harness(two_hits(), FakeCompletion::replying("Hello!"), options());

    let outcome = h.pipeline.run(&ChatRequest::new("shoes?", false)).await.unwrap();

    assert_eq!(outcome.response.bot_message, "Hello!");
    assert_eq!(outcome.products_used, 2);
    assert_eq!(h.embedder.calls.load(Ordering::SeqCst), 1);

    let messages = h.completion.last_messages();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[1], ChatMessage::user("shoes?"));
    assert!(messages[2].content.contains("Top product name: A"));
    assert!(messages[2].content.contains("Next product price: 20"));
}

#[tokio::test]
async fn test_zero_hits_do_not_crash() {
    let h = harness(Vec::new(), FakeCompletion::replying("Tell me more"), options());

    let outcome = h.pipeline.run(&ChatRequest::new("?", false)).await.unwrap();

    assert_eq!(outcome.products_used, 0);
    assert_eq!(outcome.response.bot_message, "Tell me more");
    assert!(h.completion.last_messages()[2]
        .content
        .contains("did not return any matching products"));
}

#[tokio::test]
async fn test_single_hit_does_not_crash() {
    let h = harness(vec![product("A", 10.0)], FakeCompletion::replying("ok"), options());

    let outcome = h.pipeline.run(&ChatRequest::new("?", false)).await.unwrap();

    assert_eq!(outcome.products_used, 1);
    assert!(!h.completion.last_messages()[2].content.contains("Next product"));
}

#[tokio::test]
async fn test_profile_personalizes_system_prompt() {
    let h = harness(two_hits(), FakeCompletion::replying("ok"), options());
    let pipeline = h
        .pipeline
        .with_profile_store(Arc::new(FakeProfiles(ProfileBehavior::Found(charles()))));

    let outcome = pipeline.run(&ChatRequest::new("hi", false)).await.unwrap();

    assert!(outcome.personalized);
    let system = &h.completion.last_messages()[0];
    assert_eq!(system.role, Role::System);
    assert!(system.content.contains("Customer name: Charles"));
}

#[tokio::test]
async fn test_missing_profile_degrades() {
    let h = harness(two_hits(), FakeCompletion::replying("still here"), options());
    let pipeline = h
        .pipeline
        .with_profile_store(Arc::new(FakeProfiles(ProfileBehavior::Missing)));

    let outcome = pipeline.run(&ChatRequest::new("hi", false)).await.unwrap();

    assert!(!outcome.personalized);
    assert_eq!(outcome.response.bot_message, "still here");
}

#[tokio::test]
async fn test_invalid_profile_json_degrades() {
    let h = harness(two_hits(), FakeCompletion::replying("still here"), options());
    let pipeline = h
        .pipeline
        .with_profile_store(Arc::new(FakeProfiles(ProfileBehavior::Broken)));

    let outcome = pipeline.run(&ChatRequest::new("hi", false)).await.unwrap();

    assert!(!outcome.personalized);
    assert!(!h.completion.last_messages()[0].content.contains("Customer name"));
}

#[tokio::test]
async fn test_successful_turn_is_logged() {
    let log = Arc::new(MemoryConversationLog::default());
    let h = harness(two_hits(), FakeCompletion::replying("Hello!"), options());
    let pipeline = h.pipeline.with_conversation_log(log.clone());

    let outcome = pipeline.run(&ChatRequest::new("shoes?", false)).await.unwrap();
    outcome.log_task.expect("log task dispatched").await.unwrap();

    let turns = log.recent("customer-1", 10).await.unwrap();
    assert_eq!(turns.len(), 1);
    assert_eq!(turns[0].user_message, "shoes?");
    assert_eq!(turns[0].bot_message, "Hello!");
}

#[tokio::test]
async fn test_log_failure_never_alters_response() {
    let h = harness(two_hits(), FakeCompletion::replying("Hello!"), options());
    let pipeline = h.pipeline.with_conversation_log(Arc::new(FailingLog));

    let outcome = pipeline.run(&ChatRequest::new("shoes?", true)).await.unwrap();
    assert_eq!(outcome.response.bot_message, "Hello!");
    outcome.log_task.expect("log task dispatched").await.unwrap();
}

#[tokio::test]
async fn test_log_stage_can_be_disabled() {
    let log = Arc::new(MemoryConversationLog::default());
    let h = harness(
        two_hits(),
        FakeCompletion::replying("ok"),
        PipelineOptions {
            conversation_log: false,
            ..options()
        },
    );
    let pipeline = h.pipeline.with_conversation_log(log.clone());

    let outcome = pipeline.run(&ChatRequest::new("hi", false)).await.unwrap();
    assert!(outcome.log_task.is_none());
    assert!(log.is_empty());
}

#[tokio::test]
async fn test_embedding_failure_aborts_before_completion() {
    let completion = Arc::new(FakeCompletion::replying("unused"));
    let pipeline = ChatPipeline::new(
        Arc::new(FakeEmbedder {
            fail: true,
            ..FakeEmbedder::default()
        }),
        Arc::new(FakeIndex::with(two_hits())),
        completion.clone(),
        options(),
    );

    let err = pipeline.run(&ChatRequest::new("hi", false)).await.err().unwrap();
    assert!(matches!(err, ShopChatError::EmbeddingError(_)));
    assert_eq!(completion.call_count(), 0);
}

#[tokio::test]
async fn test_search_failure_aborts() {
    let pipeline = ChatPipeline::new(
        Arc::new(FakeEmbedder::default()),
        Arc::new(FakeIndex {
            hits: Vec::new(),
            fail: true,
        }),
        Arc::new(FakeCompletion::replying("unused")),
        options(),
    );

    let err = pipeline.respond(&ChatRequest::new("hi", false)).await.unwrap_err();
    assert!(matches!(err, ShopChatError::SearchError(_)));
}

#[tokio::test]
async fn test_completion_failure_aborts_without_logging() {
    let log = Arc::new(MemoryConversationLog::default());
    let h = harness(two_hits(), FakeCompletion::failing(), options());
    let pipeline = h.pipeline.with_conversation_log(log.clone());

    let err = pipeline.respond(&ChatRequest::new("hi", false)).await.unwrap_err();
    assert!(matches!(err, ShopChatError::CompletionError(_)));
    assert!(log.is_empty());
}

#[tokio::test]
async fn test_plain_mode_skips_retrieval_and_profile() {
    let h = harness(
        two_hits(),
        FakeCompletion::replying("plain"),
        PipelineOptions {
            mode: PipelineMode::Plain,
            ..options()
        },
    );
    let pipeline = h
        .pipeline
        .with_profile_store(Arc::new(FakeProfiles(ProfileBehavior::Found(charles()))));

    let outcome = pipeline.run(&ChatRequest::new("hi", false)).await.unwrap();

    assert_eq!(outcome.response.bot_message, "plain");
    assert_eq!(outcome.products_used, 0);
    assert!(!outcome.personalized);
    assert_eq!(h.embedder.calls.load(Ordering::SeqCst), 0);
    let messages = h.completion.last_messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1], ChatMessage::user("hi"));
}

#[tokio::test]
async fn test_retrieval_stage_can_be_disabled() {
    let h = harness(
        two_hits(),
        FakeCompletion::replying("ok"),
        PipelineOptions {
            retrieval: false,
            ..options()
        },
    );

    let outcome = h.pipeline.run(&ChatRequest::new("hi", false)).await.unwrap();

    assert_eq!(outcome.products_used, 0);
    assert_eq!(h.embedder.calls.load(Ordering::SeqCst), 0);
    assert!(!h.completion.last_messages()[2].content.contains("product"));
}

#[tokio::test]
async fn test_history_replayed_only_with_prior_context() {
    let log = Arc::new(MemoryConversationLog::default());
    log.append(&ConversationTurn::now("customer-1", "earlier question", "earlier answer"))
        .await
        .unwrap();

    let h = harness(
        two_hits(),
        FakeCompletion::replying("ok"),
        PipelineOptions {
            history_turns: 3,
            conversation_log: false,
            ..options()
        },
    );
    let pipeline = h.pipeline.with_conversation_log(log.clone());

    let first = pipeline.run(&ChatRequest::new("new session", false)).await.unwrap();
    assert_eq!(first.history_turns, 0);
    assert_eq!(h.completion.last_messages().len(), 3);

    let follow_up = pipeline.run(&ChatRequest::new("and socks?", true)).await.unwrap();
    assert_eq!(follow_up.history_turns, 1);
    let messages = h.completion.last_messages();
    assert_eq!(messages.len(), 5);
    assert_eq!(messages[1], ChatMessage::user("earlier question"));
    assert_eq!(messages[2], ChatMessage::assistant("earlier answer"));
    assert_eq!(messages[3], ChatMessage::user("and socks?"));
}

#[tokio::test]
async fn test_history_failure_degrades() {
    let h = harness(
        two_hits(),
        FakeCompletion::replying("ok"),
        PipelineOptions {
            history_turns: 3,
            conversation_log: false,
            ..options()
        },
    );
    let pipeline = h.pipeline.with_conversation_log(Arc::new(FailingLog));

    let outcome = pipeline.run(&ChatRequest::new("more?", true)).await.unwrap();
    assert_eq!(outcome.history_turns, 0);
}

#[tokio::test]
async fn test_unresponsive_profile_cache_degrades() {
    use std::time::Duration;

    use crate::cache::RedisClient;
    use crate::cache::RedisProfileStore;
    use crate::config::RedisConfig;

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let redis = RedisClient::connect(
        &RedisConfig {
            uri: format!("redis://{addr}"),
            ..RedisConfig::default()
        },
        Duration::from_millis(200),
    )
    .unwrap();

    let h = harness(two_hits(), FakeCompletion::replying("Still here"), options());
    let pipeline = h
        .pipeline
        .with_profile_store(Arc::new(RedisProfileStore::new(redis)));

    let outcome = tokio::time::timeout(
        Duration::from_secs(5),
        pipeline.run(&ChatRequest::new("hi", false)),
    )
    .await
    .expect("profile lookup must not hang the request")
    .unwrap();

    assert_eq!(outcome.response.bot_message, "Still here");
    assert!(!outcome.personalized);
}
