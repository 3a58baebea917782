use std::path::Path;

use serde::Deserialize;
use serde::Serialize;
use url::Url;

/// Environment prefix for layered overrides, e.g. `SHOPCHAT__OPENAI__API_KEY`
pub const ENV_PREFIX: &str = "SHOPCHAT";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            enable_cors: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub directory: String,
    pub file_output: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: "logs".to_string(),
            file_output: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub embedding_model: String,
    pub completion_model: String,
    /// Sampling temperature; provider default when unset
    pub temperature: Option<f32>,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_openai_base_url(),
            embedding_model: "text-embedding-3-small".to_string(),
            completion_model: "gpt-3.5-turbo".to_string(),
            temperature: None,
        }
    }
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub uri: String,
    pub index: String,
    pub vector_field: String,
    /// Number of hits returned by the search request
    pub size: usize,
    /// Number of neighbours considered by the k-NN query
    pub k: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            uri: "http://localhost:9200".to_string(),
            index: "products".to_string(),
            vector_field: "embedding".to_string(),
            size: 2,
            k: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
    pub uri: String,
    pub namespace: String,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            uri: "redis://127.0.0.1:6379".to_string(),
            namespace: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomerConfig {
    pub id: String,
}

impl Default for CustomerConfig {
    fn default() -> Self {
        Self {
            id: "551dfc94-764a-4839-b8db-e6f04b5715c6".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineMode {
    /// Embed, retrieve products, personalize, then complete
    Rag,
    /// Send the raw message to the completion service with the static prompt
    Plain,
}

impl std::fmt::Display for PipelineMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rag => write!(f, "rag"),
            Self::Plain => write!(f, "plain"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub mode: PipelineMode,
    pub retrieval: bool,
    pub personalization: bool,
    pub conversation_log: bool,
    /// Recent turns replayed when the client reports prior context (0 disables)
    pub history_turns: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            mode: PipelineMode::Rag,
            retrieval: true,
            personalization: true,
            conversation_log: true,
            history_turns: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogBackend {
    Redis,
    Memory,
    /// CQL table; needs the `cassandra` cargo feature
    Cassandra,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationLogConfig {
    pub backend: LogBackend,
    pub key_prefix: String,
    /// Expiry applied to a customer's log after each append (0 keeps it forever)
    pub ttl_secs: u64,
    /// Turns kept per customer by the Redis and memory backends; 0 never trims
    pub max_turns: usize,
}

impl Default for ConversationLogConfig {
    fn default() -> Self {
        Self {
            backend: LogBackend::Redis,
            key_prefix: "conversations:".to_string(),
            ttl_secs: 0,
            max_turns: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CassandraConfig {
    /// `host` or `host:port`; `port` is appended when missing
    pub contact_points: Vec<String>,
    pub port: u16,
    /// Local datacenter preferred by the load balancing policy
    pub datacenter: String,
    pub username: String,
    pub password: String,
    /// PEM bundle used to verify the cluster; TLS is off when unset
    pub ca_cert_path: Option<String>,
    pub keyspace: String,
    pub table: String,
}

impl Default for CassandraConfig {
    fn default() -> Self {
        Self {
            contact_points: vec!["127.0.0.1".to_string()],
            port: 9042,
            datacenter: "datacenter1".to_string(),
            username: String::new(),
            password: String::new(),
            ca_cert_path: None,
            keyspace: "customers".to_string(),
            table: "conversations".to_string(),
        }
    }
}

impl CassandraConfig {
    /// Contact points with the default port filled in
    pub fn known_nodes(&self) -> Vec<String> {
        self.contact_points
            .iter()
            .map(|point| point.trim())
            .filter(|point| !point.is_empty())
            .map(|point| {
                if point.contains(':') {
                    point.to_string()
                } else {
                    format!("{point}:{}", self.port)
                }
            })
            .collect()
    }
}

/// Parse `CASSANDRA_CLUSTERS`: a JSON array of hosts, or a comma separated list
fn parse_contact_points(raw: &str) -> Vec<String> {
    serde_json::from_str::<Vec<String>>(raw).unwrap_or_else(|_| {
        raw.split(',')
            .map(|host| host.trim().to_string())
            .filter(|host| !host.is_empty())
            .collect()
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-call timeout for every upstream HTTP request
    pub request_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub openai: OpenAiConfig,
    pub search: SearchConfig,
    pub redis: RedisConfig,
    pub customer: CustomerConfig,
    pub pipeline: PipelineConfig,
    pub conversation_log: ConversationLogConfig,
    pub cassandra: CassandraConfig,
    pub http: HttpConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file, then apply environment overrides
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(crate::ShopChatError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Config file not found: {}", path.display()),
            )));
        }
        Self::layered(Some(path))
    }

    /// Load configuration from the default config file path
    pub fn load() -> crate::Result<Self> {
        // Try to load from config.toml first, then fall back to config.example.toml
        if Path::new("config.toml").exists() {
            Self::from_file("config.toml")
        } else if Path::new("config.example.toml").exists() {
            tracing::warn!(
                "Using config.example.toml. Please create config.toml for production use."
            );
            Self::from_file("config.example.toml")
        } else {
            Self::layered(None)
        }
    }

    fn layered(path: Option<&Path>) -> crate::Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(
                config::File::from(path)
                    .format(config::FileFormat::Toml)
                    .required(true),
            );
        }
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        let mut config: AppConfig = builder.build()?.try_deserialize()?;
        config.apply_legacy_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Apply the variable names used by the legacy deployment's `.env` file
    pub fn apply_legacy_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("MY_OPENAI_API_KEY").filter(|v| !v.is_empty()) {
            self.openai.api_key = key;
        }
        if let Some(uri) = lookup("OPENSEARCH_URI").filter(|v| !v.is_empty()) {
            self.search.uri = uri;
        }
        if let Some(uri) = lookup("REDIS_URI").filter(|v| !v.is_empty()) {
            self.redis.uri = uri;
        }
        if let Some(clusters) = lookup("CASSANDRA_CLUSTERS").filter(|v| !v.is_empty()) {
            self.cassandra.contact_points = parse_contact_points(&clusters);
        }
        if let Some(user) = lookup("CASSANDRA_USER").filter(|v| !v.is_empty()) {
            self.cassandra.username = user;
        }
        if let Some(password) = lookup("CASSANDRA_PWD").filter(|v| !v.is_empty()) {
            self.cassandra.password = password;
        }
        if let Some(path) = lookup("SSL_CERTFILE").filter(|v| !v.is_empty()) {
            self.cassandra.ca_cert_path = Some(path);
        }
    }

    /// Check the settings a running server depends on
    pub fn validate(&self) -> crate::Result<()> {
        if self.openai.api_key.trim().is_empty() {
            return Err(crate::ShopChatError::ConfigError(
                "openai.api_key is empty (set MY_OPENAI_API_KEY or SHOPCHAT__OPENAI__API_KEY)"
                    .to_string(),
            ));
        }

        for (name, value) in [
            ("openai.base_url", &self.openai.base_url),
            ("search.uri", &self.search.uri),
            ("redis.uri", &self.redis.uri),
        ] {
            Url::parse(value).map_err(|e| {
                crate::ShopChatError::ConfigError(format!("{name} is not a valid URL: {e}"))
            })?;
        }

        if self.search.size == 0 || self.search.k == 0 {
            return Err(crate::ShopChatError::ConfigError(
                "search.size and search.k must be at least 1".to_string(),
            ));
        }

        if self.customer.id.trim().is_empty() {
            return Err(crate::ShopChatError::ConfigError(
                "customer.id is empty".to_string(),
            ));
        }

        if self.http.request_timeout_secs == 0 {
            return Err(crate::ShopChatError::ConfigError(
                "http.request_timeout_secs must be at least 1".to_string(),
            ));
        }

        if self.conversation_log.backend == LogBackend::Cassandra {
            if self.cassandra.known_nodes().is_empty() {
                return Err(crate::ShopChatError::ConfigError(
                    "cassandra.contact_points is empty (set CASSANDRA_CLUSTERS)".to_string(),
                ));
            }
            if self.cassandra.datacenter.trim().is_empty() {
                return Err(crate::ShopChatError::ConfigError(
                    "cassandra.datacenter is empty".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Copy of the configuration safe to print: API key and passwords masked
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if !copy.openai.api_key.is_empty() {
            copy.openai.api_key = mask_secret(&copy.openai.api_key);
        }
        copy.search.uri = mask_url_password(&copy.search.uri);
        copy.redis.uri = mask_url_password(&copy.redis.uri);
        if !copy.cassandra.password.is_empty() {
            copy.cassandra.password = "****".to_string();
        }
        copy
    }

    /// Get OpenAI-compatible API base URL
    pub fn openai_base_url(&self) -> &str {
        self.openai.base_url.trim_end_matches('/')
    }

    /// Get embedding model name
    pub fn embedding_model(&self) -> &str {
        &self.openai.embedding_model
    }

    /// Get completion model name
    pub fn completion_model(&self) -> &str {
        &self.openai.completion_model
    }

    /// Get the customer key used for profile lookup and logging
    pub fn customer_id(&self) -> &str {
        &self.customer.id
    }

    /// Get per-call HTTP timeout
    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.http.request_timeout_secs)
    }
}

fn mask_secret(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    format!("{visible}****")
}

fn mask_url_password(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(mut url) if url.password().is_some() => {
            let _ = url.set_password(Some("****"));
            url.to_string()
        }
        _ => raw.to_string(),
    }
}
