//! OpenSearch k-NN client over the REST `_search` API

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use serde_json::Map;
use serde_json::Value;
use tracing::debug;
use tracing::warn;
use url::Url;

use super::ProductIndex;
use crate::config::AppConfig;
use crate::config::SearchConfig;
use crate::errors::Result;
use crate::errors::ShopChatError;
use crate::models::ProductMatch;

pub struct OpenSearchIndex {
    search_url: Url,
    credentials: Option<(String, Option<String>)>,
    vector_field: String,
    size: usize,
    k: usize,
    client: Client,
}

#[derive(Deserialize)]
struct SearchResponse {
    hits: HitsEnvelope,
}

#[derive(Deserialize)]
struct HitsEnvelope {
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Deserialize)]
struct Hit {
    #[serde(rename = "_score")]
    score: Option<f32>,
    #[serde(rename = "_source")]
    source: Value,
}

impl OpenSearchIndex {
    /// Create a client for `{uri}/{index}/_search`
    ///
    /// Credentials embedded in the URI are sent as basic auth.
    pub fn new(config: &SearchConfig, timeout: std::time::Duration) -> Result<Self> {
        let mut base = Url::parse(&config.uri)
            .map_err(|e| ShopChatError::ConfigError(format!("Invalid search URI: {e}")))?;

        let credentials = if base.username().is_empty() {
            None
        } else {
            let user = base.username().to_string();
            let password = base.password().map(ToString::to_string);
            let _ = base.set_username("");
            let _ = base.set_password(None);
            Some((user, password))
        };

        let search_url = Url::parse(&format!(
            "{}/{}/_search",
            base.as_str().trim_end_matches('/'),
            config.index
        ))
        .map_err(|e| ShopChatError::ConfigError(format!("Invalid search index URL: {e}")))?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ShopChatError::HttpError(e.to_string()))?;

        Ok(Self {
            search_url,
            credentials,
            vector_field: config.vector_field.clone(),
            size: config.size,
            k: config.k,
            client,
        })
    }

    pub fn from_app_config(config: &AppConfig) -> Result<Self> {
        Self::new(&config.search, config.request_timeout())
    }

    /// Body of the k-NN `_search` request
    fn query_body(&self, vector: &[f32]) -> Value {
        let mut field = Map::new();
        field.insert(
            self.vector_field.clone(),
            json!({ "vector": vector, "k": self.k }),
        );
        json!({
            "size": self.size,
            "query": { "knn": Value::Object(field) }
        })
    }
}

#[async_trait]
impl ProductIndex for OpenSearchIndex {
    async fn nearest(&self, vector: &[f32]) -> Result<Vec<ProductMatch>> {
        debug!(
            "k-NN search on {} (size {}, k {})",
            self.search_url, self.size, self.k
        );

        let mut request = self.client.post(self.search_url.clone()).json(&self.query_body(vector));
        if let Some((user, password)) = &self.credentials {
            request = request.basic_auth(user, password.as_ref());
        }

        let response = request
            .send()
            .await
            .map_err(|e| ShopChatError::SearchError(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ShopChatError::SearchError(format!(
                "OpenSearch error ({status}): {error_text}"
            )));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| ShopChatError::SearchError(format!("Failed to parse response: {e}")))?;

        let products = parsed
            .hits
            .hits
            .into_iter()
            .filter_map(|hit| match serde_json::from_value::<ProductMatch>(hit.source) {
                Ok(mut product) => {
                    product.score = hit.score;
                    Some(product)
                }
                Err(e) => {
                    warn!("Skipping malformed product hit: {}", e);
                    None
                }
            })
            .collect::<Vec<_>>();

        debug!("Retrieved {} products", products.len());
        Ok(products)
    }
}
