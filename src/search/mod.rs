//! Product retrieval by vector similarity

pub mod opensearch;

use async_trait::async_trait;
pub use opensearch::OpenSearchIndex;

use crate::errors::Result;
use crate::models::ProductMatch;

/// A k-NN index of product embeddings
#[async_trait]
pub trait ProductIndex: Send + Sync {
    /// Nearest products to `vector`, best match first. May return fewer
    /// hits than requested, including none.
    async fn nearest(&self, vector: &[f32]) -> Result<Vec<ProductMatch>>;
}
