//! Retriever: a vector store bound to the embedding function that built it.

use std::sync::Arc;

use tracing::debug;

use crate::document::Chunk;
use crate::embedding::EmbeddingProvider;
use crate::error::Result;
use crate::vectorstore::VectorStore;

/// A query capability binding one [`VectorStore`] to one
/// [`EmbeddingProvider`] and a fixed `top_k`.
///
/// Stateless beyond those bindings: each call embeds the query text and
/// runs a top-k similarity search.
#[derive(Clone)]
pub struct Retriever {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    top_k: usize,
}

impl Retriever {
    /// Bind a store to the embedding provider that populated it.
    pub fn new(
        store: Arc<dyn VectorStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        top_k: usize,
    ) -> Self {
        Self { store, embedder, top_k }
    }

    /// Retrieve the chunks most relevant to `query`, in decreasing
    /// similarity order.
    ///
    /// # Errors
    ///
    /// Propagates embedding and store failures unchanged.
    pub async fn retrieve(&self, query: &str) -> Result<Vec<Chunk>> {
        let embedding = self.embedder.embed(query).await?;
        let results = self.store.search(&embedding, self.top_k).await?;
        debug!(query_len = query.len(), results = results.len(), "retrieved chunks");
        Ok(results.into_iter().map(|r| r.chunk).collect())
    }

    /// The store this retriever reads from.
    pub fn store(&self) -> &Arc<dyn VectorStore> {
        &self.store
    }

    /// The embedding provider bound at construction.
    pub fn embedder(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedder
    }
}
