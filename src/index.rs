//! Index construction: chunk → embed → persist, and reopening.
//!
//! [`build_index`] is the create-or-append path used by both the
//! offline build and mid-session uploads; [`load_retriever`] is the
//! soft-failing reopen path used at session start.

use std::sync::Arc;

use tracing::info;

use crate::chunking::Chunker;
use crate::config::AppConfig;
use crate::document::Document;
use crate::embedding::EmbeddingProvider;
use crate::error::{DocChatError, Result};
use crate::localstore::LocalVectorStore;
use crate::retriever::Retriever;
use crate::vectorstore::VectorStore;

/// The result of an indexing run.
pub struct IndexReport {
    /// A retriever bound to the updated store.
    pub retriever: Retriever,
    /// Number of chunks appended by this run.
    pub chunks_added: usize,
    /// Total entries in the store after this run.
    pub total_entries: usize,
}

/// Chunk, embed, and persist documents into the store at
/// `config.store_dir`, appending to any existing collection.
///
/// # Errors
///
/// - [`DocChatError::Index`] if chunking non-empty input yields zero
///   chunks — the caller must not proceed with an empty index build.
/// - Embedding and store failures propagate unchanged; there is no
///   partial-embedding fallback.
pub async fn build_index(
    documents: &[Document],
    chunker: &dyn Chunker,
    embedder: Arc<dyn EmbeddingProvider>,
    config: &AppConfig,
) -> Result<IndexReport> {
    let mut chunks: Vec<_> = documents.iter().flat_map(|doc| chunker.chunk(doc)).collect();
    if chunks.is_empty() {
        return Err(DocChatError::Index(
            "document chunking produced zero chunks; nothing to index".into(),
        ));
    }
    info!(documents = documents.len(), chunks = chunks.len(), "split documents into chunks");

    let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
    let embeddings = embedder.embed_batch(&texts).await?;
    for (chunk, embedding) in chunks.iter_mut().zip(embeddings) {
        chunk.embedding = embedding;
    }

    let store =
        LocalVectorStore::open_or_create(&config.store_dir, &config.collection, embedder.as_ref())
            .await?;
    store.add(&chunks).await?;
    let total_entries = store.count().await?;

    info!(
        store = %config.store_dir.display(),
        added = chunks.len(),
        total = total_entries,
        "index updated"
    );

    let store: Arc<dyn VectorStore> = Arc::new(store);
    Ok(IndexReport {
        retriever: Retriever::new(store, embedder, config.top_k),
        chunks_added: chunks.len(),
        total_entries,
    })
}

/// Reopen a previously built index.
///
/// Returns `Ok(None)` when no usable collection exists at the configured
/// location — a valid "knowledge base empty" state, not an error. The
/// supplied embedder must match the one recorded at creation; a mismatch
/// is a hard error.
pub async fn load_retriever(
    config: &AppConfig,
    embedder: Arc<dyn EmbeddingProvider>,
) -> Result<Option<Retriever>> {
    let store =
        LocalVectorStore::open_existing(&config.store_dir, &config.collection, embedder.as_ref())
            .await?;
    Ok(store.map(|store| {
        let store: Arc<dyn VectorStore> = Arc::new(store);
        Retriever::new(store, embedder, config.top_k)
    }))
}
