//! Durable vector store persisted to a local directory.
//!
//! One named collection lives in `<dir>/<collection>.json` as a serde
//! snapshot of every entry plus the embedding-model identity used at
//! creation. Appends rewrite the snapshot through a temp-file rename,
//! so a crash mid-write leaves the previous snapshot intact. The store
//! assumes a single writer; concurrent index mutation from multiple
//! processes is unsupported.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::document::{Chunk, ScoredChunk};
use crate::embedding::EmbeddingProvider;
use crate::error::{DocChatError, Result};
use crate::vectorstore::{VectorStore, cosine_similarity, rank};

/// On-disk snapshot of a collection.
#[derive(Debug, Serialize, Deserialize)]
struct CollectionSnapshot {
    /// Embedding model that produced every vector in `chunks`.
    embedding_model: String,
    /// Dimensionality of every vector in `chunks`.
    dimensions: usize,
    /// The entries, in insertion order.
    chunks: Vec<Chunk>,
}

fn store_err(message: impl Into<String>) -> DocChatError {
    DocChatError::VectorStore { backend: "local".into(), message: message.into() }
}

/// A durable, append-only vector store at a fixed directory location.
///
/// Create one with [`open_or_create`](LocalVectorStore::open_or_create)
/// when indexing, or [`open_existing`](LocalVectorStore::open_existing)
/// when only previously indexed data should be served.
#[derive(Debug)]
pub struct LocalVectorStore {
    path: PathBuf,
    embedding_model: String,
    dimensions: usize,
    chunks: RwLock<Vec<Chunk>>,
}

impl LocalVectorStore {
    fn snapshot_path(dir: &Path, collection: &str) -> PathBuf {
        dir.join(format!("{collection}.json"))
    }

    /// Open the collection at `dir`, creating the directory and an empty
    /// collection if none exists yet.
    ///
    /// # Errors
    ///
    /// Fails if the directory cannot be created, an existing snapshot is
    /// unreadable, or the snapshot was built with a different embedding
    /// model than `embedder`.
    pub async fn open_or_create(
        dir: &Path,
        collection: &str,
        embedder: &dyn EmbeddingProvider,
    ) -> Result<Self> {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| store_err(format!("failed to create {}: {e}", dir.display())))?;

        let path = Self::snapshot_path(dir, collection);
        let chunks = match Self::load_snapshot(&path, embedder).await? {
            Some(snapshot) => snapshot.chunks,
            None => Vec::new(),
        };

        info!(path = %path.display(), entries = chunks.len(), "opened local vector store");
        Ok(Self {
            path,
            embedding_model: embedder.model_id().to_string(),
            dimensions: embedder.dimensions(),
            chunks: RwLock::new(chunks),
        })
    }

    /// Open an existing, non-empty collection.
    ///
    /// Returns `Ok(None)` when the directory or snapshot does not exist,
    /// or the collection is empty — the "not ready yet" state. A
    /// snapshot built with a different embedding model is a hard error.
    pub async fn open_existing(
        dir: &Path,
        collection: &str,
        embedder: &dyn EmbeddingProvider,
    ) -> Result<Option<Self>> {
        let path = Self::snapshot_path(dir, collection);
        let Some(snapshot) = Self::load_snapshot(&path, embedder).await? else {
            warn!(path = %path.display(), "no persisted vector store found");
            return Ok(None);
        };
        if snapshot.chunks.is_empty() {
            warn!(path = %path.display(), "persisted vector store is empty");
            return Ok(None);
        }

        info!(path = %path.display(), entries = snapshot.chunks.len(), "loaded vector store");
        Ok(Some(Self {
            path,
            embedding_model: snapshot.embedding_model,
            dimensions: snapshot.dimensions,
            chunks: RwLock::new(snapshot.chunks),
        }))
    }

    /// Read and validate a snapshot file. `Ok(None)` if it doesn't exist.
    async fn load_snapshot(
        path: &Path,
        embedder: &dyn EmbeddingProvider,
    ) -> Result<Option<CollectionSnapshot>> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(store_err(format!("failed to read {}: {e}", path.display()))),
        };

        let snapshot: CollectionSnapshot = serde_json::from_slice(&bytes)
            .map_err(|e| store_err(format!("corrupt snapshot {}: {e}", path.display())))?;

        if snapshot.embedding_model != embedder.model_id()
            || snapshot.dimensions != embedder.dimensions()
        {
            return Err(store_err(format!(
                "collection was built with embedding model '{}' ({} dims) but '{}' ({} dims) \
                 was supplied; re-index or switch models",
                snapshot.embedding_model,
                snapshot.dimensions,
                embedder.model_id(),
                embedder.dimensions(),
            )));
        }
        Ok(Some(snapshot))
    }

    /// Write the snapshot atomically: serialize to a temp file in the
    /// same directory, then rename over the previous snapshot.
    async fn persist(&self, chunks: &[Chunk]) -> Result<()> {
        let snapshot = CollectionSnapshot {
            embedding_model: self.embedding_model.clone(),
            dimensions: self.dimensions,
            chunks: chunks.to_vec(),
        };
        let bytes = serde_json::to_vec(&snapshot)
            .map_err(|e| store_err(format!("failed to serialize snapshot: {e}")))?;

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|e| store_err(format!("failed to write {}: {e}", tmp.display())))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| store_err(format!("failed to replace {}: {e}", self.path.display())))?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl VectorStore for LocalVectorStore {
    async fn add(&self, new_chunks: &[Chunk]) -> Result<()> {
        for chunk in new_chunks {
            if chunk.embedding.len() != self.dimensions {
                return Err(store_err(format!(
                    "chunk '{}' has a {}-dimensional embedding, expected {}",
                    chunk.id,
                    chunk.embedding.len(),
                    self.dimensions,
                )));
            }
        }

        let mut chunks = self.chunks.write().await;
        chunks.extend_from_slice(new_chunks);
        self.persist(&chunks).await?;
        info!(added = new_chunks.len(), total = chunks.len(), "appended chunks to store");
        Ok(())
    }

    async fn search(&self, embedding: &[f32], top_k: usize) -> Result<Vec<ScoredChunk>> {
        let chunks = self.chunks.read().await;
        let scored = chunks
            .iter()
            .map(|chunk| ScoredChunk {
                score: cosine_similarity(&chunk.embedding, embedding),
                chunk: chunk.clone(),
            })
            .collect();
        Ok(rank(scored, top_k))
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.chunks.read().await.len())
    }
}
