//! Vector store behavior: search ordering, persistence, and the
//! soft-missing / hard-mismatch reopen contract.

mod common;

use common::HashEmbeddings;
use docchat::{Chunk, EmbeddingProvider, InMemoryVectorStore, LocalVectorStore, VectorStore};
use proptest::prelude::*;

fn chunk(id: &str, text: &str, source: &str, embedding: Vec<f32>) -> Chunk {
    Chunk {
        id: id.to_string(),
        text: text.to_string(),
        embedding,
        source: source.to_string(),
        page: None,
        chunk_index: 0,
        document_id: source.to_string(),
    }
}

async fn embedded_chunk(embedder: &HashEmbeddings, id: &str, text: &str, source: &str) -> Chunk {
    chunk(id, text, source, embedder.embed(text).await.unwrap())
}

// ── In-memory search ordering (property) ───────────────────────────

/// Generate a non-zero L2-normalized embedding of the given dimension.
fn arb_embedding(dim: usize) -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(-1.0f32..1.0f32, dim).prop_filter_map("non-zero embedding", |mut v| {
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm < 1e-8 {
            return None;
        }
        for val in &mut v {
            *val /= norm;
        }
        Some(v)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Search results are ordered by descending cosine score and the
    /// result count never exceeds top_k or the number of stored entries.
    #[test]
    fn search_is_ordered_and_bounded(
        embeddings in proptest::collection::vec(arb_embedding(16), 1..20),
        query in arb_embedding(16),
        top_k in 1usize..25,
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let (results, stored) = rt.block_on(async {
            let store = InMemoryVectorStore::new();
            let chunks: Vec<Chunk> = embeddings
                .into_iter()
                .enumerate()
                .map(|(i, e)| chunk(&format!("c{i}"), "text", "s.txt", e))
                .collect();
            store.add(&chunks).await.unwrap();
            (store.search(&query, top_k).await.unwrap(), chunks.len())
        });

        prop_assert!(results.len() <= top_k);
        prop_assert!(results.len() <= stored);
        for window in results.windows(2) {
            prop_assert!(
                window[0].score >= window[1].score,
                "results not in descending order: {} < {}",
                window[0].score,
                window[1].score,
            );
        }
    }
}

// ── Local store persistence ────────────────────────────────────────

#[tokio::test]
async fn entries_survive_a_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let embedder = HashEmbeddings::new(16);

    let store = LocalVectorStore::open_or_create(dir.path(), "docs", &embedder).await.unwrap();
    let chunks = vec![
        embedded_chunk(&embedder, "a_0", "first passage", "a.txt").await,
        embedded_chunk(&embedder, "b_0", "second passage", "b.txt").await,
    ];
    store.add(&chunks).await.unwrap();
    drop(store);

    let reopened =
        LocalVectorStore::open_existing(dir.path(), "docs", &embedder).await.unwrap().unwrap();
    assert_eq!(reopened.count().await.unwrap(), 2);

    let query = embedder.embed("first passage").await.unwrap();
    let results = reopened.search(&query, 1).await.unwrap();
    assert_eq!(results[0].chunk.source, "a.txt");
}

#[tokio::test]
async fn missing_directory_reopens_as_none() {
    let embedder = HashEmbeddings::new(16);
    let missing = std::path::Path::new("/nonexistent/docchat-store");
    let store = LocalVectorStore::open_existing(missing, "docs", &embedder).await.unwrap();
    assert!(store.is_none());
}

#[tokio::test]
async fn empty_collection_reopens_as_none() {
    let dir = tempfile::tempdir().unwrap();
    let embedder = HashEmbeddings::new(16);

    // Create the collection but add nothing.
    let store = LocalVectorStore::open_or_create(dir.path(), "docs", &embedder).await.unwrap();
    store.add(&[]).await.unwrap();
    drop(store);

    let reopened = LocalVectorStore::open_existing(dir.path(), "docs", &embedder).await.unwrap();
    assert!(reopened.is_none());
}

#[tokio::test]
async fn embedding_identity_mismatch_is_a_hard_error() {
    let dir = tempfile::tempdir().unwrap();
    let embedder = HashEmbeddings::new(16);

    let store = LocalVectorStore::open_or_create(dir.path(), "docs", &embedder).await.unwrap();
    store.add(&[embedded_chunk(&embedder, "a_0", "passage", "a.txt").await]).await.unwrap();
    drop(store);

    // Same model id, different dimensionality.
    let other = HashEmbeddings::new(32);
    let err = LocalVectorStore::open_existing(dir.path(), "docs", &other).await.unwrap_err();
    assert!(err.to_string().contains("embedding model"));
}

#[tokio::test]
async fn reindexing_the_same_file_appends_duplicates() {
    let dir = tempfile::tempdir().unwrap();
    let embedder = HashEmbeddings::new(16);

    let store = LocalVectorStore::open_or_create(dir.path(), "docs", &embedder).await.unwrap();
    let chunks = vec![embedded_chunk(&embedder, "a_0", "passage", "a.txt").await];
    store.add(&chunks).await.unwrap();
    store.add(&chunks).await.unwrap();

    // Append-only, no dedup by content or id.
    assert_eq!(store.count().await.unwrap(), 2);
}

#[tokio::test]
async fn wrong_dimension_chunks_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let embedder = HashEmbeddings::new(16);

    let store = LocalVectorStore::open_or_create(dir.path(), "docs", &embedder).await.unwrap();
    let bad = chunk("a_0", "passage", "a.txt", vec![0.5; 8]);
    assert!(store.add(&[bad]).await.is_err());
}
