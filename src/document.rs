//! Data types for documents, chunks, and search results.

use serde::{Deserialize, Serialize};

/// A source document containing extracted text and provenance.
///
/// One `Document` is produced per logical file, or per page for paged
/// formats such as PDF. Documents are immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Unique identifier for the document.
    pub id: String,
    /// The extracted text content.
    pub text: String,
    /// The filename this document was extracted from.
    pub source: String,
    /// The page number within the source file, for paged formats.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

impl Document {
    /// Create a document spanning a whole file.
    pub fn new(text: impl Into<String>, source: impl Into<String>) -> Self {
        let source = source.into();
        Self { id: source.clone(), text: text.into(), source, page: None }
    }

    /// Create a document for a single page of a paged file.
    pub fn with_page(text: impl Into<String>, source: impl Into<String>, page: u32) -> Self {
        let source = source.into();
        Self { id: format!("{source}#p{page}"), text: text.into(), source, page: Some(page) }
    }
}

/// A segment of a [`Document`] with its vector embedding.
///
/// Chunks inherit `source` and `page` from their parent document and are
/// never mutated after being written to a vector store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Unique identifier for the chunk.
    pub id: String,
    /// The text content of the chunk.
    pub text: String,
    /// The vector embedding for this chunk's text. Empty until indexed.
    pub embedding: Vec<f32>,
    /// The filename of the originating document.
    pub source: String,
    /// The page number of the originating document, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// Position of this chunk within its document.
    pub chunk_index: usize,
    /// The ID of the parent [`Document`].
    pub document_id: String,
}

/// A retrieved [`Chunk`] paired with a similarity score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredChunk {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// The cosine similarity score (higher is more relevant).
    pub score: f32,
}
