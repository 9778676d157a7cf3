//! Error types for the `docchat` crate.

use thiserror::Error;

/// Errors that can occur while ingesting, indexing, or answering.
#[derive(Debug, Error)]
pub enum DocChatError {
    /// A document could not be read or parsed.
    #[error("Ingestion error: {0}")]
    Ingest(String),

    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    Embedding {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred during chat completion.
    #[error("Chat model error ({provider}): {message}")]
    ChatModel {
        /// The chat model provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred in the vector store backend.
    #[error("Vector store error ({backend}): {message}")]
    VectorStore {
        /// The vector store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred while building or updating the index.
    #[error("Indexing error: {0}")]
    Index(String),

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// No retriever is bound to the session yet.
    #[error("no knowledge base is loaded; run the index command or add documents first")]
    NotReady,
}

/// A convenience result type for docchat operations.
pub type Result<T> = std::result::Result<T, DocChatError>;
