//! # docchat
//!
//! Document question-answering chat: index text and PDF files into a
//! locally persisted vector store, then ask questions answered by an
//! LLM grounded in retrieved passages, with source citations.
//!
//! The crate is a thin orchestration layer over three capabilities
//! accessed through narrow traits:
//!
//! - [`EmbeddingProvider`] — text → vector, hosted embedding API
//! - [`ChatModel`] — messages → completion, hosted inference API
//! - [`VectorStore`] — append + top-k cosine search, local persistence
//!
//! The flow: [`ingest`] turns files into [`Document`]s, a [`Chunker`]
//! splits them, [`build_index`](index::build_index) embeds and persists
//! the chunks, and a [`ConversationalChain`] answers questions with a
//! rewrite → retrieve → answer pipeline. A [`Session`] ties it all to a
//! chat transcript.

pub mod chain;
pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod encoding;
pub mod error;
pub mod index;
pub mod ingest;
pub mod inmemory;
pub mod llm;
pub mod localstore;
pub mod openai;
pub mod retriever;
pub mod session;
pub mod vectorstore;

pub use chain::{ChainResponse, ConversationalChain};
pub use chunking::{Chunker, FixedSizeChunker, RecursiveChunker};
pub use config::AppConfig;
pub use document::{Chunk, Document, ScoredChunk};
pub use embedding::EmbeddingProvider;
pub use error::{DocChatError, Result};
pub use index::{IndexReport, build_index, load_retriever};
pub use ingest::{UploadedFile, load_documents, load_documents_from_dir};
pub use inmemory::InMemoryVectorStore;
pub use llm::{ChatMessage, ChatModel, Role};
pub use localstore::LocalVectorStore;
pub use openai::{OpenAiChatModel, OpenAiEmbeddings};
pub use retriever::Retriever;
pub use session::{IngestOutcome, Session, SessionReply};
pub use vectorstore::VectorStore;
