//! Session context: transcript, bound retriever, and bound chain.
//!
//! All mutable chat state lives in an explicit [`Session`] object with a
//! clear open → use lifecycle; there is no ambient shared state. One
//! session handles one question or one upload at a time.

use std::sync::Arc;

use tracing::info;

use crate::chain::ConversationalChain;
use crate::chunking::{Chunker, RecursiveChunker};
use crate::config::AppConfig;
use crate::embedding::EmbeddingProvider;
use crate::error::{DocChatError, Result};
use crate::index::{build_index, load_retriever};
use crate::ingest::{UploadedFile, load_documents};
use crate::llm::{ChatMessage, ChatModel};
use crate::retriever::Retriever;

/// The outcome of adding files to a session's knowledge base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Documents were chunked, embedded, and appended to the store.
    Indexed {
        /// Number of documents extracted from the uploaded files.
        documents: usize,
        /// Number of chunks appended to the store.
        chunks: usize,
    },
    /// Nothing extractable was found; the knowledge base is unchanged.
    NothingToIndex,
}

/// A rendered answer with its citation set.
#[derive(Debug, Clone)]
pub struct SessionReply {
    /// The clean answer text.
    pub answer: String,
    /// Distinct source filenames the answer was grounded in.
    pub sources: Vec<String>,
}

/// One interactive chat session over an indexed document collection.
pub struct Session {
    config: AppConfig,
    embedder: Arc<dyn EmbeddingProvider>,
    model: Option<Arc<dyn ChatModel>>,
    chunker: Arc<dyn Chunker>,
    transcript: Vec<ChatMessage>,
    retriever: Option<Retriever>,
    chain: Option<ConversationalChain>,
}

impl Session {
    /// Open a session, attempting to load a previously built index.
    ///
    /// A missing or empty persisted store leaves the session in the
    /// "knowledge base empty" state; it is not an error. Documents can
    /// still be added later via [`add_files`](Session::add_files).
    ///
    /// # Errors
    ///
    /// Fails only on a genuinely broken store (corrupt snapshot or
    /// embedding-model mismatch).
    pub async fn open(
        config: AppConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        model: Arc<dyn ChatModel>,
    ) -> Result<Self> {
        Self::open_inner(config, embedder, Some(model)).await
    }

    /// Open a session with no chat model bound.
    ///
    /// The knowledge base stays fully usable: the store loads as usual
    /// and [`add_files`](Session::add_files) indexes uploads. Only
    /// [`ask`](Session::ask) is unavailable; it reports the missing
    /// chat credential.
    pub async fn open_without_chat(
        config: AppConfig,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self> {
        Self::open_inner(config, embedder, None).await
    }

    async fn open_inner(
        config: AppConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        model: Option<Arc<dyn ChatModel>>,
    ) -> Result<Self> {
        let retriever = load_retriever(&config, Arc::clone(&embedder)).await?;
        let chain = retriever
            .as_ref()
            .zip(model.as_ref())
            .map(|(r, m)| ConversationalChain::new(r.clone(), Arc::clone(m)));
        let chunker = Arc::new(RecursiveChunker::new(config.chunk_size, config.chunk_overlap));

        if retriever.is_some() {
            info!("session opened with existing knowledge base");
        } else {
            info!("session opened with empty knowledge base");
        }

        Ok(Self { config, embedder, model, chunker, transcript: Vec::new(), retriever, chain })
    }

    /// Whether a knowledge base is bound.
    pub fn ready(&self) -> bool {
        self.retriever.is_some()
    }

    /// The ordered transcript of this session so far.
    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    /// Ingest uploaded files, append them to the index, and rebind the
    /// chain to the updated retriever.
    ///
    /// Files that cannot be parsed are skipped; if nothing is
    /// extractable the knowledge base is left unchanged and
    /// [`IngestOutcome::NothingToIndex`] is returned. A hard indexing
    /// failure leaves the previously bound retriever and chain intact.
    pub async fn add_files(&mut self, files: &[UploadedFile]) -> Result<IngestOutcome> {
        let documents = load_documents(files);
        if documents.is_empty() {
            return Ok(IngestOutcome::NothingToIndex);
        }

        let report = build_index(
            &documents,
            self.chunker.as_ref(),
            Arc::clone(&self.embedder),
            &self.config,
        )
        .await?;

        let chunks = report.chunks_added;
        if let Some(model) = &self.model {
            self.chain =
                Some(ConversationalChain::new(report.retriever.clone(), Arc::clone(model)));
        }
        self.retriever = Some(report.retriever);

        info!(documents = documents.len(), chunks, "session knowledge base updated");
        Ok(IngestOutcome::Indexed { documents: documents.len(), chunks })
    }

    /// Ask a question against the session's knowledge base.
    ///
    /// The history handed to the chain is everything strictly before
    /// this turn — the in-flight question is excluded. On success the
    /// user message and the clean answer are appended to the
    /// transcript; on failure the transcript is left untouched.
    ///
    /// # Errors
    ///
    /// [`DocChatError::Config`] if no chat model is bound,
    /// [`DocChatError::NotReady`] if no index is bound yet; otherwise
    /// chain failures propagate unchanged.
    pub async fn ask(&mut self, question: &str) -> Result<SessionReply> {
        let chain = match &self.chain {
            Some(chain) => chain,
            None if self.model.is_none() => {
                return Err(DocChatError::Config(
                    "no chat model is configured; set GROQ_API_KEY to enable answers".into(),
                ));
            }
            None => return Err(DocChatError::NotReady),
        };

        let response = chain.ask(&self.transcript, question).await?;
        let sources = response.sources();

        self.transcript.push(ChatMessage::user(question));
        self.transcript.push(ChatMessage::assistant(response.answer.clone()));

        Ok(SessionReply { answer: response.answer, sources })
    }
}
