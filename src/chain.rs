//! History-aware conversational retrieval chain.
//!
//! Each question runs two LLM stages around one retrieval:
//! rewrite (make the question standalone) → retrieve → answer
//! (grounded in the retrieved context). The chain is stateless across
//! questions; chat history is supplied by the caller per call.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, info};

use crate::document::Chunk;
use crate::error::Result;
use crate::llm::{ChatMessage, ChatModel};
use crate::retriever::Retriever;

/// Instructs the model to reformulate, never answer.
const REWRITE_PROMPT: &str = "Given a chat history and the latest user question which might \
    reference context in the chat history, formulate a standalone question which can be \
    understood without the chat history. Do NOT answer the question, just reformulate it if \
    needed and otherwise return it as is.";

/// Grounded-answer instructions; `{context}` is replaced with the
/// concatenated retrieved chunk texts.
const ANSWER_PROMPT: &str = "You are an assistant for question-answering tasks. Use the \
    following pieces of retrieved context to answer the question. If you don't know the \
    answer, just say that you don't know. Keep the answer concise.\n\nContext:\n{context}";

/// The chain's output: a clean answer plus the chunks it was grounded in.
#[derive(Debug, Clone)]
pub struct ChainResponse {
    /// The generated answer, without citation text.
    pub answer: String,
    /// The retrieved chunks, in decreasing-similarity order.
    pub context: Vec<Chunk>,
}

impl ChainResponse {
    /// The distinct source filenames across the retrieved chunks.
    ///
    /// Set semantics: a filename appearing in several chunks is listed
    /// once. Ordering is lexicographic, not similarity-ranked.
    pub fn sources(&self) -> Vec<String> {
        let set: BTreeSet<&str> = self.context.iter().map(|c| c.source.as_str()).collect();
        set.into_iter().map(str::to_string).collect()
    }
}

/// A conversational retrieval pipeline bound to one [`Retriever`] and
/// one [`ChatModel`].
///
/// Immutable once constructed; rebuild it whenever the retriever
/// changes (e.g. after new documents are indexed).
#[derive(Clone)]
pub struct ConversationalChain {
    retriever: Retriever,
    model: Arc<dyn ChatModel>,
}

impl ConversationalChain {
    /// Bind a retriever and a chat model into a chain.
    pub fn new(retriever: Retriever, model: Arc<dyn ChatModel>) -> Self {
        Self { retriever, model }
    }

    /// Answer `question` against the indexed documents.
    ///
    /// `history` must contain everything strictly before the current
    /// turn and must not include `question` itself.
    ///
    /// # Errors
    ///
    /// Any embedding, store, or LLM failure propagates unchanged — no
    /// retries, no partial answers.
    pub async fn ask(&self, history: &[ChatMessage], question: &str) -> Result<ChainResponse> {
        let standalone = self.rewrite(history, question).await?;
        let context = self.retriever.retrieve(&standalone).await?;
        let answer = self.answer(history, question, &context).await?;

        info!(
            model = self.model.name(),
            retrieved = context.len(),
            rewritten = standalone != question,
            "answered question"
        );
        Ok(ChainResponse { answer, context })
    }

    /// Rewrite stage: turn a follow-up question into a standalone one.
    ///
    /// With no history there is nothing to resolve, so the question
    /// passes through without an LLM call.
    async fn rewrite(&self, history: &[ChatMessage], question: &str) -> Result<String> {
        if history.is_empty() {
            return Ok(question.to_string());
        }

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(REWRITE_PROMPT));
        messages.extend_from_slice(history);
        messages.push(ChatMessage::user(question));

        let standalone = self.model.generate(&messages).await?;
        debug!(original = question, standalone = %standalone, "rewrote question");
        Ok(standalone)
    }

    /// Answer stage: original history + original question + retrieved
    /// context → grounded answer.
    async fn answer(
        &self,
        history: &[ChatMessage],
        question: &str,
        context: &[Chunk],
    ) -> Result<String> {
        let joined: Vec<&str> = context.iter().map(|c| c.text.as_str()).collect();
        let system = ANSWER_PROMPT.replace("{context}", &joined.join("\n\n"));

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(system));
        messages.extend_from_slice(history);
        messages.push(ChatMessage::user(question));

        self.model.generate(&messages).await
    }
}
