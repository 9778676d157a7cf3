//! Shared test doubles: deterministic embeddings and scripted chat models.

// Not every test binary uses every double.
#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;

use docchat::{ChatMessage, ChatModel, DocChatError, EmbeddingProvider};

/// Deterministic hash-based embeddings; no API keys needed.
///
/// The vector direction depends only on the text content, so identical
/// texts always embed identically.
pub struct HashEmbeddings {
    dimensions: usize,
}

impl HashEmbeddings {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbeddings {
    async fn embed(&self, text: &str) -> docchat::Result<Vec<f32>> {
        let hash = text.bytes().fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
        let mut embedding = vec![0.0f32; self.dimensions];
        for (i, v) in embedding.iter_mut().enumerate() {
            *v = ((hash.wrapping_add(i as u64)) as f32).sin();
        }
        // L2-normalise so cosine similarity is just the dot product.
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            embedding.iter_mut().for_each(|x| *x /= norm);
        }
        Ok(embedding)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_id(&self) -> &str {
        "mock-hash"
    }
}

/// A chat model that records every call and replies with a fixed answer.
#[derive(Default)]
pub struct ScriptedChatModel {
    calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedChatModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// All message sequences this model has been called with, in order.
    pub fn calls(&self) -> Vec<Vec<ChatMessage>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedChatModel {
    async fn generate(&self, messages: &[ChatMessage]) -> docchat::Result<String> {
        self.calls.lock().unwrap().push(messages.to_vec());
        Ok("scripted answer".to_string())
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// A chat model that answers by echoing the system prompt it received.
///
/// The answer stage puts the retrieved context into the system message,
/// so the echoed text contains whatever was retrieved — enough to
/// verify grounding end to end without a real LLM.
pub struct ContextEchoModel;

#[async_trait]
impl ChatModel for ContextEchoModel {
    async fn generate(&self, messages: &[ChatMessage]) -> docchat::Result<String> {
        Ok(messages.first().map(|m| m.content.clone()).unwrap_or_default())
    }

    fn name(&self) -> &str {
        "context-echo"
    }
}

/// A chat model whose every call fails, for error-propagation tests.
pub struct FailingChatModel;

#[async_trait]
impl ChatModel for FailingChatModel {
    async fn generate(&self, _messages: &[ChatMessage]) -> docchat::Result<String> {
        Err(DocChatError::ChatModel {
            provider: "failing".into(),
            message: "simulated outage".into(),
        })
    }

    fn name(&self) -> &str {
        "failing"
    }
}
