//! Configuration for indexing and retrieval.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{DocChatError, Result};

/// Default on-disk location for the persisted vector store.
pub const DEFAULT_STORE_DIR: &str = "./docchat_db";

/// Configuration shared by the offline index build and the chat session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    /// Directory holding the persisted collection.
    pub store_dir: PathBuf,
    /// Name of the collection within `store_dir`.
    pub collection: String,
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
    /// Overlap between consecutive chunks in characters.
    pub chunk_overlap: usize,
    /// Number of chunks retrieved per question.
    pub top_k: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store_dir: PathBuf::from(DEFAULT_STORE_DIR),
            collection: "documents".to_string(),
            chunk_size: 1000,
            chunk_overlap: 200,
            top_k: 4,
        }
    }
}

impl AppConfig {
    /// Create a new builder for constructing an [`AppConfig`].
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`AppConfig`].
#[derive(Debug, Clone, Default)]
pub struct AppConfigBuilder {
    config: AppConfig,
}

impl AppConfigBuilder {
    /// Set the store directory.
    pub fn store_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.store_dir = dir.into();
        self
    }

    /// Set the collection name.
    pub fn collection(mut self, name: impl Into<String>) -> Self {
        self.config.collection = name.into();
        self
    }

    /// Set the maximum chunk size in characters.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive chunks in characters.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Set the number of chunks retrieved per question.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Build the [`AppConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`DocChatError::Config`] if `chunk_overlap >= chunk_size`,
    /// `top_k == 0`, or the collection name is empty.
    pub fn build(self) -> Result<AppConfig> {
        if self.config.chunk_overlap >= self.config.chunk_size {
            return Err(DocChatError::Config(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                self.config.chunk_overlap, self.config.chunk_size
            )));
        }
        if self.config.top_k == 0 {
            return Err(DocChatError::Config("top_k must be greater than zero".to_string()));
        }
        if self.config.collection.is_empty() {
            return Err(DocChatError::Config("collection name must not be empty".to_string()));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::builder().build().unwrap();
        assert_eq!(config.chunk_size, 1000);
        assert_eq!(config.chunk_overlap, 200);
        assert_eq!(config.top_k, 4);
    }

    #[test]
    fn overlap_must_be_less_than_size() {
        let err = AppConfig::builder().chunk_size(100).chunk_overlap(100).build().unwrap_err();
        assert!(matches!(err, DocChatError::Config(_)));
    }

    #[test]
    fn top_k_zero_is_rejected() {
        let err = AppConfig::builder().top_k(0).build().unwrap_err();
        assert!(matches!(err, DocChatError::Config(_)));
    }
}
