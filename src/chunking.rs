//! Document chunking strategies.
//!
//! This module provides the [`Chunker`] trait and two implementations:
//!
//! - [`RecursiveChunker`] — seeks natural boundaries: paragraphs, then
//!   sentences, then words, falling back to fixed-size cuts
//! - [`FixedSizeChunker`] — plain character windows with exact overlap
//!
//! Chunks carry text and provenance but no embeddings; embeddings are
//! attached later by the indexer.

use crate::document::{Chunk, Document};

/// A strategy for splitting documents into chunks.
///
/// Every produced chunk's text is at most the chunker's configured
/// maximum size. An empty document yields an empty `Vec`.
pub trait Chunker: Send + Sync {
    /// Split a document into chunks.
    fn chunk(&self, document: &Document) -> Vec<Chunk>;
}

/// Boundary separators tried in order, coarsest first.
const SEPARATORS: &[&str] = &["\n\n", ". ", "! ", "? ", " "];

fn make_chunk(document: &Document, text: String, index: usize) -> Chunk {
    Chunk {
        id: format!("{}_{index}", document.id),
        text,
        embedding: Vec::new(),
        source: document.source.clone(),
        page: document.page,
        chunk_index: index,
        document_id: document.id.clone(),
    }
}

/// Round a byte offset down to the nearest char boundary.
fn floor_boundary(text: &str, mut offset: usize) -> usize {
    while offset > 0 && !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

/// Round a byte offset up to the nearest char boundary.
fn ceil_boundary(text: &str, mut offset: usize) -> usize {
    while offset < text.len() && !text.is_char_boundary(offset) {
        offset += 1;
    }
    offset.min(text.len())
}

/// Split text into fixed windows of at most `chunk_size` bytes, stepping
/// by `chunk_size - chunk_overlap`, snapped to char boundaries.
fn window_split(text: &str, chunk_size: usize, chunk_overlap: usize) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut start = 0;

    while start < text.len() {
        let mut end = floor_boundary(text, (start + chunk_size).min(text.len()));
        if end <= start {
            // chunk_size is smaller than the char at `start`; take it whole.
            end = ceil_boundary(text, start + 1);
        }
        chunks.push(text[start..end].to_string());

        let step = chunk_size.saturating_sub(chunk_overlap);
        if step == 0 {
            break;
        }
        start = ceil_boundary(text, start + step);
    }

    chunks
}

/// Split text at a separator, keeping the separator attached to the
/// preceding piece so that rejoined pieces reproduce the original text.
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    let mut pieces = Vec::new();
    let mut start = 0;

    while let Some(pos) = text[start..].find(separator) {
        let end = start + pos + separator.len();
        pieces.push(&text[start..end]);
        start = end;
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }
    pieces
}

/// Recursively split `text` so that every returned piece is at most
/// `chunk_size` bytes: merge separator-delimited segments greedily,
/// carry whole trailing segments up to `chunk_overlap` bytes into the
/// next chunk, and descend to the next finer separator for any segment
/// still too large.
fn split_recursive(
    text: &str,
    chunk_size: usize,
    chunk_overlap: usize,
    separators: &[&str],
) -> Vec<String> {
    if text.len() <= chunk_size {
        return vec![text.to_string()];
    }
    let Some((separator, finer)) = separators.split_first() else {
        return window_split(text, chunk_size, chunk_overlap);
    };

    let mut out = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_len = 0;

    for piece in split_keeping_separator(text, separator) {
        if piece.len() > chunk_size {
            if !current.is_empty() {
                out.push(current.concat());
                current.clear();
                current_len = 0;
            }
            out.extend(split_recursive(piece, chunk_size, chunk_overlap, finer));
            continue;
        }
        if !current.is_empty() && current_len + piece.len() > chunk_size {
            out.push(current.concat());
            // Keep whole trailing segments as the seed of the next
            // chunk: at most `chunk_overlap` bytes, and small enough
            // that `piece` still fits under `chunk_size`.
            while current_len > chunk_overlap
                || (current_len + piece.len() > chunk_size && !current.is_empty())
            {
                current_len -= current.remove(0).len();
            }
        }
        current.push(piece);
        current_len += piece.len();
    }
    if !current.is_empty() {
        out.push(current.concat());
    }

    out
}

/// Splits text hierarchically: paragraphs → sentences → words.
///
/// Paragraph breaks (`\n\n`) are tried first, then sentence boundaries
/// (`. `, `! `, `? `), then word boundaries, then raw character windows.
/// Consecutive chunks overlap: whole trailing segments of each emitted
/// chunk, up to `chunk_overlap` bytes, are carried into the next chunk;
/// the fixed-cut fallback overlaps by exactly `chunk_overlap`.
#[derive(Debug, Clone)]
pub struct RecursiveChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl RecursiveChunker {
    /// Create a new `RecursiveChunker`.
    ///
    /// # Arguments
    ///
    /// * `chunk_size` — maximum number of bytes per chunk
    /// * `chunk_overlap` — maximum bytes of trailing text carried into
    ///   the next chunk
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self { chunk_size, chunk_overlap }
    }
}

impl Chunker for RecursiveChunker {
    fn chunk(&self, document: &Document) -> Vec<Chunk> {
        if document.text.is_empty() {
            return Vec::new();
        }

        split_recursive(&document.text, self.chunk_size, self.chunk_overlap, SEPARATORS)
            .into_iter()
            .filter(|text| !text.trim().is_empty())
            .enumerate()
            .map(|(i, text)| make_chunk(document, text, i))
            .collect()
    }
}

/// Splits text into fixed-size character windows with exact overlap.
///
/// Consecutive chunks from the same document share exactly
/// `chunk_overlap` bytes, except possibly the final chunk.
#[derive(Debug, Clone)]
pub struct FixedSizeChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl FixedSizeChunker {
    /// Create a new `FixedSizeChunker`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self { chunk_size, chunk_overlap }
    }
}

impl Chunker for FixedSizeChunker {
    fn chunk(&self, document: &Document) -> Vec<Chunk> {
        if document.text.is_empty() {
            return Vec::new();
        }

        window_split(&document.text, self.chunk_size, self.chunk_overlap)
            .into_iter()
            .enumerate()
            .map(|(i, text)| make_chunk(document, text, i))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str) -> Document {
        Document::new(text, "test.txt")
    }

    #[test]
    fn empty_document_yields_no_chunks() {
        assert!(RecursiveChunker::new(100, 20).chunk(&doc("")).is_empty());
        assert!(FixedSizeChunker::new(100, 20).chunk(&doc("")).is_empty());
    }

    #[test]
    fn short_document_is_a_single_chunk() {
        let chunks = RecursiveChunker::new(100, 20).chunk(&doc("just one paragraph"));
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "just one paragraph");
        assert_eq!(chunks[0].source, "test.txt");
        assert_eq!(chunks[0].chunk_index, 0);
    }

    #[test]
    fn recursive_chunks_respect_the_size_bound() {
        let paragraph = "The quick brown fox jumps over the lazy dog. ".repeat(8);
        let text = vec![paragraph; 6].join("\n\n");
        let chunks = RecursiveChunker::new(120, 24).chunk(&doc(&text));

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.text.len() <= 120, "chunk too large: {} bytes", chunk.text.len());
        }
    }

    #[test]
    fn recursive_prefers_paragraph_boundaries() {
        let text = "first paragraph here.\n\nsecond paragraph here.";
        let chunks = RecursiveChunker::new(30, 5).chunk(&doc(text));
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text.trim_end(), "first paragraph here.");
        assert_eq!(chunks[1].text, "second paragraph here.");
    }

    #[test]
    fn recursive_chunks_carry_overlap_into_the_next_chunk() {
        // Distinct words, so shared text can only come from carryover.
        let words: Vec<String> = (0..60).map(|i| format!("word{i:02}")).collect();
        let text = words.join(" ");
        let overlap = 20;
        let chunks = RecursiveChunker::new(50, overlap).chunk(&doc(&text));
        assert!(chunks.len() > 1);

        // Each chunk after the first starts with whole trailing words
        // of its predecessor, totalling at most `overlap` bytes.
        for pair in chunks.windows(2) {
            let prev = &pair[0].text;
            let shared = (1..=overlap.min(prev.len()))
                .rev()
                .find(|&k| pair[1].text.starts_with(&prev[prev.len() - k..]))
                .unwrap_or(0);
            assert!(shared >= "word00 ".len(), "expected carried-over words, got {shared} bytes");
        }
    }

    #[test]
    fn fixed_chunks_overlap_exactly() {
        let text: String = ('a'..='z').cycle().take(260).collect();
        let size = 100;
        let overlap = 20;
        let chunks = FixedSizeChunker::new(size, overlap).chunk(&doc(&text));
        assert_eq!(chunks.len(), 4);

        // Each chunk starts with the last `overlap` bytes of its
        // predecessor; only the final chunk may be short.
        for pair in chunks.windows(2) {
            let tail = &pair[0].text[pair[0].text.len() - overlap..];
            assert!(pair[1].text.starts_with(tail), "consecutive chunks must share the overlap");
        }
        for chunk in &chunks[..chunks.len() - 1] {
            assert_eq!(chunk.text.len(), size);
        }
    }

    #[test]
    fn multibyte_text_never_splits_inside_a_char() {
        let text = "données météo 🌧 répétées ".repeat(40);
        for chunk in RecursiveChunker::new(50, 10).chunk(&doc(&text)) {
            assert!(chunk.text.len() <= 50);
        }
        for chunk in FixedSizeChunker::new(50, 10).chunk(&doc(&text)) {
            assert!(!chunk.text.is_empty());
        }
    }

    #[test]
    fn chunk_ids_follow_document_and_index() {
        let text = "one two three four five six seven eight nine ten".repeat(4);
        let chunks = FixedSizeChunker::new(40, 10).chunk(&doc(&text));
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.chunk_index, i);
            assert_eq!(chunk.id, format!("test.txt_{i}"));
            assert_eq!(chunk.document_id, "test.txt");
        }
    }
}
