//! Document ingestion: uploaded files and local folders → [`Document`]s.
//!
//! Per-file problems (unsupported extension, parse failure, empty
//! content) are logged and skipped; an all-empty input yields an empty
//! list, which callers treat as a no-op rather than an error.

use std::path::Path;

use tracing::{info, warn};

use crate::document::Document;
use crate::encoding::decode_text;
use crate::error::{DocChatError, Result};

/// An uploaded file: a name used for source attribution plus raw bytes.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// The filename, including extension. Stamped into `Document::source`.
    pub name: String,
    /// The raw file contents.
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    /// Read a file from disk into an [`UploadedFile`].
    ///
    /// # Errors
    ///
    /// Returns [`DocChatError::Ingest`] if the file cannot be read.
    pub fn read(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| DocChatError::Ingest(format!("not a file path: {}", path.display())))?;
        let bytes = std::fs::read(path)
            .map_err(|e| DocChatError::Ingest(format!("failed to read {}: {e}", path.display())))?;
        Ok(Self { name, bytes })
    }
}

/// Convert uploaded files into documents.
///
/// Parser selection is by extension: `.pdf` is extracted page by page,
/// `.txt` is decoded with encoding auto-detection. A file that fails to
/// parse, has an unsupported extension, or yields no text is skipped.
/// Returns an empty `Vec` when nothing is extractable.
pub fn load_documents(files: &[UploadedFile]) -> Vec<Document> {
    let mut documents = Vec::new();

    for file in files {
        let lower = file.name.to_ascii_lowercase();
        let parsed = if lower.ends_with(".pdf") {
            parse_pdf(&file.name, &file.bytes)
        } else if lower.ends_with(".txt") {
            parse_text(&file.name, &file.bytes)
        } else {
            warn!(file = %file.name, "skipping unsupported file type");
            continue;
        };

        match parsed {
            Ok(docs) if docs.is_empty() => {
                warn!(file = %file.name, "no text content found, skipping");
            }
            Ok(docs) => {
                info!(file = %file.name, documents = docs.len(), "loaded file");
                documents.extend(docs);
            }
            Err(e) => {
                warn!(file = %file.name, error = %e, "failed to parse file, skipping");
            }
        }
    }

    if documents.is_empty() {
        warn!("no valid text content was extracted from the uploaded files");
    }
    documents
}

/// Load all supported files from a local folder, non-recursively.
///
/// This is the offline index-build input path. Individual files follow
/// the same skip-and-log rules as [`load_documents`].
///
/// # Errors
///
/// Returns [`DocChatError::Ingest`] only if the directory itself cannot
/// be read.
pub fn load_documents_from_dir(dir: &Path) -> Result<Vec<Document>> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| DocChatError::Ingest(format!("failed to read {}: {e}", dir.display())))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry
            .map_err(|e| DocChatError::Ingest(format!("failed to read {}: {e}", dir.display())))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        match UploadedFile::read(&path) {
            Ok(file) => files.push(file),
            Err(e) => warn!(path = %path.display(), error = %e, "failed to read file, skipping"),
        }
    }
    // Directory iteration order is platform-dependent; sort for stable
    // document IDs across rebuilds.
    files.sort_by(|a, b| a.name.cmp(&b.name));

    info!(dir = %dir.display(), files = files.len(), "loading documents from folder");
    Ok(load_documents(&files))
}

/// Extract text from a PDF, one [`Document`] per non-empty page.
fn parse_pdf(name: &str, bytes: &[u8]) -> Result<Vec<Document>> {
    let pdf = lopdf::Document::load_mem(bytes)
        .map_err(|e| DocChatError::Ingest(format!("invalid PDF: {e}")))?;

    let mut documents = Vec::new();
    for page_number in pdf.get_pages().keys() {
        // A page that fails extraction is skipped, not fatal for the file.
        let text = match pdf.extract_text(&[*page_number]) {
            Ok(text) => text,
            Err(e) => {
                warn!(file = name, page = page_number, error = %e, "failed to extract page");
                continue;
            }
        };
        if text.trim().is_empty() {
            continue;
        }
        documents.push(Document::with_page(text, name, *page_number));
    }
    Ok(documents)
}

/// Decode a text file, auto-detecting its encoding.
fn parse_text(name: &str, bytes: &[u8]) -> Result<Vec<Document>> {
    let text = decode_text(bytes);
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(vec![Document::new(text, name)])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, bytes: &[u8]) -> UploadedFile {
        UploadedFile { name: name.to_string(), bytes: bytes.to_vec() }
    }

    #[test]
    fn empty_and_unsupported_files_yield_empty_list() {
        let files = vec![
            file("empty.txt", b""),
            file("blank.txt", b"   \n\t  "),
            file("image.png", b"\x89PNG\r\n"),
            file("archive.zip", b"PK\x03\x04"),
        ];
        assert!(load_documents(&files).is_empty());
    }

    #[test]
    fn corrupt_pdf_is_skipped_but_other_files_load() {
        let files = vec![
            file("broken.pdf", b"this is not a pdf"),
            file("notes.txt", b"some real content"),
        ];
        let docs = load_documents(&files);
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].source, "notes.txt");
        assert_eq!(docs[0].text, "some real content");
    }

    #[test]
    fn every_document_is_stamped_with_its_filename() {
        let files = vec![file("a.txt", b"alpha"), file("b.txt", b"beta")];
        let docs = load_documents(&files);
        let sources: Vec<&str> = docs.iter().map(|d| d.source.as_str()).collect();
        assert_eq!(sources, vec!["a.txt", "b.txt"]);
    }

    #[test]
    fn legacy_encoded_text_is_decoded() {
        // ISO-8859-1 bytes, invalid as UTF-8.
        let bytes = [b'r', 0xE9, b's', b'u', b'm', 0xE9, b' ', b'n', b'o', b't', b'e', b's'];
        let docs = load_documents(&[file("resume.txt", &bytes)]);
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].text, "résumé notes");
    }

    #[test]
    fn missing_directory_is_a_hard_error() {
        let err = load_documents_from_dir(Path::new("/nonexistent/docchat-data")).unwrap_err();
        assert!(matches!(err, DocChatError::Ingest(_)));
    }
}
