// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Document processing is an external collaborator: the real document
//! format parsers (PDF/DOCX/etc.) are out of scope here. This module
//! defines the seam the Scan Engine and Indexer Pipeline call through —
//! [`FileTypePolicy`] (attempt/skip/OCR per extension) and [`Processor`]
//! (bytes or path in, [`ProcessedDocument`] out) — plus one concrete,
//! dependency-free implementation: [`PlainTextProcessor`], which handles
//! text-like formats directly and treats everything else (including
//! non-encrypted PDFs, which would need a real PDF parser) as unsupported.

use indexer_core::{ChunkMetadata, DocumentId, IndexerError};
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;

/// What the Scan Engine should do with a given file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileTypeAction {
    Attempt,
    Skip,
    Ocr,
}

pub trait FileTypePolicy: Send + Sync {
    fn action_for(&self, extension: &str) -> FileTypeAction;
}

/// Extensions the bundled [`PlainTextProcessor`] can actually extract text
/// from. Anything else is `Skip` (unsupported, not failed).
const SUPPORTED_TEXT_EXTENSIONS: &[&str] =
    &["txt", "md", "markdown", "rst", "log", "csv", "json", "html", "htm"];

/// Default file-type policy: text-like extensions are attempted, PDFs are
/// routed through OCR handling (still gated by `ocr_mode` at the call site),
/// everything else is skipped.
pub struct DefaultFileTypePolicy {
    supported: HashSet<&'static str>,
}

impl DefaultFileTypePolicy {
    pub fn new() -> Self {
        Self { supported: SUPPORTED_TEXT_EXTENSIONS.iter().copied().collect() }
    }
}

impl Default for DefaultFileTypePolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl FileTypePolicy for DefaultFileTypePolicy {
    fn action_for(&self, extension: &str) -> FileTypeAction {
        let lower = extension.to_ascii_lowercase();
        if self.supported.contains(lower.as_str()) {
            FileTypeAction::Attempt
        } else if lower == "pdf" {
            FileTypeAction::Ocr
        } else {
            FileTypeAction::Skip
        }
    }
}

/// Output of processing one document, ready for the Indexer Pipeline to
/// embed and insert.
pub struct ProcessedDocument {
    pub document_id: DocumentId,
    pub source_uri: String,
    pub metadata: ChunkMetadata,
    pub chunk_texts: Vec<String>,
}

/// Target chunk size and overlap, in characters, for the bundled text
/// chunker. Chosen to keep chunks well inside typical embedding context
/// windows without being so small that every paragraph becomes its own row.
const CHUNK_SIZE_CHARS: usize = 800;
const CHUNK_OVERLAP_CHARS: usize = 100;

pub trait Processor: Send + Sync {
    /// Process a file on disk, honoring `ocr_mode` for OCR-eligible types.
    fn process_path(&self, path: &Path, ocr_mode: bool) -> Result<ProcessedDocument, IndexerError>;

    /// Process already-read bytes under a display name (the upload path):
    /// `document_id` is derived from `display_name`, never from the temp
    /// path it was streamed through.
    fn process_bytes(
        &self,
        display_name: &str,
        bytes: &[u8],
        ocr_mode: bool,
    ) -> Result<ProcessedDocument, IndexerError>;
}

/// Bundled processor for text-like formats, with a narrow PDF-encryption
/// detector (a raw `/Encrypt` token scan in the file's trailer, not a full
/// PDF parse) so `EncryptedPDF` is still a distinguishable error class
/// without pulling in a PDF parsing dependency.
pub struct PlainTextProcessor {
    policy: Box<dyn FileTypePolicy>,
}

impl PlainTextProcessor {
    pub fn new(policy: Box<dyn FileTypePolicy>) -> Self {
        Self { policy }
    }

    fn file_type(path: &Path) -> String {
        path.extension().and_then(|e| e.to_str()).unwrap_or("").to_ascii_lowercase()
    }

    fn build_metadata(source_uri: &str, file_type: &str) -> ChunkMetadata {
        let mut metadata = ChunkMetadata::new();
        metadata.insert("document_id".to_string(), Value::String(String::new()));
        metadata.insert("source_uri".to_string(), Value::String(source_uri.to_string()));
        metadata.insert("file_type".to_string(), Value::String(file_type.to_string()));
        metadata.insert("type".to_string(), Value::String(file_type.to_string()));
        metadata
    }

    fn chunk_text(text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        let chars: Vec<char> = text.chars().collect();
        if chars.len() <= CHUNK_SIZE_CHARS {
            return vec![text.trim().to_string()];
        }

        let mut chunks = Vec::new();
        let step = CHUNK_SIZE_CHARS - CHUNK_OVERLAP_CHARS;
        let mut start = 0;
        while start < chars.len() {
            let end = (start + CHUNK_SIZE_CHARS).min(chars.len());
            let piece: String = chars[start..end].iter().collect();
            let trimmed = piece.trim();
            if !trimmed.is_empty() {
                chunks.push(trimmed.to_string());
            }
            if end == chars.len() {
                break;
            }
            start += step;
        }
        chunks
    }

    fn process_text(
        &self,
        document_id: DocumentId,
        source_uri: &str,
        file_type: &str,
        content: &str,
    ) -> ProcessedDocument {
        let mut metadata = Self::build_metadata(source_uri, file_type);
        metadata.insert("document_id".to_string(), Value::String(document_id.as_str().to_string()));
        ProcessedDocument {
            document_id,
            source_uri: source_uri.to_string(),
            metadata,
            chunk_texts: Self::chunk_text(content),
        }
    }

    /// Scans raw PDF bytes for the `/Encrypt` token that appears in an
    /// encrypted PDF's trailer dictionary. A false negative just means the
    /// file falls through to "unsupported" rather than "encrypted"; a false
    /// positive is vanishingly unlikely since `/Encrypt` isn't a token that
    /// appears in unencrypted PDF content streams.
    fn pdf_is_encrypted(bytes: &[u8]) -> bool {
        bytes.windows(b"/Encrypt".len()).any(|w| w == b"/Encrypt")
    }
}

impl Processor for PlainTextProcessor {
    fn process_path(&self, path: &Path, ocr_mode: bool) -> Result<ProcessedDocument, IndexerError> {
        let source_uri = path.to_string_lossy().to_string();
        let file_type = Self::file_type(path);
        let document_id = DocumentId::from_source_identity(&source_uri);

        match self.policy.action_for(&file_type) {
            FileTypeAction::Attempt => {
                let content = std::fs::read_to_string(path).map_err(|e| {
                    IndexerError::DocumentProcessingFailed(format!(
                        "failed to read {source_uri}: {e}"
                    ))
                })?;
                Ok(self.process_text(document_id, &source_uri, &file_type, &content))
            }
            FileTypeAction::Ocr if file_type == "pdf" => {
                let bytes = std::fs::read(path).map_err(|e| {
                    IndexerError::DocumentProcessingFailed(format!(
                        "failed to read {source_uri}: {e}"
                    ))
                })?;
                if Self::pdf_is_encrypted(&bytes) {
                    return Err(IndexerError::EncryptedPdf(source_uri));
                }
                if !ocr_mode {
                    return Err(IndexerError::UnsupportedFormat(file_type));
                }
                // Real OCR extraction is out of scope; an
                // OCR-capable adapter would replace this branch.
                Err(IndexerError::UnsupportedFormat(file_type))
            }
            FileTypeAction::Ocr | FileTypeAction::Skip => {
                Err(IndexerError::UnsupportedFormat(file_type))
            }
        }
    }

    fn process_bytes(
        &self,
        display_name: &str,
        bytes: &[u8],
        ocr_mode: bool,
    ) -> Result<ProcessedDocument, IndexerError> {
        let file_type = Path::new(display_name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        // The upload path derives document_id from the display name, not
        // the temp path it was streamed through.
        let document_id = DocumentId::from_source_identity(display_name);

        match self.policy.action_for(&file_type) {
            FileTypeAction::Attempt => {
                let content = String::from_utf8(bytes.to_vec()).map_err(|e| {
                    IndexerError::DocumentProcessingFailed(format!(
                        "upload {display_name} is not valid utf-8: {e}"
                    ))
                })?;
                Ok(self.process_text(document_id, display_name, &file_type, &content))
            }
            FileTypeAction::Ocr if file_type == "pdf" => {
                if Self::pdf_is_encrypted(bytes) {
                    return Err(IndexerError::EncryptedPdf(display_name.to_string()));
                }
                if !ocr_mode {
                    return Err(IndexerError::UnsupportedFormat(file_type));
                }
                Err(IndexerError::UnsupportedFormat(file_type))
            }
            FileTypeAction::Ocr | FileTypeAction::Skip => {
                Err(IndexerError::UnsupportedFormat(file_type))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn processor() -> PlainTextProcessor {
        PlainTextProcessor::new(Box::new(DefaultFileTypePolicy::new()))
    }

    #[test]
    fn policy_attempts_known_text_extensions() {
        let policy = DefaultFileTypePolicy::new();
        assert_eq!(policy.action_for("md"), FileTypeAction::Attempt);
        assert_eq!(policy.action_for("TXT"), FileTypeAction::Attempt);
    }

    #[test]
    fn policy_skips_unknown_extensions() {
        let policy = DefaultFileTypePolicy::new();
        assert_eq!(policy.action_for("docx"), FileTypeAction::Skip);
    }

    #[test]
    fn policy_routes_pdf_through_ocr() {
        let policy = DefaultFileTypePolicy::new();
        assert_eq!(policy.action_for("pdf"), FileTypeAction::Ocr);
    }

    #[test]
    fn process_bytes_chunks_short_text_as_one_chunk() {
        let proc = processor();
        let doc = proc.process_bytes("/test/ml.txt", b"Machine learning is great.", false).unwrap();
        assert_eq!(doc.chunk_texts.len(), 1);
        assert_eq!(doc.source_uri, "/test/ml.txt");
        assert_eq!(doc.document_id, DocumentId::from_source_identity("/test/ml.txt"));
    }

    #[test]
    fn process_bytes_splits_long_text_into_multiple_chunks() {
        let proc = processor();
        let long_text = "word ".repeat(500);
        let doc = proc.process_bytes("/test/long.txt", long_text.as_bytes(), false).unwrap();
        assert!(doc.chunk_texts.len() > 1);
    }

    #[test]
    fn unsupported_extension_is_an_error_not_a_panic() {
        let proc = processor();
        let err = proc.process_bytes("/test/doc.docx", b"binary", false).unwrap_err();
        assert!(matches!(err, IndexerError::UnsupportedFormat(_)));
    }

    #[test]
    fn pdf_with_encrypt_token_is_detected() {
        let proc = processor();
        let mut bytes = b"%PDF-1.4\n".to_vec();
        bytes.extend_from_slice(b"trailer << /Encrypt 12 0 R >>");
        let err = proc.process_bytes("/test/secret.pdf", &bytes, true).unwrap_err();
        assert!(matches!(err, IndexerError::EncryptedPdf(_)));
    }

    #[test]
    fn unencrypted_pdf_without_ocr_is_unsupported() {
        let proc = processor();
        let err = proc.process_bytes("/test/plain.pdf", b"%PDF-1.4\n...", false).unwrap_err();
        assert!(matches!(err, IndexerError::UnsupportedFormat(_)));
    }

    #[test]
    fn metadata_includes_document_id_and_file_type() {
        let proc = processor();
        let doc = proc.process_bytes("/test/ml.txt", b"hello", false).unwrap();
        assert_eq!(doc.metadata.get("file_type").unwrap(), "txt");
        assert_eq!(doc.metadata.get("document_id").unwrap(), doc.document_id.as_str());
    }
}
