//! Text extraction: turns an uploaded resume (PDF, DOCX, plain text) or pasted text
//! into a single non-empty UTF-8 string.
//!
//! Everything here is a pure transformation over in-memory bytes. PDF parsing is
//! CPU-bound; async callers run `extract` inside `tokio::task::spawn_blocking`.

use std::fmt;
use std::path::Path;

use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;

mod docx;
mod pdf;
mod text;

/// One uploaded document or one pasted text, alive for a single request.
#[derive(Debug, Clone)]
pub enum RawInput {
    /// File bytes; the extension of `filename` declares the format.
    File { filename: String, bytes: Bytes },
    /// Text that needs no decoding, only the emptiness check.
    Text(String),
}

impl RawInput {
    pub fn file(filename: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        RawInput::File {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }

    /// Reads a document from disk. The handle is closed before this returns.
    #[allow(dead_code)]
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(RawInput::file(filename, bytes))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFormat {
    Pdf,
    Docx,
    PlainText,
}

impl DocumentFormat {
    /// Detects the format from the filename's extension, case-insensitively.
    pub fn from_filename(filename: &str) -> Result<Self, ExtractError> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("pdf") => Ok(DocumentFormat::Pdf),
            Some("docx") => Ok(DocumentFormat::Docx),
            Some("txt" | "text" | "md") => Ok(DocumentFormat::PlainText),
            Some(other) => Err(ExtractError::UnsupportedFormat(format!(".{other}"))),
            None => Err(ExtractError::UnsupportedFormat(
                "file has no extension".to_string(),
            )),
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DocumentFormat::Pdf => "PDF",
            DocumentFormat::Docx => "DOCX",
            DocumentFormat::PlainText => "plain text",
        };
        f.write_str(label)
    }
}

/// Input errors. All of them are the caller's to fix; none is retried.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("unsupported file format: {0} (expected .pdf, .docx or .txt)")]
    UnsupportedFormat(String),

    #[error("no text could be extracted from the document")]
    EmptyContent,

    #[error("could not read {format} document: {reason}")]
    Unreadable {
        format: DocumentFormat,
        reason: String,
    },
}

/// Extracted resume text. Never empty or whitespace-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText(String);

impl ExtractedText {
    /// Trims `raw` and rejects it if nothing is left.
    pub fn new(raw: &str) -> Result<Self, ExtractError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ExtractError::EmptyContent);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }
}

impl AsRef<str> for ExtractedText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Extracts the text of `input`, enforcing the non-empty post-condition.
pub fn extract(input: &RawInput) -> Result<ExtractedText, ExtractError> {
    match input {
        RawInput::Text(text) => ExtractedText::new(text),
        RawInput::File { filename, bytes } => {
            let raw = match DocumentFormat::from_filename(filename)? {
                DocumentFormat::Pdf => pdf::extract_pdf(bytes)?,
                DocumentFormat::Docx => docx::extract_docx(bytes)?,
                DocumentFormat::PlainText => text::decode_text(bytes)?,
            };
            ExtractedText::new(&raw)
        }
    }
}
