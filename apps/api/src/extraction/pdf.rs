use std::panic::{self, AssertUnwindSafe};

use super::{DocumentFormat, ExtractError};

/// Concatenates the text of every page in page order. Pages without text are skipped.
pub fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractError> {
    // pdf-extract panics on some malformed inputs instead of returning an error.
    let pages = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(bytes)
    }))
    .map_err(|_| unreadable("parser aborted on malformed document".to_string()))?
    .map_err(|e| unreadable(e.to_string()))?;

    Ok(join_pages(pages))
}

fn join_pages(pages: Vec<String>) -> String {
    pages
        .iter()
        .map(|page| page.trim())
        .filter(|page| !page.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn unreadable(reason: String) -> ExtractError {
    ExtractError::Unreadable {
        format: DocumentFormat::Pdf,
        reason,
    }
}
