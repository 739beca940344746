//! Error types for the pdf2notes library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`Pdf2NotesError`] — **Fatal**: the run cannot proceed at all (bad input
//!   file, invalid page selection, provider not configured). Returned as
//!   `Err(Pdf2NotesError)` from the top-level `narrate*` functions.
//!
//! * [`GenerationError`] — **Non-fatal**: the backend call for a single slide
//!   failed. It is recorded as that slide's
//!   [`crate::output::GenerationOutcome::Error`] and the run continues, so one
//!   bad slide never costs the rest of the deck.
//!
//! Per-slide extraction faults (garbled text layer, undecodable embedded
//! image) are not errors at all: extraction degrades to empty text / no
//! images and logs a warning.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdf2notes library.
///
/// Slide-level backend failures use [`GenerationError`] and are stored in the
/// [`crate::output::NarrationDocument`] rather than propagated here.
#[derive(Debug, Error)]
pub enum Pdf2NotesError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input string is not a valid file path or URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── Document errors ───────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}\nTry repairing with: qpdf --decrypt input.pdf output.pdf")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    // ── Page-selection errors ─────────────────────────────────────────────
    /// A token in the page-selection string is not an integer or a range.
    #[error("Invalid page token '{token}': expected a page number or START-END range")]
    InvalidPageToken { token: String },

    /// A range token has end < start.
    #[error("Invalid page range '{start}-{end}': start must be <= end")]
    InvalidPageRange { start: usize, end: usize },

    /// A selected page falls outside the document.
    #[error("Page {page} is out of range (document has {total} pages, numbering starts at 1)")]
    PageOutOfBounds { page: usize, total: usize },

    // ── Backend errors ────────────────────────────────────────────────────
    /// The configured provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Pdf2NotesError {
    /// True when the error means the document itself could not be opened or
    /// read. The CLI maps these to a distinguished exit status.
    pub fn is_document_error(&self) -> bool {
        matches!(
            self,
            Pdf2NotesError::FileNotFound { .. }
                | Pdf2NotesError::PermissionDenied { .. }
                | Pdf2NotesError::NotAPdf { .. }
                | Pdf2NotesError::CorruptPdf { .. }
                | Pdf2NotesError::PasswordRequired { .. }
                | Pdf2NotesError::WrongPassword { .. }
        )
    }
}

/// A backend failure for a single slide.
///
/// The pipeline treats every backend fault identically — auth, quota,
/// network, malformed response — and never retries. The message is whatever
/// the provider reported.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
#[error("{0}")]
pub struct GenerationError(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_out_of_bounds_display() {
        let e = Pdf2NotesError::PageOutOfBounds { page: 12, total: 8 };
        let msg = e.to_string();
        assert!(msg.contains("Page 12"), "got: {msg}");
        assert!(msg.contains("8 pages"), "got: {msg}");
    }

    #[test]
    fn invalid_range_display() {
        let e = Pdf2NotesError::InvalidPageRange { start: 3, end: 1 };
        assert!(e.to_string().contains("3-1"));
    }

    #[test]
    fn document_errors_are_classified() {
        let corrupt = Pdf2NotesError::CorruptPdf {
            path: "deck.pdf".into(),
            detail: "bad xref".into(),
        };
        assert!(corrupt.is_document_error());

        let selection = Pdf2NotesError::InvalidPageToken { token: "x".into() };
        assert!(!selection.is_document_error());
    }

    #[test]
    fn generation_error_is_opaque() {
        let e = GenerationError("HTTP 429 from backend".into());
        assert_eq!(e.to_string(), "HTTP 429 from backend");
    }
}
