//! Error types for the pdf2docx library.
//!
//! A single error enum, [`ConvertError`], covers every way one document's
//! conversion can fail. Each variant is classified by [`ConvertError::kind`]
//! into the pipeline stage that produced it, which is what the batch driver
//! looks at when deciding whether to keep going (see
//! [`crate::config::BatchPolicy`]).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the pdf2docx library.
#[derive(Debug, Error)]
pub enum ConvertError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF not found: '{path}'")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── Rasterisation errors ──────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\
Set PDFIUM_LIB_PATH (or --pdfium-lib) to the directory containing libpdfium."
    )]
    PdfiumBindingFailed(String),

    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// The rasteriser failed on a specific page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    // ── OCR errors ────────────────────────────────────────────────────────
    /// The OCR engine could not be started at all.
    #[error("OCR engine '{command}' could not be started: {detail}\nIs tesseract installed and on PATH?")]
    OcrEngineUnavailable { command: String, detail: String },

    /// The OCR engine ran but reported a failure for one page.
    #[error("OCR failed for page {page}: {detail}")]
    TranscriptionFailed { page: usize, detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create the output directory.
    #[error("Failed to create output directory '{path}': {source}")]
    OutputDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not serialise or write the output document.
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

/// Pipeline stage an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The source PDF could not be resolved.
    InputNotFound,
    /// The PDF could not be turned into page images.
    RasterizationFailure,
    /// The OCR engine failed on a page.
    TranscriptionFailure,
    /// The output document could not be written.
    PersistFailure,
    /// Configuration or internal failures.
    Other,
}

impl ConvertError {
    /// Classify this error by the pipeline stage that produced it.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConvertError::FileNotFound { .. }
            | ConvertError::PermissionDenied { .. }
            | ConvertError::NotAPdf { .. } => ErrorKind::InputNotFound,
            ConvertError::PdfiumBindingFailed(_)
            | ConvertError::CorruptPdf { .. }
            | ConvertError::RasterisationFailed { .. } => ErrorKind::RasterizationFailure,
            ConvertError::OcrEngineUnavailable { .. } | ConvertError::TranscriptionFailed { .. } => {
                ErrorKind::TranscriptionFailure
            }
            ConvertError::OutputDirFailed { .. } | ConvertError::OutputWriteFailed { .. } => {
                ErrorKind::PersistFailure
            }
            ConvertError::InvalidConfig(_) | ConvertError::Internal(_) => ErrorKind::Other,
        }
    }

    /// True for failures that only ever concern the current document
    /// (input resolution and saving).
    pub fn is_document_scoped(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::InputNotFound | ErrorKind::PersistFailure
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_not_found_display() {
        let e = ConvertError::FileNotFound {
            path: PathBuf::from("/tmp/missing.pdf"),
        };
        assert!(e.to_string().contains("/tmp/missing.pdf"), "got: {e}");
    }

    #[test]
    fn transcription_display_names_page() {
        let e = ConvertError::TranscriptionFailed {
            page: 7,
            detail: "Failed loading language 'xyz'".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("page 7"));
        assert!(msg.contains("xyz"));
    }

    #[test]
    fn kinds_follow_pipeline_stage() {
        let missing = ConvertError::FileNotFound {
            path: PathBuf::from("a.pdf"),
        };
        let corrupt = ConvertError::CorruptPdf {
            path: PathBuf::from("a.pdf"),
            detail: "bad xref".into(),
        };
        let ocr = ConvertError::OcrEngineUnavailable {
            command: "tesseract".into(),
            detail: "not found".into(),
        };
        let write = ConvertError::OutputWriteFailed {
            path: PathBuf::from("out.docx"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };

        assert_eq!(missing.kind(), ErrorKind::InputNotFound);
        assert_eq!(corrupt.kind(), ErrorKind::RasterizationFailure);
        assert_eq!(ocr.kind(), ErrorKind::TranscriptionFailure);
        assert_eq!(write.kind(), ErrorKind::PersistFailure);
        assert_eq!(ConvertError::Internal("x".into()).kind(), ErrorKind::Other);
    }

    #[test]
    fn only_input_and_persist_are_document_scoped() {
        assert!(ConvertError::FileNotFound {
            path: PathBuf::from("a.pdf")
        }
        .is_document_scoped());
        assert!(ConvertError::OutputWriteFailed {
            path: PathBuf::from("a.docx"),
            source: std::io::Error::other("disk full"),
        }
        .is_document_scoped());
        assert!(!ConvertError::RasterisationFailed {
            page: 1,
            detail: "boom".into()
        }
        .is_document_scoped());
        assert!(!ConvertError::TranscriptionFailed {
            page: 1,
            detail: "boom".into()
        }
        .is_document_scoped());
    }
}
