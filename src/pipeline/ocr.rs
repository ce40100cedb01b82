//! OCR: turn one page image into text.
//!
//! The default engine shells out to the `tesseract` command, exactly as a
//! user would: the page is PNG-encoded into a temporary file and tesseract
//! prints the recognised text to stdout. No confidence threshold, retry or
//! timeout is applied; whatever tesseract prints is the page text.

use crate::error::ConvertError;
use crate::pipeline::encode::encode_png;
use image::DynamicImage;
use std::io::{ErrorKind, Write};
use std::process::Command;
use tracing::{debug, warn};

/// Recognises text on a single page image.
pub trait OcrEngine: Send + Sync {
    /// Return the text found on `image` using language model `lang`.
    ///
    /// `page_num` is only used to label errors.
    fn recognize(
        &self,
        image: &DynamicImage,
        lang: &str,
        page_num: usize,
    ) -> Result<String, ConvertError>;
}

/// OCR engine driving the tesseract command-line tool.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    command: String,
}

impl Default for TesseractCli {
    fn default() -> Self {
        Self::new("tesseract")
    }
}

impl TesseractCli {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }
}

impl OcrEngine for TesseractCli {
    fn recognize(
        &self,
        image: &DynamicImage,
        lang: &str,
        page_num: usize,
    ) -> Result<String, ConvertError> {
        let png = encode_png(image).map_err(|e| ConvertError::TranscriptionFailed {
            page: page_num,
            detail: format!("PNG encoding failed: {}", e),
        })?;

        // The temp file is removed when `tmp` is dropped.
        let mut tmp = tempfile::Builder::new()
            .prefix("pdf2docx-page-")
            .suffix(".png")
            .tempfile()
            .map_err(|e| ConvertError::Internal(format!("tempfile: {e}")))?;
        tmp.write_all(&png)
            .and_then(|_| tmp.flush())
            .map_err(|e| ConvertError::Internal(format!("tempfile write: {e}")))?;

        let output = Command::new(&self.command)
            .arg(tmp.path())
            .arg("stdout")
            .arg("-l")
            .arg(lang)
            .output()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound | ErrorKind::PermissionDenied => {
                    ConvertError::OcrEngineUnavailable {
                        command: self.command.clone(),
                        detail: e.to_string(),
                    }
                }
                _ => ConvertError::TranscriptionFailed {
                    page: page_num,
                    detail: format!("failed to run {}: {}", self.command, e),
                },
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ConvertError::TranscriptionFailed {
                page: page_num,
                detail: format!("{} exited with {}: {}", self.command, output.status, stderr.trim()),
            });
        }

        // tesseract chats on stderr even on success (e.g. "Estimating resolution").
        if !output.stderr.is_empty() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.to_lowercase().contains("warning") {
                warn!("Page {}: {}", page_num, stderr.trim());
            } else {
                debug!("Page {}: {}", page_num, stderr.trim());
            }
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn blank_page() -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, Rgba([255, 255, 255, 255])))
    }

    #[test]
    fn missing_binary_is_engine_unavailable() {
        let engine = TesseractCli::new("pdf2docx-no-such-tesseract-binary");
        let err = engine.recognize(&blank_page(), "eng", 1).unwrap_err();
        match err {
            ConvertError::OcrEngineUnavailable { command, .. } => {
                assert_eq!(command, "pdf2docx-no-such-tesseract-binary")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn stdout_is_returned_verbatim() {
        // `echo` stands in for tesseract: it prints its arguments, which
        // start with the temp PNG path and end with the language code.
        let engine = TesseractCli::new("echo");
        let text = engine.recognize(&blank_page(), "spa", 1).unwrap();
        assert!(text.contains("pdf2docx-page-"), "got: {text:?}");
        assert!(text.trim_end().ends_with("stdout -l spa"), "got: {text:?}");
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_is_transcription_failure() {
        let engine = TesseractCli::new("false");
        let err = engine.recognize(&blank_page(), "eng", 4).unwrap_err();
        assert!(matches!(
            err,
            ConvertError::TranscriptionFailed { page: 4, .. }
        ));
    }
}
