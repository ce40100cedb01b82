//! Configuration types for scanned-PDF-to-Word conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. One config is shared by every document
//! of a batch; the per-document paths live in
//! [`crate::output::ConversionRequest`].

use crate::error::ConvertError;
use crate::pipeline::ocr::OcrEngine;
use crate::pipeline::render::Rasterizer;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Default author written to the document's core properties.
pub const DEFAULT_AUTHOR: &str = env!("CARGO_PKG_NAME");

/// Configuration for a scanned-PDF-to-Word conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use pdf2docx::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .dpi(200)
///     .language("eng")
///     .build()
///     .unwrap();
/// assert_eq!(config.dpi, 200);
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Rendering DPI used when rasterising each PDF page. Default: 300.
    ///
    /// Not range-checked: the value is handed to the rasteriser as-is, and a
    /// degenerate value surfaces as a rasterisation error for that document.
    pub dpi: u32,

    /// OCR language code, e.g. "spa", "eng", "spa+eng". Default: "spa".
    pub language: String,

    /// Emit a `Processing page i/total` line at DEBUG level for every page.
    /// When false those lines are not emitted at all. Default: true.
    ///
    /// The library never installs a subscriber; [`ConversionConfig::log_filter`]
    /// tells the caller which level to configure.
    pub verbose: bool,

    /// Heading and title wording written into the document.
    pub labels: DocumentLabels,

    /// Author recorded in the document's core properties.
    pub author: String,

    /// Ask the word processor to refresh fields (the TOC) when the file opens.
    /// Default: true.
    pub update_fields_on_open: bool,

    /// Command used to run tesseract. Default: "tesseract".
    pub tesseract_cmd: String,

    /// Directory containing the pdfium shared library. If None, the current
    /// directory and then the system library path are tried.
    pub pdfium_lib_dir: Option<PathBuf>,

    /// Pre-constructed rasteriser. Takes precedence over the pdfium default.
    pub rasterizer: Option<Arc<dyn Rasterizer>>,

    /// Pre-constructed OCR engine. Takes precedence over tesseract.
    pub ocr_engine: Option<Arc<dyn OcrEngine>>,

    /// Per-page progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            dpi: 300,
            language: "spa".to_string(),
            verbose: true,
            labels: DocumentLabels::default(),
            author: DEFAULT_AUTHOR.to_string(),
            update_fields_on_open: true,
            tesseract_cmd: "tesseract".to_string(),
            pdfium_lib_dir: None,
            rasterizer: None,
            ocr_engine: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("dpi", &self.dpi)
            .field("language", &self.language)
            .field("verbose", &self.verbose)
            .field("labels", &self.labels)
            .field("author", &self.author)
            .field("update_fields_on_open", &self.update_fields_on_open)
            .field("tesseract_cmd", &self.tesseract_cmd)
            .field("pdfium_lib_dir", &self.pdfium_lib_dir)
            .field("rasterizer", &self.rasterizer.as_ref().map(|_| "<dyn Rasterizer>"))
            .field("ocr_engine", &self.ocr_engine.as_ref().map(|_| "<dyn OcrEngine>"))
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// Log filter directive matching `verbose`: "debug" or "info".
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi;
        self
    }

    pub fn language(mut self, lang: impl Into<String>) -> Self {
        self.config.language = lang.into();
        self
    }

    pub fn verbose(mut self, v: bool) -> Self {
        self.config.verbose = v;
        self
    }

    pub fn labels(mut self, labels: DocumentLabels) -> Self {
        self.config.labels = labels;
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.config.author = author.into();
        self
    }

    pub fn update_fields_on_open(mut self, v: bool) -> Self {
        self.config.update_fields_on_open = v;
        self
    }

    pub fn tesseract_cmd(mut self, cmd: impl Into<String>) -> Self {
        self.config.tesseract_cmd = cmd.into();
        self
    }

    pub fn pdfium_lib_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.pdfium_lib_dir = Some(dir.into());
        self
    }

    pub fn rasterizer(mut self, rasterizer: Arc<dyn Rasterizer>) -> Self {
        self.config.rasterizer = Some(rasterizer);
        self
    }

    pub fn ocr_engine(mut self, engine: Arc<dyn OcrEngine>) -> Self {
        self.config.ocr_engine = Some(engine);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, ConvertError> {
        let c = &self.config;
        if c.language.trim().is_empty() {
            return Err(ConvertError::InvalidConfig(
                "OCR language code must not be empty".into(),
            ));
        }
        if c.tesseract_cmd.trim().is_empty() {
            return Err(ConvertError::InvalidConfig(
                "tesseract command must not be empty".into(),
            ));
        }
        c.labels.validate()?;
        Ok(self.config)
    }
}

// ── Labels ───────────────────────────────────────────────────────────────

/// Fixed wording placed into the generated document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentLabels {
    /// Heading placed above the TOC field.
    pub toc_heading: String,
    /// Per-page heading prefix; the 1-based page number is appended.
    pub page_prefix: String,
    /// Document title prefix; the source file name is appended.
    pub title_prefix: String,
}

impl Default for DocumentLabels {
    fn default() -> Self {
        Self::english()
    }
}

impl DocumentLabels {
    pub fn english() -> Self {
        Self {
            toc_heading: "Table of Contents".to_string(),
            page_prefix: "Page".to_string(),
            title_prefix: "Conversion of".to_string(),
        }
    }

    pub fn spanish() -> Self {
        Self {
            toc_heading: "Tabla de Contenidos".to_string(),
            page_prefix: "Página".to_string(),
            title_prefix: "Conversión de".to_string(),
        }
    }

    /// Heading text for page `page_num` (1-based), e.g. "Page 3".
    pub fn page_heading(&self, page_num: usize) -> String {
        format!("{} {}", self.page_prefix, page_num)
    }

    /// Document title for a source file name, e.g. "Conversion of scan.pdf".
    pub fn title(&self, file_name: &str) -> String {
        format!("{} {}", self.title_prefix, file_name)
    }

    fn validate(&self) -> Result<(), ConvertError> {
        if self.toc_heading.trim().is_empty() || self.page_prefix.trim().is_empty() {
            return Err(ConvertError::InvalidConfig(
                "Heading labels must not be empty".into(),
            ));
        }
        Ok(())
    }
}

// ── Batch policy ─────────────────────────────────────────────────────────

/// What the batch driver does after a document fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BatchPolicy {
    /// Log the failure and move on to the next input, whatever the cause. (default)
    #[default]
    IsolateFailures,
    /// Only input-resolution and save failures are contained; a rasterisation
    /// or OCR failure stops the remaining batch.
    HaltOnPipelineFailure,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_cli_defaults() {
        let c = ConversionConfig::default();
        assert_eq!(c.dpi, 300);
        assert_eq!(c.language, "spa");
        assert!(c.verbose);
        assert!(c.update_fields_on_open);
        assert_eq!(c.author, "pdf2docx");
        assert_eq!(c.labels, DocumentLabels::english());
    }

    #[test]
    fn dpi_is_passed_through_unvalidated() {
        let c = ConversionConfig::builder().dpi(0).build().unwrap();
        assert_eq!(c.dpi, 0);
        let c = ConversionConfig::builder().dpi(5000).build().unwrap();
        assert_eq!(c.dpi, 5000);
    }

    #[test]
    fn empty_language_is_rejected() {
        let err = ConversionConfig::builder().language("  ").build().unwrap_err();
        assert!(matches!(err, ConvertError::InvalidConfig(_)));
    }

    #[test]
    fn empty_labels_are_rejected() {
        let labels = DocumentLabels {
            toc_heading: String::new(),
            ..DocumentLabels::english()
        };
        assert!(ConversionConfig::builder().labels(labels).build().is_err());
    }

    #[test]
    fn log_filter_follows_verbose() {
        let c = ConversionConfig::builder().verbose(false).build().unwrap();
        assert_eq!(c.log_filter(), "info");
        assert_eq!(ConversionConfig::default().log_filter(), "debug");
    }

    #[test]
    fn label_rendering() {
        let en = DocumentLabels::english();
        assert_eq!(en.page_heading(3), "Page 3");
        assert_eq!(en.title("scan.pdf"), "Conversion of scan.pdf");

        let es = DocumentLabels::spanish();
        assert_eq!(es.page_heading(1), "Página 1");
        assert_eq!(es.title("a.pdf"), "Conversión de a.pdf");
    }

    #[test]
    fn debug_hides_trait_objects() {
        let dbg = format!("{:?}", ConversionConfig::default());
        assert!(dbg.contains("dpi: 300"));
        assert!(dbg.contains("rasterizer: None"));
    }
}
