//! # pdf2docx
//!
//! Convert scanned PDF documents into editable Word documents with a
//! clickable table of contents.
//!
//! Scanned PDFs carry no text layer, only page images. This crate rasterises
//! each page, runs OCR on it, and writes the recognised text into a .docx
//! file as one titled section per page. A TOC field at the top lets the word
//! processor build a linked table of contents on open.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input     check the file exists and is a PDF
//!  ├─ 2. Render    rasterise pages via pdfium (spawn_blocking, one page at a time)
//!  ├─ 3. OCR       tesseract on each page image, in page order
//!  ├─ 4. Assemble  TOC heading + field, then "Page N" heading + text per page
//!  └─ 5. Persist   .docx written atomically (temp file + rename)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2docx::{convert, ConversionConfig, ConversionRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::builder().language("eng").dpi(300).build()?;
//!     let request = ConversionRequest::new("scan.pdf", "scan.docx");
//!     let stats = convert(&request, &config).await?;
//!     eprintln!("{} pages ({} empty)", stats.total_pages, stats.empty_pages);
//!     Ok(())
//! }
//! ```
//!
//! Several documents at once, continuing past failures:
//!
//! ```rust,no_run
//! use pdf2docx::{run_batch, BatchPolicy, ConversionConfig};
//! use std::path::{Path, PathBuf};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let inputs = vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")];
//! let report = run_batch(&inputs, Path::new("out"), &ConversionConfig::default(),
//!     BatchPolicy::IsolateFailures).await?;
//! println!("{} converted, {} failed", report.succeeded(), report.failed());
//! # Ok(())
//! # }
//! ```
//!
//! ## External tools
//!
//! - **pdfium** shared library, found in `pdfium_lib_dir`, the current
//!   directory, or the system library path.
//! - **tesseract** on `PATH` (or `tesseract_cmd`), with the language data
//!   for the configured language installed.
//!
//! Either can be replaced by implementing [`Rasterizer`] or [`OcrEngine`].
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2docx` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod batch;
pub mod config;
pub mod convert;
pub mod docx;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use batch::{output_path_for, run_batch, run_batch_sync};
pub use config::{BatchPolicy, ConversionConfig, ConversionConfigBuilder, DocumentLabels};
pub use convert::{build_document, convert, convert_sync, transcribe};
pub use error::{ConvertError, ErrorKind};
pub use output::{
    BatchReport, BatchSummary, Block, ConversionRequest, ConversionStats, DocumentOutcome,
    DocumentSummary, OutputDocument, PageText,
};
pub use pipeline::ocr::{OcrEngine, TesseractCli};
pub use pipeline::render::{PageImage, PageSink, PdfiumRasterizer, Rasterizer};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
