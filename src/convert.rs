//! Single-document conversion entry points.
//!
//! [`convert`] runs the whole pipeline for one [`ConversionRequest`] and
//! returns an explicit result; nothing is swallowed. Input-resolution and
//! save failures are logged here, at the point they occur, so a caller that
//! only looks at logs still sees them.

use crate::config::ConversionConfig;
use crate::error::ConvertError;
use crate::output::{ConversionRequest, ConversionStats, OutputDocument, PageText};
use crate::pipeline::ocr::{OcrEngine, TesseractCli};
use crate::pipeline::render::{PageImage, PdfiumRasterizer, Rasterizer};
use crate::pipeline::{assemble, input, persist};
use std::error::Error as _;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// Convert one scanned PDF into a .docx file.
///
/// Steps: resolve the input, rasterise and OCR every page in order,
/// assemble the document, then write it to `request.output` (overwriting).
///
/// # Errors
/// The first failure of any stage, classified by [`ConvertError::kind`].
/// No output file is created when the input cannot be resolved.
pub async fn convert(
    request: &ConversionRequest,
    config: &ConversionConfig,
) -> Result<ConversionStats, ConvertError> {
    let total_start = Instant::now();

    if let Some(ref cb) = config.progress_callback {
        cb.on_document_start(&request.source);
    }

    // ── Step 1: Resolve, rasterise, OCR ──────────────────────────────────
    let transcribe_start = Instant::now();
    let pages = transcribe(&request.source, config).await?;
    let transcribe_duration_ms = transcribe_start.elapsed().as_millis() as u64;

    // ── Step 2: Assemble ─────────────────────────────────────────────────
    let doc = assemble::assemble_document(&request.source_name(), &pages, config);

    // ── Step 3: Save ─────────────────────────────────────────────────────
    let output_bytes = match persist::save(&doc, &request.output).await {
        Ok(n) => n,
        Err(e) => {
            let cause = e.source().map(|s| s.to_string()).unwrap_or_else(|| e.to_string());
            error!("Failed to save {}: {}", request.output.display(), cause);
            return Err(e);
        }
    };
    info!("Saved: {}", request.output.display());

    if let Some(ref cb) = config.progress_callback {
        cb.on_document_complete(&request.output, pages.len());
    }

    Ok(ConversionStats {
        total_pages: pages.len(),
        empty_pages: pages.iter().filter(|p| p.text.trim().is_empty()).count(),
        output_bytes,
        transcribe_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    })
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    request: &ConversionRequest,
    config: &ConversionConfig,
) -> Result<ConversionStats, ConvertError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ConvertError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert(request, config))
}

/// Run the pipeline up to assembly and return the document without
/// writing it anywhere.
pub async fn build_document(
    source: &Path,
    config: &ConversionConfig,
) -> Result<OutputDocument, ConvertError> {
    let pages = transcribe(source, config).await?;
    let name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| source.display().to_string());
    Ok(assemble::assemble_document(&name, &pages, config))
}

/// Resolve `source`, then rasterise and OCR its pages in page order.
///
/// Pages stream from the rasteriser straight into the OCR engine, so at most
/// one page image is held at a time. Both run on the blocking thread pool.
pub async fn transcribe(
    source: &Path,
    config: &ConversionConfig,
) -> Result<Vec<PageText>, ConvertError> {
    let pdf_path = match input::resolve_input(source) {
        Ok(p) => p,
        Err(e) => {
            error!("{}", e);
            return Err(e);
        }
    };

    let name = pdf_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    info!("Converting {} to images (DPI={})", name, config.dpi);

    let rasterizer = resolve_rasterizer(config);
    let engine = resolve_ocr_engine(config);
    let lang = config.language.clone();
    let dpi = config.dpi;
    let verbose = config.verbose;
    let progress = config.progress_callback.clone();
    // The blocking pool does not inherit a scoped subscriber; carry it over.
    let dispatch = tracing::dispatcher::get_default(|d| d.clone());

    tokio::task::spawn_blocking(move || {
        tracing::dispatcher::with_default(&dispatch, || {
            let mut pages = Vec::new();
            let mut on_page = |page: PageImage| -> Result<(), ConvertError> {
                if verbose {
                    debug!("Processing page {}/{}", page.page_num, page.total_pages);
                }
                if let Some(ref cb) = progress {
                    cb.on_page_start(page.page_num, page.total_pages);
                }

                let text = engine.recognize(&page.image, &lang, page.page_num)?;

                if let Some(ref cb) = progress {
                    cb.on_page_complete(page.page_num, page.total_pages, text.chars().count());
                }
                pages.push(PageText {
                    page_num: page.page_num,
                    text,
                });
                Ok(())
            };
            rasterizer.rasterize(&pdf_path, dpi, &mut on_page)?;
            Ok::<_, ConvertError>(pages)
        })
    })
    .await
    .map_err(|e| ConvertError::Internal(format!("Page processing task panicked: {}", e)))?
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Injected rasteriser, or pdfium bound per `pdfium_lib_dir`.
fn resolve_rasterizer(config: &ConversionConfig) -> Arc<dyn Rasterizer> {
    match config.rasterizer {
        Some(ref r) => Arc::clone(r),
        None => Arc::new(PdfiumRasterizer::new(config.pdfium_lib_dir.clone())),
    }
}

/// Injected OCR engine, or the tesseract CLI named by `tesseract_cmd`.
fn resolve_ocr_engine(config: &ConversionConfig) -> Arc<dyn OcrEngine> {
    match config.ocr_engine {
        Some(ref e) => Arc::clone(e),
        None => Arc::new(TesseractCli::new(config.tesseract_cmd.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_engines_follow_config() {
        let config = ConversionConfig::builder()
            .tesseract_cmd("/opt/tess/bin/tesseract")
            .build()
            .unwrap();
        // Trait objects are opaque; check the resolved engine behaves like
        // the configured binary by forcing a spawn failure.
        let engine = resolve_ocr_engine(&config);
        let img = image::DynamicImage::new_rgb8(2, 2);
        let err = engine.recognize(&img, "eng", 1).unwrap_err();
        match err {
            ConvertError::OcrEngineUnavailable { command, .. } => {
                assert_eq!(command, "/opt/tess/bin/tesseract")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn missing_input_creates_no_output() {
        let dir = tempfile::tempdir().unwrap();
        let request = ConversionRequest::new(dir.path().join("nope.pdf"), dir.path().join("nope.docx"));
        let err = convert(&request, &ConversionConfig::default()).await.unwrap_err();
        assert!(matches!(err, ConvertError::FileNotFound { .. }));
        assert!(!request.output.exists());
    }
}
