//! PDF rasterisation: render pages to `DynamicImage`.
//!
//! The [`Rasterizer`] trait hands pages to a sink one at a time, in page
//! order, so only one page image is alive at once. At 300 DPI an A4 page is
//! roughly 2480 × 3508 px (≈35 MB as RGBA); buffering a whole book first
//! would need gigabytes.
//!
//! [`PdfiumRasterizer`] is the default implementation. pdfium is not
//! async-safe, so callers run it inside `tokio::task::spawn_blocking`.

use crate::error::ConvertError;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// PDF user space is 72 points per inch.
const POINTS_PER_INCH: f32 = 72.0;

/// One rasterised page. Dropped as soon as its text has been extracted.
pub struct PageImage {
    /// 1-indexed page number.
    pub page_num: usize,
    /// Total pages in the document.
    pub total_pages: usize,
    pub image: DynamicImage,
}

/// Receives each page image as it is rendered.
pub type PageSink<'a> = dyn FnMut(PageImage) -> Result<(), ConvertError> + 'a;

/// Converts a PDF file into an ordered sequence of page images.
pub trait Rasterizer: Send + Sync {
    /// Render every page of `pdf` at `dpi`, passing each to `sink` in order.
    ///
    /// Returns the number of pages rendered. An error from `sink` stops
    /// rendering and is returned unchanged.
    fn rasterize(&self, pdf: &Path, dpi: u32, sink: &mut PageSink<'_>)
        -> Result<usize, ConvertError>;
}

/// Rasteriser backed by the pdfium library.
#[derive(Debug, Clone, Default)]
pub struct PdfiumRasterizer {
    lib_dir: Option<PathBuf>,
}

impl PdfiumRasterizer {
    pub fn new(lib_dir: Option<PathBuf>) -> Self {
        Self { lib_dir }
    }

    /// Bind to pdfium: the configured location if any (a directory or the
    /// library file itself), otherwise the current directory and then the
    /// system library search path.
    fn bind(&self) -> Result<Pdfium, ConvertError> {
        let bindings = match self.lib_dir {
            Some(ref path) if path.is_file() => Pdfium::bind_to_library(path),
            Some(ref dir) => {
                Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir))
            }
            None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
                .or_else(|_| Pdfium::bind_to_system_library()),
        }
        .map_err(|e| ConvertError::PdfiumBindingFailed(format!("{:?}", e)))?;

        Ok(Pdfium::new(bindings))
    }
}

impl Rasterizer for PdfiumRasterizer {
    fn rasterize(
        &self,
        pdf: &Path,
        dpi: u32,
        sink: &mut PageSink<'_>,
    ) -> Result<usize, ConvertError> {
        let pdfium = self.bind()?;

        let document = pdfium
            .load_pdf_from_file(pdf, None)
            .map_err(|e| ConvertError::CorruptPdf {
                path: pdf.to_path_buf(),
                detail: format!("{:?}", e),
            })?;

        let pages = document.pages();
        let total_pages = pages.len() as usize;
        info!("PDF loaded: {} pages", total_pages);

        let render_config = PdfRenderConfig::new().scale_page_by_factor(scale_for_dpi(dpi));

        for idx in 0..total_pages {
            let page = pages
                .get(idx as u16)
                .map_err(|e| ConvertError::RasterisationFailed {
                    page: idx + 1,
                    detail: format!("{:?}", e),
                })?;

            let bitmap = page.render_with_config(&render_config).map_err(|e| {
                ConvertError::RasterisationFailed {
                    page: idx + 1,
                    detail: format!("{:?}", e),
                }
            })?;

            let image = bitmap.as_image();
            debug!(
                "Rendered page {} → {}x{} px",
                idx + 1,
                image.width(),
                image.height()
            );

            sink(PageImage {
                page_num: idx + 1,
                total_pages,
                image,
            })?;
        }

        Ok(total_pages)
    }
}

/// Scale factor from PDF points to pixels at `dpi`.
fn scale_for_dpi(dpi: u32) -> f32 {
    dpi as f32 / POINTS_PER_INCH
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_matches_dpi() {
        assert_eq!(scale_for_dpi(72), 1.0);
        assert_eq!(scale_for_dpi(144), 2.0);
        assert!((scale_for_dpi(300) - 4.1666665).abs() < 1e-5);
        assert_eq!(scale_for_dpi(0), 0.0);
    }
}
