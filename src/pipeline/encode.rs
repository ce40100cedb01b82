//! Image encoding: `DynamicImage` → PNG bytes for the OCR engine.
//!
//! PNG is lossless; JPEG artefacts around glyph edges measurably hurt
//! tesseract accuracy on scanned text.

use image::DynamicImage;
use std::io::Cursor;
use tracing::debug;

/// Encode a rasterised page as PNG.
pub fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;

    debug!(
        "Encoded {}x{} page → {} bytes PNG",
        img.width(),
        img.height(),
        buf.len()
    );

    Ok(buf)
}
