//! Pipeline stages for scanned-PDF-to-DOCX conversion.
//!
//! Each submodule implements exactly one step.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ render ──▶ ocr ──▶ assemble ──▶ persist
//! (path)    (pdfium)  (tesseract) (blocks)  (.docx)
//! ```
//!
//! 1. [`input`]    — check the path exists and looks like a PDF
//! 2. [`render`]   — rasterise pages one at a time; runs in `spawn_blocking`
//!    because pdfium is not async-safe
//! 3. [`encode`]   — PNG-encode a page image for the OCR engine
//! 4. [`ocr`]      — recognise the text on one page image
//! 5. [`assemble`] — TOC heading + field, then one section per page
//! 6. [`persist`]  — serialise to .docx and write atomically

pub mod assemble;
pub mod encode;
pub mod input;
pub mod ocr;
pub mod persist;
pub mod render;
