//! Data carried between pipeline stages and returned to callers.
//!
//! ```text
//! ConversionRequest ──▶ PageText* ──▶ OutputDocument ──▶ .docx on disk
//!                                                     └─▶ ConversionStats
//! ```

use crate::error::{ConvertError, ErrorKind};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One document to convert: where to read it and where to write the result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionRequest {
    pub source: PathBuf,
    pub output: PathBuf,
}

impl ConversionRequest {
    pub fn new(source: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            output: output.into(),
        }
    }

    /// File name of the source, used for the document title.
    pub fn source_name(&self) -> String {
        self.source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.source.display().to_string())
    }
}

/// Recognised text of one page, in original page order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageText {
    /// 1-indexed page number.
    pub page_num: usize,
    /// OCR output, verbatim (may be empty).
    pub text: String,
}

/// One element of the output document body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// Heading paragraph at outline `level` (1 = top level).
    Heading {
        text: String,
        level: u8,
        centered: bool,
    },
    /// Table-of-contents field, resolved by the word processor.
    TocField { instruction: String },
    /// Plain body paragraph.
    Paragraph { text: String },
    /// Explicit page break.
    PageBreak,
}

/// The assembled document, ready to be serialised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputDocument {
    pub title: String,
    pub author: String,
    /// Whether the package asks the word processor to refresh fields on open.
    pub update_fields_on_open: bool,
    pub blocks: Vec<Block>,
}

impl OutputDocument {
    /// Number of per-page sections (centered headings).
    pub fn section_count(&self) -> usize {
        self.blocks
            .iter()
            .filter(|b| matches!(b, Block::Heading { centered: true, .. }))
            .count()
    }
}

/// Per-document statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Pages in the source PDF (= sections in the output).
    pub total_pages: usize,
    /// Pages whose OCR output was empty or whitespace only.
    pub empty_pages: usize,
    /// Bytes written to the output file.
    pub output_bytes: u64,
    /// Wall-clock time spent rasterising and recognising, in ms.
    pub transcribe_duration_ms: u64,
    /// Total wall-clock time for the document, in ms.
    pub total_duration_ms: u64,
}

/// Result of one document within a batch.
#[derive(Debug)]
pub struct DocumentOutcome {
    pub source: PathBuf,
    pub output: PathBuf,
    pub result: Result<ConversionStats, ConvertError>,
}

impl DocumentOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Result of a whole batch.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// One entry per attempted input, in input order.
    pub outcomes: Vec<DocumentOutcome>,
    /// Inputs never attempted because the batch halted.
    pub skipped: Vec<PathBuf>,
    /// True when a failure stopped the batch early.
    pub halted: bool,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    /// Look up the outcome for a given source path.
    pub fn outcome_for(&self, source: &Path) -> Option<&DocumentOutcome> {
        self.outcomes.iter().find(|o| o.source == source)
    }

    /// Serialisable view of the report (errors rendered to strings).
    pub fn summary(&self) -> BatchSummary {
        BatchSummary {
            succeeded: self.succeeded(),
            failed: self.failed(),
            halted: self.halted,
            skipped: self.skipped.clone(),
            documents: self
                .outcomes
                .iter()
                .map(|o| DocumentSummary {
                    source: o.source.clone(),
                    output: o.output.clone(),
                    stats: o.result.as_ref().ok().cloned(),
                    error_kind: o.result.as_ref().err().map(ConvertError::kind),
                    error: o.result.as_ref().err().map(|e| e.to_string()),
                })
                .collect(),
        }
    }
}

/// JSON-friendly form of [`BatchReport`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub halted: bool,
    pub skipped: Vec<PathBuf>,
    pub documents: Vec<DocumentSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub source: PathBuf,
    pub output: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<ConversionStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_name_is_file_name() {
        let req = ConversionRequest::new("/scans/2024/invoice.pdf", "/out/invoice.docx");
        assert_eq!(req.source_name(), "invoice.pdf");
    }

    #[test]
    fn summary_renders_errors() {
        let report = BatchReport {
            outcomes: vec![
                DocumentOutcome {
                    source: "a.pdf".into(),
                    output: "out/a.docx".into(),
                    result: Ok(ConversionStats {
                        total_pages: 2,
                        ..Default::default()
                    }),
                },
                DocumentOutcome {
                    source: "b.pdf".into(),
                    output: "out/b.docx".into(),
                    result: Err(ConvertError::FileNotFound {
                        path: "b.pdf".into(),
                    }),
                },
            ],
            skipped: vec![],
            halted: false,
        };

        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failed(), 1);

        let json = serde_json::to_value(report.summary()).unwrap();
        assert_eq!(json["succeeded"], 1);
        assert_eq!(json["documents"][0]["stats"]["total_pages"], 2);
        assert_eq!(json["documents"][1]["error_kind"], "input_not_found");
        assert!(json["documents"][1]["error"]
            .as_str()
            .unwrap()
            .contains("b.pdf"));
    }

    #[test]
    fn section_count_ignores_toc_heading() {
        let doc = OutputDocument {
            title: "t".into(),
            author: "a".into(),
            update_fields_on_open: false,
            blocks: vec![
                Block::Heading {
                    text: "Table of Contents".into(),
                    level: 1,
                    centered: false,
                },
                Block::TocField {
                    instruction: "TOC".into(),
                },
                Block::Heading {
                    text: "Page 1".into(),
                    level: 1,
                    centered: true,
                },
                Block::Paragraph { text: "x".into() },
            ],
        };
        assert_eq!(doc.section_count(), 1);
    }
}
