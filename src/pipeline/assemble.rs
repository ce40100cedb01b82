//! Document assembly: page texts → [`OutputDocument`].
//!
//! Layout, in order:
//!
//! ```text
//! Heading 1  "Table of Contents"
//! TOC field  TOC \h \z \u
//! Heading 1  "Page 1"  (centered)
//! Paragraph  <page 1 text>
//! PageBreak
//! Heading 1  "Page 2"  (centered)
//! Paragraph  <page 2 text>
//! …
//! ```
//!
//! The TOC heading sits at the same outline level the field scans, so the
//! rendered table lists "Table of Contents" as its own first entry.

use crate::config::ConversionConfig;
use crate::output::{Block, OutputDocument, PageText};

/// Field instruction: hyperlinked entries, hide page numbers in web view,
/// use paragraph outline levels.
pub const TOC_INSTRUCTION: &str = r"TOC \h \z \u";

/// Outline level for the TOC heading and every page heading.
pub const SECTION_LEVEL: u8 = 1;

/// Build the output document for `source_name` from pages in page order.
///
/// Every page produces a section, including pages whose text is empty.
pub fn assemble_document(
    source_name: &str,
    pages: &[PageText],
    config: &ConversionConfig,
) -> OutputDocument {
    let labels = &config.labels;
    let mut blocks = Vec::with_capacity(2 + pages.len() * 3);

    blocks.push(Block::Heading {
        text: labels.toc_heading.clone(),
        level: SECTION_LEVEL,
        centered: false,
    });
    blocks.push(Block::TocField {
        instruction: TOC_INSTRUCTION.to_string(),
    });

    for (i, page) in pages.iter().enumerate() {
        if i > 0 {
            blocks.push(Block::PageBreak);
        }
        blocks.push(Block::Heading {
            text: labels.page_heading(page.page_num),
            level: SECTION_LEVEL,
            centered: true,
        });
        blocks.push(Block::Paragraph {
            text: page.text.clone(),
        });
    }

    OutputDocument {
        title: labels.title(source_name),
        author: config.author.clone(),
        update_fields_on_open: config.update_fields_on_open,
        blocks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DocumentLabels;

    fn pages(texts: &[&str]) -> Vec<PageText> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| PageText {
                page_num: i + 1,
                text: t.to_string(),
            })
            .collect()
    }

    #[test]
    fn toc_comes_first_and_once() {
        let doc = assemble_document("a.pdf", &pages(&["x", "y"]), &ConversionConfig::default());

        assert_eq!(
            doc.blocks[0],
            Block::Heading {
                text: "Table of Contents".into(),
                level: 1,
                centered: false
            }
        );
        assert_eq!(
            doc.blocks[1],
            Block::TocField {
                instruction: r"TOC \h \z \u".into()
            }
        );
        let toc_count = doc
            .blocks
            .iter()
            .filter(|b| matches!(b, Block::TocField { .. }))
            .count();
        assert_eq!(toc_count, 1);
    }

    #[test]
    fn page_breaks_only_between_sections() {
        let doc = assemble_document(
            "a.pdf",
            &pages(&["one", "two", "three"]),
            &ConversionConfig::default(),
        );

        let body = &doc.blocks[2..];
        assert!(matches!(body[0], Block::Heading { .. }), "no leading break");
        let breaks = body.iter().filter(|b| matches!(b, Block::PageBreak)).count();
        assert_eq!(breaks, 2);

        // Each break is immediately followed by a page heading.
        for w in body.windows(2) {
            if matches!(w[0], Block::PageBreak) {
                assert!(matches!(w[1], Block::Heading { centered: true, .. }));
            }
        }
        assert!(!matches!(body.last(), Some(Block::PageBreak)));
    }

    #[test]
    fn sections_follow_page_order() {
        let doc = assemble_document(
            "scan.pdf",
            &pages(&["Alpha", "Beta", "Gamma"]),
            &ConversionConfig::default(),
        );

        let headings: Vec<&str> = doc
            .blocks
            .iter()
            .filter_map(|b| match b {
                Block::Heading {
                    text,
                    centered: true,
                    ..
                } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(headings, ["Page 1", "Page 2", "Page 3"]);

        let bodies: Vec<&str> = doc
            .blocks
            .iter()
            .filter_map(|b| match b {
                Block::Paragraph { text } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(bodies, ["Alpha", "Beta", "Gamma"]);
        assert_eq!(doc.title, "Conversion of scan.pdf");
        assert_eq!(doc.author, "pdf2docx");
    }

    #[test]
    fn empty_text_still_produces_a_section() {
        let doc = assemble_document("a.pdf", &pages(&["", "  \n"]), &ConversionConfig::default());
        assert_eq!(doc.section_count(), 2);
        assert!(doc.blocks.contains(&Block::Paragraph { text: String::new() }));
    }

    #[test]
    fn zero_pages_yields_toc_only() {
        let doc = assemble_document("a.pdf", &[], &ConversionConfig::default());
        assert_eq!(doc.blocks.len(), 2);
        assert_eq!(doc.section_count(), 0);
    }

    #[test]
    fn labels_are_configurable() {
        let config = ConversionConfig::builder()
            .labels(DocumentLabels::spanish())
            .build()
            .unwrap();
        let doc = assemble_document("informe.pdf", &pages(&["hola"]), &config);
        assert_eq!(doc.title, "Conversión de informe.pdf");
        assert!(doc.blocks.contains(&Block::Heading {
            text: "Página 1".into(),
            level: 1,
            centered: true
        }));
    }
}
