//! WordprocessingML (.docx) serialisation of an [`OutputDocument`].
//!
//! The document body, heading styles and TOC field are built with `docx-rs`.
//! Its package is then finished in one pass over the zip:
//!
//! | Part | Change |
//! |------|--------|
//! | `docProps/core.xml` | rewritten with the document title and author |
//! | `word/settings.xml` | `w:updateFields` added when requested |
//! | `word/document.xml` | `w14:paraId` values renumbered from 1 |
//!
//! Every entry is re-stored with a fixed timestamp. `docx-rs` draws paragraph
//! ids from a process-wide counter, so without the renumbering two
//! conversions of the same pages would differ.

use crate::output::{Block, OutputDocument};
use docx_rs::{
    AlignmentType, BreakType, Docx, Paragraph, Run, Style, StyleType, TableOfContents,
};
use once_cell::sync::Lazy;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use regex::{Captures, Regex};
use std::io::{self, Cursor, Read, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Heading styles are defined for outline levels 1 through 9.
const MAX_HEADING_LEVEL: u8 = 9;

/// Characters XML 1.0 cannot carry, not even escaped. tesseract ends every
/// page with a form feed (U+000C), which lands here.
static RE_XML_ILLEGAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\x00-\x08\x0B\x0C\x0E-\x1F\x{FFFE}\x{FFFF}]").unwrap());

static RE_PARA_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r#"w14:paraId="[0-9A-Fa-f]*""#).unwrap());

/// First `w:settings` child that must follow `w:updateFields` in schema order.
static RE_AFTER_UPDATE_FIELDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"<(?:w:(?:hdrShapeDefaults|footnotePr|endnotePr|compat|docVars|rsids)\b|m:mathPr\b|w14:|w15:)|</w:settings>",
    )
    .unwrap()
});

/// Serialise `doc` into the bytes of a .docx package.
pub fn to_docx_bytes(doc: &OutputDocument) -> io::Result<Vec<u8>> {
    let mut packed = Cursor::new(Vec::new());
    build_docx(doc)
        .build()
        .pack(&mut packed)
        .map_err(io::Error::other)?;
    finish_package(packed.into_inner(), doc)
}

// ── Document model ───────────────────────────────────────────────────────

fn build_docx(doc: &OutputDocument) -> Docx {
    let mut docx = (1..=MAX_HEADING_LEVEL)
        .fold(Docx::new(), |d, level| d.add_style(heading_style(level)));

    for block in &doc.blocks {
        docx = match block {
            Block::Heading {
                text,
                level,
                centered,
            } => docx.add_paragraph(heading_paragraph(text, *level, *centered)),
            Block::TocField { instruction } => {
                docx.add_table_of_contents(TableOfContents::with_instr_text(instruction))
            }
            Block::Paragraph { text } => docx.add_paragraph(text_paragraph(text)),
            Block::PageBreak => {
                docx.add_paragraph(Paragraph::new().add_run(Run::new().add_break(BreakType::Page)))
            }
        };
    }
    docx
}

fn heading_style_id(level: u8) -> String {
    format!("Heading{}", level.clamp(1, MAX_HEADING_LEVEL))
}

/// `HeadingN` carries outline level N-1, which is what `TOC \u` collects.
fn heading_style(level: u8) -> Style {
    Style::new(heading_style_id(level).as_str(), StyleType::Paragraph)
        .name(format!("heading {level}").as_str())
        .based_on("Normal")
        .bold()
        .color("2F5496")
        .size(heading_half_points(level))
        .outline_lvl(usize::from(level - 1))
}

/// Font size in half-points: 16pt for level 1, shrinking to the body size.
fn heading_half_points(level: u8) -> usize {
    match level {
        1 => 32,
        2 => 26,
        3 => 24,
        _ => 22,
    }
}

fn heading_paragraph(text: &str, level: u8, centered: bool) -> Paragraph {
    let mut p = Paragraph::new().style(heading_style_id(level).as_str());
    if centered {
        p = p.align(AlignmentType::Center);
    }
    p.add_run(text_run(text))
}

fn text_paragraph(text: &str) -> Paragraph {
    if text.is_empty() {
        return Paragraph::new();
    }
    Paragraph::new().add_run(text_run(text))
}

/// One piece of a run's content.
#[derive(Debug, PartialEq, Eq)]
enum RunPiece<'a> {
    Text(&'a str),
    Tab,
    Break,
}

/// Split text into run pieces: tabs become `w:tab`, line endings
/// (`\n`, `\r`, `\r\n`) become `w:br`.
fn run_pieces(text: &str) -> Vec<RunPiece<'_>> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        let piece = match c {
            '\t' => RunPiece::Tab,
            '\r' => {
                if let Some(&(_, '\n')) = chars.peek() {
                    chars.next();
                }
                RunPiece::Break
            }
            '\n' => RunPiece::Break,
            _ => continue,
        };
        if i > start {
            pieces.push(RunPiece::Text(&text[start..i]));
        }
        pieces.push(piece);
        start = chars.peek().map(|&(j, _)| j).unwrap_or(text.len());
    }
    if start < text.len() {
        pieces.push(RunPiece::Text(&text[start..]));
    }
    pieces
}

fn text_run(text: &str) -> Run {
    run_pieces(text)
        .into_iter()
        .fold(Run::new(), |run, piece| match piece {
            RunPiece::Text(s) => {
                let clean = strip_xml_illegal(s);
                if clean.is_empty() {
                    run
                } else {
                    run.add_text(clean.as_str())
                }
            }
            RunPiece::Tab => run.add_tab(),
            RunPiece::Break => run.add_break(BreakType::TextWrapping),
        })
}

fn strip_xml_illegal(input: &str) -> String {
    RE_XML_ILLEGAL.replace_all(input, "").into_owned()
}

// ── Package finishing ────────────────────────────────────────────────────

fn finish_package(packed: Vec<u8>, doc: &OutputDocument) -> io::Result<Vec<u8>> {
    let mut archive = ZipArchive::new(Cursor::new(packed)).map_err(io::Error::other)?;

    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(zip::DateTime::default());
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(io::Error::other)?;
        let name = entry.name().to_string();
        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes)?;

        let bytes = match name.as_str() {
            "docProps/core.xml" => core_xml(doc).map_err(io::Error::other)?,
            "word/document.xml" => renumber_paragraph_ids(&into_utf8(bytes)?).into_bytes(),
            "word/settings.xml" if doc.update_fields_on_open => {
                request_field_update(&into_utf8(bytes)?)?.into_bytes()
            }
            _ => bytes,
        };

        zip.start_file(name, options).map_err(io::Error::other)?;
        zip.write_all(&bytes)?;
    }

    let cursor = zip.finish().map_err(io::Error::other)?;
    Ok(cursor.into_inner())
}

fn into_utf8(bytes: Vec<u8>) -> io::Result<String> {
    String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

fn renumber_paragraph_ids(xml: &str) -> String {
    let mut next = 0u32;
    RE_PARA_ID
        .replace_all(xml, |_: &Captures<'_>| {
            next += 1;
            format!(r#"w14:paraId="{next:08X}""#)
        })
        .into_owned()
}

/// Insert `<w:updateFields w:val="true"/>` at its schema position.
fn request_field_update(settings: &str) -> io::Result<String> {
    if settings.contains("<w:updateFields") {
        return Ok(settings.to_string());
    }
    let at = RE_AFTER_UPDATE_FIELDS
        .find(settings)
        .map(|m| m.start())
        .ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidData, "settings part has no closing tag")
        })?;

    let mut out = String::with_capacity(settings.len() + 32);
    out.push_str(&settings[..at]);
    out.push_str(r#"<w:updateFields w:val="true"/>"#);
    out.push_str(&settings[at..]);
    Ok(out)
}

type XmlWriter = Writer<Vec<u8>>;

fn text_element(w: &mut XmlWriter, name: &str, text: &str) -> Result<(), quick_xml::Error> {
    w.write_event(Event::Start(BytesStart::new(name)))?;
    w.write_event(Event::Text(BytesText::new(&strip_xml_illegal(text))))?;
    w.write_event(Event::End(BytesEnd::new(name)))
}

/// Core properties: title and author. Timestamps are left out so the part
/// does not change between runs.
fn core_xml(doc: &OutputDocument) -> Result<Vec<u8>, quick_xml::Error> {
    let mut w = Writer::new(Vec::new());
    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;

    let mut root = BytesStart::new("cp:coreProperties");
    root.push_attribute((
        "xmlns:cp",
        "http://schemas.openxmlformats.org/package/2006/metadata/core-properties",
    ));
    root.push_attribute(("xmlns:dc", "http://purl.org/dc/elements/1.1/"));
    root.push_attribute(("xmlns:dcterms", "http://purl.org/dc/terms/"));
    root.push_attribute(("xmlns:dcmitype", "http://purl.org/dc/dcmitype/"));
    root.push_attribute(("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"));
    w.write_event(Event::Start(root))?;

    text_element(&mut w, "dc:title", &doc.title)?;
    text_element(&mut w, "dc:creator", &doc.author)?;
    text_element(&mut w, "cp:lastModifiedBy", &doc.author)?;

    w.write_event(Event::End(BytesEnd::new("cp:coreProperties")))?;
    Ok(w.into_inner())
}
