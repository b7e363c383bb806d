use log::{debug, error};
use std::fs::File;
use std::io::{Read, Seek, Write};
use std::path::Path;

use crate::documents::xml_tree::{Element, Node, XmlDocument};
use crate::documents::{DocumentWalker, WalkReport};
use crate::errors::{ConvertError, ConvertResult};
use crate::substitution::{Direction, MatchResolver, contains_tag};

// @module: Word processing documents (.docx)

/// Main document part inside the package
pub const DOCUMENT_PART: &str = "word/document.xml";

const BODY: &str = "w:body";
const PARAGRAPH: &str = "w:p";
const RUN: &str = "w:r";
const RUN_PROPERTIES: &str = "w:rPr";
const TEXT: &str = "w:t";
const TAB: &str = "w:tab";
const BREAK: &str = "w:br";
const CARRIAGE_RETURN: &str = "w:cr";
const TABLE: &str = "w:tbl";
const ROW: &str = "w:tr";
const CELL: &str = "w:tc";

/// A docx package with its main document part parsed
#[derive(Debug, Clone)]
pub struct DocxDocument {
    /// Every zip entry in archive order; the main part is re-serialized on save
    entries: Vec<(String, Vec<u8>)>,
    document: XmlDocument,
}

impl DocxDocument {
    /// Open a docx file
    pub fn open<P: AsRef<Path>>(path: P) -> ConvertResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        Self::from_reader(file).map_err(|e| match e {
            ConvertError::Xml(xml) => ConvertError::parse(path, xml.to_string()),
            other => other,
        })
    }

    /// Read a docx package from any seekable reader
    pub fn from_reader<R: Read + Seek>(reader: R) -> ConvertResult<Self> {
        let mut archive = zip::ZipArchive::new(reader)?;
        let mut entries = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            let name = entry.name().to_string();
            let mut data = Vec::new();
            entry.read_to_end(&mut data)?;
            entries.push((name, data));
        }

        let part = entries
            .iter()
            .find(|(name, _)| name == DOCUMENT_PART)
            .map(|(_, data)| data)
            .ok_or_else(|| ConvertError::Document(format!("{} not found in package", DOCUMENT_PART)))?;
        let content = std::str::from_utf8(part)
            .map_err(|e| ConvertError::Document(format!("{} is not UTF-8: {}", DOCUMENT_PART, e)))?;
        let document = XmlDocument::parse(content)?;

        debug!("Loaded docx package with {} entries", entries.len());
        Ok(Self { entries, document })
    }

    /// Write the package, media stored and everything else deflated
    pub fn save<P: AsRef<Path>>(&self, path: P) -> ConvertResult<()> {
        let path = path.as_ref();
        let document_bytes = self.document.to_bytes()?;

        let file = File::create(path)?;
        let mut zip = zip::ZipWriter::new(file);
        let deflated = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);
        let stored = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);

        for (name, data) in &self.entries {
            if name.ends_with('/') {
                zip.add_directory(name.as_str(), deflated)?;
                continue;
            }
            let options = if name.starts_with("word/media/") { stored } else { deflated };
            zip.start_file(name.as_str(), options)?;
            if name == DOCUMENT_PART {
                zip.write_all(&document_bytes)?;
            } else {
                zip.write_all(data)?;
            }
        }
        zip.finish()?;
        debug!("Saved docx to {:?}", path);
        Ok(())
    }

    /// Text of every paragraph in walk order
    pub fn paragraph_texts(&self) -> ConvertResult<Vec<String>> {
        let body = self.body()?;
        let mut paragraphs = Vec::new();
        collect_paragraphs(body, &mut paragraphs);
        Ok(paragraphs
            .into_iter()
            .map(|paragraph| {
                paragraph
                    .elements()
                    .filter(|e| e.is(RUN))
                    .map(run_text)
                    .collect()
            })
            .collect())
    }

    fn body(&self) -> ConvertResult<&Element> {
        self.document
            .root()
            .and_then(|root| root.elements().find(|e| e.is(BODY)))
            .ok_or_else(|| ConvertError::Document("document has no body".to_string()))
    }

    fn body_mut(&mut self) -> ConvertResult<&mut Element> {
        self.document
            .root_mut()
            .and_then(|root| root.elements_mut().find(|e| e.is(BODY)))
            .ok_or_else(|| ConvertError::Document("document has no body".to_string()))
    }
}

impl DocumentWalker for DocxDocument {
    fn walk(&mut self, candidates: &[(&str, &str)], direction: Direction) -> ConvertResult<WalkReport> {
        debug!("Starting docx replace with {} candidates", candidates.len());
        let body = self.body_mut()?;
        let paragraphs = document_paragraphs(body);
        if paragraphs.is_empty() {
            error!("No paragraphs found in doc");
        }

        let mut report = WalkReport::default();
        for paragraph in paragraphs {
            match replace_in_paragraph(paragraph, candidates, direction) {
                ParagraphOutcome::Blank => {}
                ParagraphOutcome::Unchanged => report.units_seen += 1,
                ParagraphOutcome::Changed => {
                    report.units_seen += 1;
                    report.units_changed += 1;
                }
            }
        }
        debug!("Finished replacing text in doc: {}", report);
        Ok(report)
    }
}

enum ParagraphOutcome {
    Blank,
    Unchanged,
    Changed,
}

/// Replace keys run by run; a key spread over several runs is replaced in the
/// joined text, which then lands in the first run.
fn replace_in_paragraph(
    paragraph: &mut Element,
    candidates: &[(&str, &str)],
    direction: Direction,
) -> ParagraphOutcome {
    let mut runs = paragraph_runs(paragraph);
    let original: Vec<String> = runs.iter().map(|run| run_text(run)).collect();
    let mut joined = original.concat();

    if joined.trim().is_empty() {
        return ParagraphOutcome::Blank;
    }
    if direction.is_making_template() && contains_tag(&joined) {
        return ParagraphOutcome::Unchanged;
    }

    let mut texts = original.clone();
    for &(key, value) in candidates {
        let mut replaced_in_run = false;
        for text in texts.iter_mut() {
            if let Some(new_text) = MatchResolver::substitute(text, key, value) {
                *text = new_text;
                replaced_in_run = true;
                joined = joined.replace(key, value);
            }
        }
        if replaced_in_run {
            continue;
        }
        if let Some(new_joined) = MatchResolver::substitute(&joined, key, value) {
            joined = new_joined;
            texts.iter_mut().for_each(String::clear);
            if let Some(first) = texts.first_mut() {
                first.clone_from(&joined);
            }
        }
    }

    let mut changed = false;
    for ((run, new_text), old_text) in runs.iter_mut().zip(&texts).zip(&original) {
        if new_text != old_text {
            set_run_text(run, new_text);
            changed = true;
        }
    }
    if changed {
        ParagraphOutcome::Changed
    } else {
        ParagraphOutcome::Unchanged
    }
}

/// Body paragraphs first, then the paragraphs of every body table
fn document_paragraphs(body: &mut Element) -> Vec<&mut Element> {
    let mut paragraphs = Vec::new();
    let mut tables = Vec::new();
    for child in body.elements_mut() {
        if child.is(PARAGRAPH) {
            paragraphs.push(child);
        } else if child.is(TABLE) {
            tables.push(child);
        }
    }
    let body_count = paragraphs.len();
    for table in tables {
        table_paragraphs(table, &mut paragraphs);
    }
    debug!(
        "Count doc paragraphs = {}, with table paragraphs = {}",
        body_count,
        paragraphs.len()
    );
    paragraphs
}

/// Read-only counterpart of `document_paragraphs`, same order
fn collect_paragraphs<'a>(container: &'a Element, out: &mut Vec<&'a Element>) {
    let mut tables = Vec::new();
    for child in container.elements() {
        if child.is(PARAGRAPH) {
            out.push(child);
        } else if child.is(TABLE) {
            tables.push(child);
        }
    }
    for table in tables {
        collect_table_paragraphs(table, out);
    }
}

fn collect_table_paragraphs<'a>(table: &'a Element, out: &mut Vec<&'a Element>) {
    for cell in table
        .elements()
        .filter(|e| e.is(ROW))
        .flat_map(|row| row.elements().filter(|e| e.is(CELL)))
    {
        let mut nested = Vec::new();
        for child in cell.elements() {
            if child.is(PARAGRAPH) {
                if child.elements().any(|e| e.is(RUN)) {
                    out.push(child);
                }
            } else if child.is(TABLE) {
                nested.push(child);
            }
        }
        for table in nested {
            collect_table_paragraphs(table, out);
        }
    }
}

/// Cell paragraphs that have runs, then nested tables, row by row
fn table_paragraphs<'a>(table: &'a mut Element, out: &mut Vec<&'a mut Element>) {
    for row in table.elements_mut().filter(|e| e.is(ROW)) {
        for cell in row.elements_mut().filter(|e| e.is(CELL)) {
            let mut nested = Vec::new();
            for child in cell.elements_mut() {
                if child.is(PARAGRAPH) {
                    if child.elements().any(|e| e.is(RUN)) {
                        out.push(child);
                    }
                } else if child.is(TABLE) {
                    nested.push(child);
                }
            }
            for table in nested {
                table_paragraphs(table, out);
            }
        }
    }
}

fn paragraph_runs(paragraph: &mut Element) -> Vec<&mut Element> {
    paragraph.elements_mut().filter(|e| e.is(RUN)).collect()
}

fn is_run_content(element: &Element) -> bool {
    element.is(TEXT) || element.is(TAB) || element.is(BREAK) || element.is(CARRIAGE_RETURN)
}

/// Visible text of a run; tabs and breaks become `\t` and `\n`
fn run_text(run: &Element) -> String {
    let mut text = String::new();
    for child in run.elements() {
        if child.is(TEXT) {
            text.push_str(&child.text());
        } else if child.is(TAB) {
            text.push('\t');
        } else if child.is(BREAK) || child.is(CARRIAGE_RETURN) {
            text.push('\n');
        }
    }
    text
}

/// Replace the text content of a run, keeping its properties and other children
fn set_run_text(run: &mut Element, text: &str) {
    run.children_mut().retain(|node| match node {
        Node::Element(element) => !is_run_content(element),
        _ => true,
    });

    let mut pending = String::new();
    for c in text.chars() {
        match c {
            '\t' | '\n' | '\r' => {
                push_text(run, &mut pending);
                let name = if c == '\t' { TAB } else { BREAK };
                run.push(Node::Element(Element::new(name)));
            }
            _ => pending.push(c),
        }
    }
    push_text(run, &mut pending);

    if !run.elements().any(|e| e.is(RUN_PROPERTIES)) {
        return;
    }
    // w:rPr must stay the first child
    let children = run.children_mut();
    if let Some(position) = children
        .iter()
        .position(|node| matches!(node, Node::Element(e) if e.is(RUN_PROPERTIES)))
    {
        let properties = children.remove(position);
        children.insert(0, properties);
    }
}

fn push_text(run: &mut Element, pending: &mut String) {
    if pending.is_empty() {
        return;
    }
    let mut element = Element::new(TEXT).with_attribute("xml:space", "preserve");
    element.set_text(pending);
    run.push(Node::Element(element));
    pending.clear();
}
