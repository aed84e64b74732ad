//! WordprocessingML document model over the flat XML event lists.
//!
//! A paragraph is a `w:p` element. Its runs are the `w:r` elements that sit
//! directly in it or inside inline wrappers (hyperlinks, insertions, simple
//! fields, content controls), excluding anything inside a nested paragraph.
//! A run's text is built from its `w:t` children plus the control elements
//! that render as characters (`w:tab`/`w:ptab` as `\t`, `w:br`/`w:cr` as
//! `\n`, `w:noBreakHyphen` as `-`). Text edits keep every unchanged
//! character in the element it came from; `w:rPr`, drawings, field codes
//! and page breaks are left where they are.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::docx::package::{DocxPackage, MAIN_DOCUMENT_PART};
use crate::docx::xml::{parse_xml_part, set_attr_value, write_xml_part, XmlEvent, XmlPart};
use crate::error::Result;
use crate::model::{DocumentModel, Paragraph, ParagraphRuns, ParagraphVisitor, ParagraphVisitorMut};

const PARAGRAPH: &str = "w:p";
const RUN: &str = "w:r";
const TEXT: &str = "w:t";

/// Elements that may sit between a paragraph and its runs.
const INLINE_WRAPPERS: &[&str] = &[
    "w:hyperlink",
    "w:smartTag",
    "w:ins",
    "w:moveTo",
    "w:fldSimple",
    "w:sdt",
    "w:sdtContent",
    "w:customXml",
    "w:dir",
    "w:bdo",
];

pub const DEFAULT_PARTS: &[&str] = &[
    MAIN_DOCUMENT_PART,
    "word/header*.xml",
    "word/footer*.xml",
    "word/footnotes.xml",
    "word/endnotes.xml",
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentOptions {
    /// Part name patterns to treat as text-bearing; `*` matches any run of
    /// characters.
    pub parts: Vec<String>,
}

impl Default for DocumentOptions {
    fn default() -> Self {
        Self {
            parts: DEFAULT_PARTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

pub fn wildcard_match(pattern: &str, text: &str) -> bool {
    let Some((head, rest)) = pattern.split_once('*') else {
        return pattern == text;
    };
    let Some(mut remaining) = text.strip_prefix(head) else {
        return false;
    };
    let mut segments: Vec<&str> = rest.split('*').collect();
    let last = segments.pop().unwrap_or("");
    for seg in segments {
        if seg.is_empty() {
            continue;
        }
        match remaining.find(seg) {
            Some(pos) => remaining = &remaining[pos + seg.len()..],
            None => return false,
        }
    }
    remaining.ends_with(last)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PieceKind {
    Text,
    Control,
}

/// A direct child of a run that contributes to the run's text.
#[derive(Clone, Debug)]
struct Piece {
    kind: PieceKind,
    /// Index of the element's start (or empty) event.
    elem: usize,
    /// Index of its closing event; equal to `elem` for empty elements.
    end: usize,
    text: String,
}

#[derive(Clone, Debug)]
struct RunSlots {
    start: usize,
    /// Index of the matching `</w:r>`.
    end: usize,
    pieces: Vec<Piece>,
    text: String,
}

impl RunSlots {
    fn shift_from(&mut self, at: usize, delta: isize) {
        let bump = |i: &mut usize| {
            if *i >= at {
                *i = i.wrapping_add_signed(delta);
            }
        };
        bump(&mut self.start);
        bump(&mut self.end);
        for piece in &mut self.pieces {
            bump(&mut piece.elem);
            bump(&mut piece.end);
        }
    }
}

/// Index of the event closing the element opened at `start`.
fn matching_end(events: &[XmlEvent], start: usize) -> usize {
    let mut depth = 0usize;
    for (i, ev) in events.iter().enumerate().skip(start) {
        match ev {
            XmlEvent::Start { .. } => depth += 1,
            XmlEvent::End { .. } => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return i;
                }
            }
            _ => {}
        }
    }
    events.len().saturating_sub(1)
}

fn find_attr<'x>(attrs: &'x [(String, String)], key: &str) -> Option<&'x str> {
    attrs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
}

/// Character a run-level control element stands for in the run text.
fn control_char(name: &str, attrs: &[(String, String)]) -> Option<char> {
    match name {
        "w:tab" | "w:ptab" => Some('\t'),
        "w:cr" => Some('\n'),
        // Page and column breaks are layout, not text.
        "w:br" => (find_attr(attrs, "w:type").unwrap_or("textWrapping") == "textWrapping")
            .then_some('\n'),
        "w:noBreakHyphen" => Some('-'),
        _ => None,
    }
}

fn scan_run(events: &[XmlEvent], start: usize) -> RunSlots {
    let end = matching_end(events, start);
    let mut pieces = Vec::new();
    let mut i = start + 1;

    while i < end {
        match &events[i] {
            XmlEvent::Start { name, attrs } => {
                let close = matching_end(events, i);
                if name == TEXT {
                    let text: String = events[i + 1..close]
                        .iter()
                        .filter_map(|ev| match ev {
                            XmlEvent::Text { text } => Some(text.as_str()),
                            _ => None,
                        })
                        .collect();
                    pieces.push(Piece {
                        kind: PieceKind::Text,
                        elem: i,
                        end: close,
                        text,
                    });
                } else if let Some(c) = control_char(name, attrs) {
                    pieces.push(Piece {
                        kind: PieceKind::Control,
                        elem: i,
                        end: close,
                        text: c.to_string(),
                    });
                }
                i = close + 1;
            }
            XmlEvent::Empty { name, attrs } => {
                if let Some(c) = control_char(name, attrs) {
                    pieces.push(Piece {
                        kind: PieceKind::Control,
                        elem: i,
                        end: i,
                        text: c.to_string(),
                    });
                }
                i += 1;
            }
            _ => i += 1,
        }
    }

    let text = pieces.iter().map(|p| p.text.as_str()).collect();
    RunSlots {
        start,
        end,
        pieces,
        text,
    }
}

/// A stretch of rewritten run text bound for one element.
struct Unit {
    /// Piece the characters came from, or the text slot that hosts them.
    piece: Option<usize>,
    kind: PieceKind,
    text: String,
}

fn text_events(attrs: Vec<(String, String)>, text: &str) -> [XmlEvent; 3] {
    let mut start = XmlEvent::Start {
        name: TEXT.to_string(),
        attrs,
    };
    if text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace) {
        set_attr_value(&mut start, "xml:space", "preserve");
    }
    [
        start,
        XmlEvent::Text {
            text: text.to_string(),
        },
        XmlEvent::End {
            name: TEXT.to_string(),
        },
    ]
}

fn control_event(c: char) -> XmlEvent {
    let name = if c == '\t' { "w:tab" } else { "w:br" };
    XmlEvent::Empty {
        name: name.to_string(),
        attrs: Vec::new(),
    }
}

/// Events for the run `run` with its text changed to `text`.
///
/// The common prefix and suffix of the old and new text keep their
/// elements. The changed middle goes into the text slot it replaces (or the
/// neighbouring one), and any tab or line break inside it becomes a new
/// control element at that point.
fn rebuild_run(events: &[XmlEvent], run: &RunSlots, text: &str) -> Vec<XmlEvent> {
    let old: Vec<(char, usize)> = run
        .pieces
        .iter()
        .enumerate()
        .flat_map(|(pi, p)| p.text.chars().map(move |c| (c, pi)))
        .collect();
    let new: Vec<char> = text.chars().collect();

    let prefix = old
        .iter()
        .zip(&new)
        .take_while(|((a, _), b)| a == *b)
        .count();
    let limit = old.len().min(new.len()) - prefix;
    let suffix = old
        .iter()
        .rev()
        .zip(new.iter().rev())
        .take(limit)
        .take_while(|((a, _), b)| a == *b)
        .count();

    let is_text = |pi: usize| run.pieces[pi].kind == PieceKind::Text;
    let removed = &old[prefix..old.len() - suffix];
    let host = removed
        .iter()
        .map(|&(_, pi)| pi)
        .find(|&pi| is_text(pi))
        .or_else(|| prefix.checked_sub(1).map(|i| old[i].1).filter(|&pi| is_text(pi)))
        .or_else(|| {
            old.get(old.len() - suffix)
                .map(|&(_, pi)| pi)
                .filter(|&pi| is_text(pi))
        });

    let sequence = old[..prefix]
        .iter()
        .map(|&(c, pi)| (c, Some(pi), run.pieces[pi].kind))
        .chain(new[prefix..new.len() - suffix].iter().map(|&c| {
            if c == '\t' || c == '\n' {
                (c, None, PieceKind::Control)
            } else {
                (c, host, PieceKind::Text)
            }
        }))
        .chain(
            old[old.len() - suffix..]
                .iter()
                .map(|&(c, pi)| (c, Some(pi), run.pieces[pi].kind)),
        );

    let mut units: Vec<Unit> = Vec::new();
    for (c, piece, kind) in sequence {
        let joins = kind == PieceKind::Text
            && matches!(units.last(), Some(u) if u.kind == kind && u.piece == piece);
        if joins {
            if let Some(u) = units.last_mut() {
                u.text.push(c);
            }
            continue;
        }
        units.push(Unit {
            piece,
            kind,
            text: c.to_string(),
        });
    }

    // Each piece's element takes the first unit drawn from it; the other
    // units follow the element placed before them.
    let mut placed: Vec<Vec<usize>> = vec![Vec::new(); run.pieces.len()];
    let mut claimed = vec![false; run.pieces.len()];
    let mut leading: Vec<usize> = Vec::new();
    let mut current: Option<usize> = None;
    for (ui, unit) in units.iter().enumerate() {
        match unit.piece {
            Some(pi) if !claimed[pi] => {
                claimed[pi] = true;
                current = Some(pi);
                placed[pi].push(ui);
            }
            _ => match current {
                Some(pi) => placed[pi].push(ui),
                None => leading.push(ui),
            },
        }
    }

    let emit = |out: &mut Vec<XmlEvent>, ui: usize, owner: bool| {
        let unit = &units[ui];
        match (unit.kind, unit.piece) {
            (PieceKind::Control, Some(pi)) => {
                let p = &run.pieces[pi];
                out.extend_from_slice(&events[p.elem..=p.end]);
            }
            (PieceKind::Control, None) => {
                out.extend(unit.text.chars().map(control_event));
            }
            (PieceKind::Text, Some(pi)) => {
                let p = &run.pieces[pi];
                if owner && unit.text == p.text {
                    out.extend_from_slice(&events[p.elem..=p.end]);
                } else {
                    let attrs = match &events[p.elem] {
                        XmlEvent::Start { attrs, .. } => attrs.clone(),
                        _ => Vec::new(),
                    };
                    out.extend(text_events(attrs, &unit.text));
                }
            }
            (PieceKind::Text, None) => out.extend(text_events(Vec::new(), &unit.text)),
        }
    };

    let mut out = Vec::with_capacity(run.end - run.start + 1 + units.len() * 3);
    out.push(events[run.start].clone());
    let mut leading_done = leading.is_empty();
    let mut i = run.start + 1;
    while i < run.end {
        match run.pieces.iter().position(|p| p.elem == i) {
            Some(pi) => {
                if !leading_done {
                    leading.iter().for_each(|&ui| emit(&mut out, ui, false));
                    leading_done = true;
                }
                for (n, &ui) in placed[pi].iter().enumerate() {
                    emit(&mut out, ui, n == 0);
                }
                i = run.pieces[pi].end + 1;
            }
            None => {
                out.push(events[i].clone());
                i += 1;
            }
        }
    }
    if !leading_done {
        leading.iter().for_each(|&ui| emit(&mut out, ui, false));
    }
    out.push(events[run.end].clone());
    out
}

/// Collect the runs of the paragraph opened at `p_start`.
fn scan_paragraph(events: &[XmlEvent], p_start: usize) -> Vec<RunSlots> {
    let p_end = matching_end(events, p_start);
    let mut runs = Vec::new();
    let mut wrappers: Vec<bool> = Vec::new();
    let mut i = p_start + 1;
    while i < p_end {
        match &events[i] {
            XmlEvent::Start { name, .. } => {
                let inline = wrappers.iter().all(|w| *w);
                if inline && name == RUN {
                    let run = scan_run(events, i);
                    i = run.end + 1;
                    runs.push(run);
                    continue;
                }
                if name == PARAGRAPH {
                    // Nested paragraphs are visited on their own.
                    i = matching_end(events, i) + 1;
                    continue;
                }
                wrappers.push(INLINE_WRAPPERS.contains(&name.as_str()));
            }
            XmlEvent::End { .. } => {
                wrappers.pop();
            }
            _ => {}
        }
        i += 1;
    }
    runs
}

/// Read-only paragraph snapshot.
struct ScannedParagraph {
    runs: Vec<RunSlots>,
}

impl ParagraphRuns for ScannedParagraph {
    fn run_count(&self) -> usize {
        self.runs.len()
    }

    fn run_text(&self, index: usize) -> &str {
        &self.runs[index].text
    }
}

/// Paragraph view that edits the part's events in place.
pub struct DocxParagraph<'a> {
    events: &'a mut Vec<XmlEvent>,
    runs: Vec<RunSlots>,
    modified: bool,
}

impl<'a> DocxParagraph<'a> {
    fn new(events: &'a mut Vec<XmlEvent>, p_start: usize) -> Self {
        let runs = scan_paragraph(events, p_start);
        Self {
            events,
            runs,
            modified: false,
        }
    }

    fn shift_from(&mut self, at: usize, delta: isize) {
        for run in &mut self.runs {
            run.shift_from(at, delta);
        }
    }
}

impl ParagraphRuns for DocxParagraph<'_> {
    fn run_count(&self) -> usize {
        self.runs.len()
    }

    fn run_text(&self, index: usize) -> &str {
        &self.runs[index].text
    }
}

impl Paragraph for DocxParagraph<'_> {
    fn set_run_text(&mut self, index: usize, text: String) {
        let run = &self.runs[index];
        if run.text == text {
            return;
        }
        let (start, end) = (run.start, run.end);
        let rebuilt = rebuild_run(self.events.as_slice(), run, &text);
        let delta = rebuilt.len() as isize - (end - start + 1) as isize;
        self.events.splice(start..=end, rebuilt);
        self.shift_from(end + 1, delta);
        self.runs[index] = scan_run(self.events.as_slice(), start);
        debug_assert_eq!(self.runs[index].text, text);
        self.modified = true;
    }

    fn remove_run(&mut self, index: usize) {
        let run = self.runs.remove(index);
        self.events.drain(run.start..=run.end);
        let removed = (run.end - run.start + 1) as isize;
        self.shift_from(run.end + 1, -removed);
        self.modified = true;
    }
}

fn next_paragraph(events: &[XmlEvent], from: usize) -> Option<usize> {
    events
        .iter()
        .skip(from)
        .position(|ev| ev.is_start(PARAGRAPH))
        .map(|p| p + from)
}

struct LoadedPart {
    part: XmlPart,
    dirty: bool,
}

/// A `.docx` file opened for text reading and placeholder replacement.
pub struct DocxDocument {
    path: PathBuf,
    package: DocxPackage,
    parts: Vec<LoadedPart>,
}

impl DocxDocument {
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with(path, &DocumentOptions::default())
    }

    pub fn open_with(path: &Path, options: &DocumentOptions) -> Result<Self> {
        let package = DocxPackage::read(path)?;

        let mut names: Vec<&str> = package
            .entries
            .iter()
            .filter(|e| !e.is_dir && !e.data.is_empty())
            .map(|e| e.name.as_str())
            .filter(|n| options.parts.iter().any(|p| wildcard_match(p, n)))
            .collect();
        names.sort_by_key(|n| (*n != MAIN_DOCUMENT_PART, *n));

        let mut parts = Vec::with_capacity(names.len());
        for name in names {
            let Some(entry) = package.entry(name) else {
                continue;
            };
            let part = parse_xml_part(name, &entry.data)?;
            tracing::debug!(part = name, events = part.events.len(), "parsed part");
            parts.push(LoadedPart { part, dirty: false });
        }

        Ok(Self {
            path: path.to_path_buf(),
            package,
            parts,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|p| p.part.name.as_str())
    }

    pub fn is_modified(&self) -> bool {
        self.parts.iter().any(|p| p.dirty)
    }
}

impl DocumentModel for DocxDocument {
    fn visit_paragraphs(&self, visit: &mut ParagraphVisitor<'_>) -> Result<()> {
        for loaded in &self.parts {
            let events = &loaded.part.events;
            let mut cursor = 0usize;
            while let Some(p_start) = next_paragraph(events, cursor) {
                let para = ScannedParagraph {
                    runs: scan_paragraph(events, p_start),
                };
                visit(&para)?;
                cursor = p_start + 1;
            }
        }
        Ok(())
    }

    fn visit_paragraphs_mut(&mut self, visit: &mut ParagraphVisitorMut<'_>) -> Result<()> {
        for loaded in &mut self.parts {
            let mut cursor = 0usize;
            let mut visited = 0usize;
            while let Some(p_start) = next_paragraph(&loaded.part.events, cursor) {
                let mut para = DocxParagraph::new(&mut loaded.part.events, p_start);
                visit(&mut para)?;
                loaded.dirty |= para.modified;
                visited += 1;
                // Edits stay inside the paragraph, so its start index is
                // stable and nested paragraphs follow it.
                cursor = p_start + 1;
            }
            tracing::debug!(
                part = %loaded.part.name,
                paragraphs = visited,
                dirty = loaded.dirty,
                "visited part"
            );
        }
        Ok(())
    }

    fn save(&self, target: Option<&Path>) -> Result<()> {
        let out = target.unwrap_or(&self.path);
        let replacements: HashMap<String, Vec<u8>> = self
            .parts
            .iter()
            .filter(|p| p.dirty)
            .map(|p| (p.part.name.clone(), write_xml_part(&p.part)))
            .collect();
        self.package.write_with_replacements(out, &replacements)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const NS: &str = r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main""#;

    fn part(body: &str) -> XmlPart {
        let xml = format!(r#"<w:document {NS}><w:body>{body}</w:body></w:document>"#);
        parse_xml_part("word/document.xml", xml.as_bytes()).unwrap()
    }

    fn first_para(events: &[XmlEvent]) -> usize {
        next_paragraph(events, 0).unwrap()
    }

    fn run_texts(runs: &[RunSlots]) -> Vec<&str> {
        runs.iter().map(|r| r.text.as_str()).collect()
    }

    fn body_xml(part: &XmlPart) -> String {
        let s = String::from_utf8(write_xml_part(part)).unwrap();
        let start = s.find("<w:body>").unwrap() + "<w:body>".len();
        let end = s.find("</w:body>").unwrap();
        s[start..end].to_string()
    }

    #[test]
    fn wildcard_patterns() {
        assert!(wildcard_match("word/header*.xml", "word/header1.xml"));
        assert!(wildcard_match("word/document.xml", "word/document.xml"));
        assert!(!wildcard_match("word/header*.xml", "word/footer1.xml"));
        assert!(!wildcard_match("word/header*.xml", "word/header1.xml.rels"));
        assert!(wildcard_match("*", "anything"));
        assert!(wildcard_match("word/*/*.xml", "word/glossary/document.xml"));
    }

    #[test]
    fn runs_include_wrapped_runs_and_skip_deleted_text() {
        let p = part(concat!(
            r#"<w:p><w:pPr><w:pStyle w:val="Title"/></w:pPr>"#,
            r#"<w:r><w:rPr><w:b/></w:rPr><w:t>Hello </w:t></w:r>"#,
            r#"<w:hyperlink r:id="rId1"><w:r><w:t>link</w:t></w:r></w:hyperlink>"#,
            r#"<w:del><w:r><w:delText>gone</w:delText></w:r></w:del>"#,
            r#"<w:r><w:tab/><w:t xml:space="preserve"> end</w:t></w:r>"#,
            r#"</w:p>"#
        ));
        let runs = scan_paragraph(&p.events, first_para(&p.events));
        assert_eq!(run_texts(&runs), vec!["Hello ", "link", "\t end"]);
    }

    #[test]
    fn nested_paragraph_text_is_not_part_of_outer_run() {
        let p = part(concat!(
            r#"<w:p><w:r><w:t>outer</w:t><w:drawing><w:txbxContent>"#,
            r#"<w:p><w:r><w:t>inner</w:t></w:r></w:p>"#,
            r#"</w:txbxContent></w:drawing></w:r></w:p>"#
        ));
        let outer = scan_paragraph(&p.events, first_para(&p.events));
        assert_eq!(run_texts(&outer), vec!["outer"]);
        let inner_start = next_paragraph(&p.events, first_para(&p.events) + 1).unwrap();
        assert_eq!(run_texts(&scan_paragraph(&p.events, inner_start)), vec!["inner"]);
    }

    #[test]
    fn run_text_includes_tabs_and_line_breaks() {
        let p = part(concat!(
            r#"<w:p><w:r><w:t>a</w:t><w:tab/><w:t>b</w:t><w:br/><w:t>c</w:t>"#,
            r#"<w:br w:type="page"/><w:t>d</w:t><w:cr/><w:noBreakHyphen/></w:r></w:p>"#
        ));
        let runs = scan_paragraph(&p.events, first_para(&p.events));
        assert_eq!(run_texts(&runs), vec!["a\tb\ncd\n-"]);
    }

    #[test]
    fn set_text_keeps_characters_on_their_side_of_a_tab() {
        let mut p = part(r#"<w:p><w:r><w:t>Name:</w:t><w:tab/><w:t>{name}</w:t></w:r></w:p>"#);
        let start = first_para(&p.events);
        let mut para = DocxParagraph::new(&mut p.events, start);
        assert_eq!(para.run_text(0), "Name:\t{name}");
        para.set_run_text(0, "Name:\tAda".to_string());
        assert_eq!(para.run_text(0), "Name:\tAda");
        assert_eq!(
            body_xml(&p),
            r#"<w:p><w:r><w:t>Name:</w:t><w:tab/><w:t>Ada</w:t></w:r></w:p>"#
        );
    }

    #[test]
    fn set_text_after_a_break_stays_after_it() {
        let mut p = part(r#"<w:p><w:r><w:t>a</w:t><w:br/><w:t>b</w:t></w:r></w:p>"#);
        let start = first_para(&p.events);
        let mut para = DocxParagraph::new(&mut p.events, start);
        assert_eq!(para.run_text(0), "a\nb");
        para.set_run_text(0, "a\n x ".to_string());
        assert_eq!(
            body_xml(&p),
            r#"<w:p><w:r><w:t>a</w:t><w:br/><w:t xml:space="preserve"> x </w:t></w:r></w:p>"#
        );
    }

    #[test]
    fn set_text_writes_new_tabs_as_elements() {
        let mut p = part(r#"<w:p><w:r><w:rPr><w:i/></w:rPr><w:t>{na</w:t></w:r></w:p>"#);
        let start = first_para(&p.events);
        let mut para = DocxParagraph::new(&mut p.events, start);
        para.set_run_text(0, "Ada\tx".to_string());
        assert_eq!(para.run_text(0), "Ada\tx");
        assert_eq!(
            body_xml(&p),
            r#"<w:p><w:r><w:rPr><w:i/></w:rPr><w:t>Ada</w:t><w:tab/><w:t>x</w:t></w:r></w:p>"#
        );
    }

    #[test]
    fn set_text_keeps_page_breaks_and_drawings_in_place() {
        let mut p = part(concat!(
            r#"<w:p><w:r><w:t>a</w:t><w:br w:type="page"/><w:t>{x}</w:t>"#,
            r#"<w:drawing/><w:t>z</w:t></w:r></w:p>"#
        ));
        let start = first_para(&p.events);
        let mut para = DocxParagraph::new(&mut p.events, start);
        para.set_run_text(0, "aYz".to_string());
        assert_eq!(
            body_xml(&p),
            concat!(
                r#"<w:p><w:r><w:t>a</w:t><w:br w:type="page"/><w:t>Y</w:t>"#,
                r#"<w:drawing/><w:t>z</w:t></w:r></w:p>"#
            )
        );
    }

    #[test]
    fn set_text_creates_a_text_element_when_the_run_has_none() {
        let mut p = part(r#"<w:p><w:r><w:rPr><w:b/></w:rPr></w:r><w:r><w:t>k</w:t></w:r></w:p>"#);
        let start = first_para(&p.events);
        let mut para = DocxParagraph::new(&mut p.events, start);
        assert_eq!(para.run_text(0), "");
        para.set_run_text(0, "new".to_string());
        para.set_run_text(1, "K".to_string());
        assert_eq!(para.run_text(0), "new");
        assert_eq!(
            body_xml(&p),
            r#"<w:p><w:r><w:rPr><w:b/></w:rPr><w:t>new</w:t></w:r><w:r><w:t>K</w:t></w:r></w:p>"#
        );
    }

    #[test]
    fn set_text_fills_an_empty_text_element() {
        let mut p = part(r#"<w:p><w:r><w:t></w:t></w:r><w:r><w:t>z</w:t></w:r></w:p>"#);
        let start = first_para(&p.events);
        let mut para = DocxParagraph::new(&mut p.events, start);
        para.set_run_text(0, "y".to_string());
        para.set_run_text(1, "w".to_string());
        assert_eq!(
            body_xml(&p),
            r#"<w:p><w:r><w:t>y</w:t></w:r><w:r><w:t>w</w:t></w:r></w:p>"#
        );
    }

    #[test]
    fn remove_run_drops_subtree_and_keeps_later_runs_addressable() {
        let mut p = part(concat!(
            r#"<w:p><w:r><w:rPr><w:i/></w:rPr><w:t>{na</w:t></w:r>"#,
            r#"<w:r><w:rPr><w:b/></w:rPr><w:t>me}</w:t></w:r>"#,
            r#"<w:r><w:t>!</w:t></w:r></w:p>"#
        ));
        let start = first_para(&p.events);
        let mut para = DocxParagraph::new(&mut p.events, start);
        para.remove_run(1);
        para.set_run_text(1, "?".to_string());
        para.set_run_text(0, "Ada".to_string());
        assert!(para.modified);
        assert_eq!(
            body_xml(&p),
            r#"<w:p><w:r><w:rPr><w:i/></w:rPr><w:t>Ada</w:t></w:r><w:r><w:t>?</w:t></w:r></w:p>"#
        );
    }
}
