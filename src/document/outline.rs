/*!
 * Org-style outline documents held in memory.
 *
 * The outline format understood here:
 * - headings: one or more `*` followed by a space, an optional title and
 *   optional trailing tags (`* Source :source:draft:`)
 * - a property drawer right after a heading (`:PROPERTIES:` ... `:END:`),
 *   whose `:ID:` entry is the section's durable identifier
 * - blocks (`#+begin_x` ... `#+end_x`), tables (`|` lines), lists
 *   (`-`, `+`, `1.`, `1)` items), keyword and comment lines, stray drawers
 * - paragraphs: everything else, separated by blank lines
 * - tagged references: `[[trans:<term id>][<display text>]]`
 *
 * The structure is re-parsed on every query so offsets are always current.
 */

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

use super::source::{
    DocumentSource, ElementKind, SectionBounds, SectionId, SectionSummary, StructuralElement,
    TagReference, TermId,
};
use crate::errors::DocumentError;

static HEADING_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\*+)[ \t]+(.*?)(?:[ \t]+(:(?:[\w@#%]+:)+))?[ \t]*$")
        .expect("Invalid heading regex")
});

static PROPERTY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[ \t]*:([\w\-+]+):(?:[ \t]+(.*?))?[ \t]*$").expect("Invalid property regex")
});

static REFERENCE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[\[trans:([^\[\]]+)\]\[([^\[\]]*)\]\]").expect("Invalid reference regex")
});

static LIST_ITEM_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[ \t]*(?:[-+]|\d+[.)])(?:[ \t]+|$)").expect("Invalid list item regex")
});

static DRAWER_START_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[ \t]*:[\w\-]+:[ \t]*$").expect("Invalid drawer regex")
});

#[derive(Debug, Clone, Copy)]
struct Line {
    begin: usize,
    end: usize,
    next: usize,
}

#[derive(Debug, Clone)]
struct Drawer {
    /// Offset right after the `:PROPERTIES:` line
    first_entry: usize,
    /// Offset right after the `:END:` line
    end: usize,
    /// (NAME, value, line begin, line next)
    properties: Vec<(String, String, usize, usize)>,
}

#[derive(Debug, Clone)]
struct Heading {
    begin: usize,
    level: usize,
    title: String,
    tags: Vec<String>,
    line_end: usize,
    line_next: usize,
    drawer: Option<Drawer>,
}

impl Heading {
    fn metadata_end(&self) -> usize {
        self.drawer.as_ref().map_or(self.line_next, |d| d.end)
    }

    fn property(&self, name: &str) -> Option<&str> {
        self.drawer.as_ref().and_then(|d| {
            d.properties
                .iter()
                .find(|(key, ..)| key == name)
                .map(|(_, value, ..)| value.as_str())
        })
    }

    fn id(&self) -> Option<SectionId> {
        self.property("ID").filter(|v| !v.is_empty()).map(SectionId::new)
    }
}

fn split_lines(text: &str, from: usize, to: usize) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut begin = from;
    while begin < to {
        let end = text[begin..].find('\n').map_or(text.len(), |i| begin + i);
        let next = if end < text.len() { end + 1 } else { end };
        lines.push(Line { begin, end, next });
        begin = next;
    }
    lines
}

fn is_blank(line: &str) -> bool {
    line.chars().all(|c| c == ' ' || c == '\t' || c == '\r')
}

fn is_block_begin(line: &str) -> bool {
    line.trim_start().to_lowercase().starts_with("#+begin")
}

fn is_keyword_or_comment(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("#+") || trimmed.starts_with("# ") || trimmed == "#"
}

fn is_table_line(line: &str) -> bool {
    line.trim_start().starts_with('|')
}

fn starts_element(line: &str) -> bool {
    HEADING_REGEX.is_match(line)
        || is_block_begin(line)
        || is_table_line(line)
        || is_keyword_or_comment(line)
        || LIST_ITEM_REGEX.is_match(line)
        || DRAWER_START_REGEX.is_match(line)
}

/// An org-style outline document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutlineDocument {
    text: String,
}

impl OutlineDocument {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }

    fn line(&self, line: &Line) -> &str {
        &self.text[line.begin..line.end]
    }

    fn check_offset(&self, offset: usize) -> Result<(), DocumentError> {
        if offset > self.text.len() || !self.text.is_char_boundary(offset) {
            return Err(DocumentError::InvalidOffset {
                offset,
                len: self.text.len(),
            });
        }
        Ok(())
    }

    fn parse_drawer(&self, lines: &[Line], index: usize) -> Option<Drawer> {
        let first = lines.get(index)?;
        if !self.line(first).trim().eq_ignore_ascii_case(":PROPERTIES:") {
            return None;
        }
        let mut properties = Vec::new();
        for line in &lines[index + 1..] {
            let content = self.line(line);
            if content.trim().eq_ignore_ascii_case(":END:") {
                return Some(Drawer {
                    first_entry: first.next,
                    end: line.next,
                    properties,
                });
            }
            if HEADING_REGEX.is_match(content) {
                return None;
            }
            if let Some(caps) = PROPERTY_REGEX.captures(content) {
                let name = caps[1].to_uppercase();
                let value = caps.get(2).map_or("", |m| m.as_str()).to_string();
                properties.push((name, value, line.begin, line.next));
            }
        }
        None
    }

    fn headings(&self) -> Vec<Heading> {
        let lines = split_lines(&self.text, 0, self.text.len());
        let mut headings = Vec::new();
        for (index, line) in lines.iter().enumerate() {
            let Some(caps) = HEADING_REGEX.captures(self.line(line)) else {
                continue;
            };
            let tags = caps
                .get(3)
                .map(|m| {
                    m.as_str()
                        .split(':')
                        .filter(|t| !t.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default();
            headings.push(Heading {
                begin: line.begin,
                level: caps[1].len(),
                title: caps[2].to_string(),
                tags,
                line_end: line.end,
                line_next: line.next,
                drawer: self.parse_drawer(&lines, index + 1),
            });
        }
        headings
    }

    fn section_end(&self, headings: &[Heading], index: usize) -> usize {
        let level = headings[index].level;
        headings[index + 1..]
            .iter()
            .find(|h| h.level <= level)
            .map_or(self.text.len(), |h| h.begin)
    }

    fn locate_heading(&self, id: &SectionId) -> Option<(Vec<Heading>, usize)> {
        let headings = self.headings();
        let index = headings.iter().position(|h| h.id().as_ref() == Some(id))?;
        Some((headings, index))
    }

    /// Prefix needed so that text appended at `position` starts on a fresh line
    fn line_break_before(&self, position: usize) -> &'static str {
        if position > 0 && !self.text[..position].ends_with('\n') {
            "\n"
        } else {
            ""
        }
    }

    /// Index of the last line of the element starting at `lines[index]`
    fn element_extent(&self, lines: &[Line], index: usize) -> (ElementKind, usize) {
        let content = self.line(&lines[index]);
        let last_index = lines.len() - 1;

        if HEADING_REGEX.is_match(content) {
            let last = match self.parse_drawer(lines, index + 1) {
                Some(drawer) => lines
                    .iter()
                    .rposition(|l| l.next <= drawer.end)
                    .unwrap_or(index),
                None => index,
            };
            return (ElementKind::Heading, last);
        }

        if is_block_begin(content) {
            let last = lines[index + 1..]
                .iter()
                .position(|l| self.line(l).trim_start().to_lowercase().starts_with("#+end"))
                .map_or(last_index, |offset| index + 1 + offset);
            return (ElementKind::OtherBlock, last);
        }

        if DRAWER_START_REGEX.is_match(content) {
            let last = lines[index + 1..]
                .iter()
                .position(|l| self.line(l).trim().eq_ignore_ascii_case(":END:"))
                .map_or(index, |offset| index + 1 + offset);
            return (ElementKind::OtherBlock, last);
        }

        let continues: Box<dyn Fn(&str) -> bool> = if is_table_line(content) {
            Box::new(is_table_line)
        } else if is_keyword_or_comment(content) {
            Box::new(|l: &str| is_keyword_or_comment(l) && !is_block_begin(l))
        } else if LIST_ITEM_REGEX.is_match(content) {
            Box::new(|l: &str| {
                !is_blank(l)
                    && !HEADING_REGEX.is_match(l)
                    && (LIST_ITEM_REGEX.is_match(l) || l.starts_with([' ', '\t']))
            })
        } else {
            let mut last = index;
            while last < last_index {
                let next = self.line(&lines[last + 1]);
                if is_blank(next) || starts_element(next) {
                    break;
                }
                last += 1;
            }
            return (ElementKind::Paragraph, last);
        };

        let mut last = index;
        while last < last_index && continues(self.line(&lines[last + 1])) {
            last += 1;
        }
        (ElementKind::OtherBlock, last)
    }
}

impl fmt::Display for OutlineDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

impl DocumentSource for OutlineDocument {
    fn len(&self) -> usize {
        self.text.len()
    }

    fn sections(&self) -> Vec<SectionSummary> {
        self.headings()
            .into_iter()
            .map(|h| SectionSummary {
                begin: h.begin,
                level: h.level,
                id: h.id(),
                properties: h
                    .drawer
                    .as_ref()
                    .map(|d| d.properties.iter().map(|(k, v, ..)| (k.clone(), v.clone())).collect())
                    .unwrap_or_default(),
                title: h.title,
                tags: h.tags,
            })
            .collect()
    }

    fn find_section(&self, id: &SectionId) -> Option<SectionBounds> {
        let (headings, index) = self.locate_heading(id)?;
        Some(SectionBounds {
            begin: headings[index].begin,
            contents_begin: headings[index].metadata_end(),
            end: self.section_end(&headings, index),
        })
    }

    fn assign_section_id(&mut self, heading_begin: usize, id: &SectionId) -> Result<(), DocumentError> {
        let heading = self
            .headings()
            .into_iter()
            .find(|h| h.begin == heading_begin)
            .ok_or(DocumentError::NotAHeading(heading_begin))?;

        match &heading.drawer {
            Some(drawer) => {
                let existing = drawer
                    .properties
                    .iter()
                    .find(|(name, ..)| name == "ID")
                    .map(|(_, _, begin, next)| (*begin, *next));
                let entry = format!(":ID:       {}\n", id);
                match existing {
                    Some((begin, next)) => {
                        // Keep the line break of a drawer line that ends the text
                        let entry = if self.text[begin..next].ends_with('\n') {
                            entry
                        } else {
                            entry.trim_end().to_string()
                        };
                        self.replace_range(begin, next, &entry)?;
                    }
                    None => {
                        self.insert_at(drawer.first_entry, &entry)?;
                    }
                }
            }
            None => {
                let prefix = if heading.line_end == heading.line_next { "\n" } else { "" };
                let drawer = format!("{}:PROPERTIES:\n:ID:       {}\n:END:\n", prefix, id);
                self.insert_at(heading.line_next, &drawer)?;
            }
        }
        debug!("Assigned identifier {} to heading at {}", id, heading_begin);
        Ok(())
    }

    fn section_has_children(&self, id: &SectionId) -> bool {
        let Some((headings, index)) = self.locate_heading(id) else {
            return false;
        };
        headings
            .get(index + 1)
            .is_some_and(|h| h.level > headings[index].level)
    }

    fn first_child_insertion_point(&self, id: &SectionId) -> Option<usize> {
        let (headings, index) = self.locate_heading(id)?;
        match headings.get(index + 1) {
            Some(child) if child.level > headings[index].level => Some(child.begin),
            _ => Some(self.section_end(&headings, index)),
        }
    }

    fn create_child_section(&mut self, parent: &SectionId, title: &str) -> Result<SectionId, DocumentError> {
        let (headings, index) = self
            .locate_heading(parent)
            .ok_or_else(|| DocumentError::MissingSection(parent.to_string()))?;
        let position = self.section_end(&headings, index);
        let id = SectionId::generate();
        let entry = format!(
            "{}{} {}\n:PROPERTIES:\n:ID:       {}\n:END:\n",
            self.line_break_before(position),
            "*".repeat(headings[index].level + 1),
            title,
            id
        );
        self.insert_at(position, &entry)?;
        Ok(id)
    }

    fn read_range(&self, start: usize, end: usize) -> Result<&str, DocumentError> {
        self.check_offset(start)?;
        self.check_offset(end)?;
        if start > end {
            return Err(DocumentError::InvalidOffset {
                offset: start,
                len: self.text.len(),
            });
        }
        Ok(&self.text[start..end])
    }

    fn insert_at(&mut self, position: usize, text: &str) -> Result<usize, DocumentError> {
        self.check_offset(position)?;
        self.text.insert_str(position, text);
        Ok(text.len())
    }

    fn replace_range(&mut self, start: usize, end: usize, text: &str) -> Result<isize, DocumentError> {
        self.read_range(start, end)?;
        self.text.replace_range(start..end, text);
        Ok(text.len() as isize - (end - start) as isize)
    }

    fn search_forward(&self, needle: &str, from: usize, to: Option<usize>, occurrence: usize) -> Option<usize> {
        let to = to.unwrap_or(self.text.len()).min(self.text.len());
        let haystack = self.read_range(from, to).ok()?;
        haystack
            .match_indices(needle)
            .nth(occurrence.max(1) - 1)
            .map(|(index, _)| from + index)
    }

    fn search_backward(&self, needle: &str, from: usize, to: Option<usize>) -> Option<usize> {
        let lower = to.unwrap_or(0);
        let haystack = self.read_range(lower, from.min(self.text.len())).ok()?;
        haystack.rfind(needle).map(|index| lower + index)
    }

    fn tag_references_in_range(&self, start: usize, end: usize) -> Vec<TagReference> {
        let Ok(haystack) = self.read_range(start, end.min(self.text.len())) else {
            return Vec::new();
        };
        REFERENCE_REGEX
            .captures_iter(haystack)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                Some(TagReference {
                    term_id: TermId::new(&caps[1]),
                    display: caps[2].to_string(),
                    start: start + whole.start(),
                    end: start + whole.end(),
                })
            })
            .collect()
    }

    fn render_tag_reference(&self, term_id: &TermId, display: &str) -> String {
        format!("[[trans:{}][{}]]", term_id, display)
    }

    fn elements_in_range(&self, start: usize, end: usize) -> Vec<StructuralElement> {
        let end = end.min(self.text.len());
        if self.check_offset(start).is_err() || !self.text.is_char_boundary(end) {
            return Vec::new();
        }
        let lines = split_lines(&self.text, start, end);
        let mut elements = Vec::new();
        let mut index = 0;

        while index < lines.len() {
            let line = lines[index];
            let content = self.line(&line);
            if is_blank(content) {
                index += 1;
                continue;
            }

            let (kind, last) = self.element_extent(&lines, index);
            let (contents_begin, contents_end) = match kind {
                ElementKind::Heading => {
                    let title_begin = HEADING_REGEX
                        .captures(content)
                        .and_then(|caps| caps.get(2))
                        .map_or(line.end, |m| line.begin + m.start());
                    (title_begin, line.end)
                }
                _ => {
                    let indent = content.len() - content.trim_start_matches([' ', '\t']).len();
                    (line.begin + indent, lines[last].end)
                }
            };

            let mut next = last + 1;
            while next < lines.len() && is_blank(self.line(&lines[next])) {
                next += 1;
            }
            let element_end = lines.get(next).map_or(end, |l| l.begin);

            elements.push(StructuralElement {
                kind,
                begin: line.begin,
                contents_begin,
                contents_end: contents_end.min(end),
                end: element_end,
            });
            index = next;
        }

        elements
    }
}
