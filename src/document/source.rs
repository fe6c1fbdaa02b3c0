/*!
 * The text source abstraction consumed by the engine.
 *
 * The engine never parses document structure itself. Everything it needs
 * (section lookup, structural walk, tagged references, raw text edits) goes
 * through the `DocumentSource` trait, addressed by byte offsets.
 */

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

use crate::errors::DocumentError;

/// Durable identifier of a structural section
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionId(String);

impl SectionId {
    /// Wrap an existing identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Allocate a fresh identifier
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a glossary term, carried by tagged references
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TermId(String);

impl TermId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<SectionId> for TermId {
    fn from(id: SectionId) -> Self {
        Self(id.0)
    }
}

impl fmt::Display for TermId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The three named streams of a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stream {
    Source,
    Translation,
    Glossary,
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stream::Source => "source",
            Stream::Translation => "translation",
            Stream::Glossary => "glossary",
        };
        write!(f, "{}", name)
    }
}

/// A section as seen by the locator scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionSummary {
    /// Offset of the heading line
    pub begin: usize,
    /// Nesting depth (1 for top level)
    pub level: usize,
    /// Heading title without markup or tags
    pub title: String,
    /// Tags attached to the heading
    pub tags: Vec<String>,
    /// Properties in declaration order, names upper-cased
    pub properties: Vec<(String, String)>,
    /// Durable identifier, if the section has one
    pub id: Option<SectionId>,
}

impl SectionSummary {
    /// Look up a property; names are case-insensitive
    pub fn property(&self, name: &str) -> Option<&str> {
        let wanted = name.to_uppercase();
        self.properties
            .iter()
            .find(|(key, _)| *key == wanted)
            .map(|(_, value)| value.as_str())
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// Extent of a section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionBounds {
    /// Start of the heading line
    pub begin: usize,
    /// First offset after the heading line and its metadata
    pub contents_begin: usize,
    /// End of the subtree (start of the next sibling or ancestor)
    pub end: usize,
}

impl SectionBounds {
    pub fn contents(&self) -> Range<usize> {
        self.contents_begin..self.end
    }

    pub fn contains(&self, position: usize) -> bool {
        position >= self.contents_begin && position <= self.end
    }
}

/// Kind of a top-level structural element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Heading,
    Paragraph,
    OtherBlock,
}

/// One element of the structural walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructuralElement {
    pub kind: ElementKind,
    /// Start of the element's first line
    pub begin: usize,
    /// Start of the element's text: the title for headings, the first
    /// non-blank character otherwise
    pub contents_begin: usize,
    /// End of the element's text, excluding the final newline
    pub contents_end: usize,
    /// Start of whatever follows, trailing blank lines included
    pub end: usize,
}

/// An inline link between a span of text and a glossary term
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagReference {
    pub term_id: TermId,
    pub display: String,
    /// Offset of the reference markup
    pub start: usize,
    /// Offset just past the reference markup
    pub end: usize,
}

/// A text edit already applied to a document: `delta` bytes at offset `at`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextEdit {
    pub at: usize,
    pub delta: isize,
}

/// A structured text document the engine can read, search and edit.
///
/// All offsets are byte offsets into the current text and must fall on
/// character boundaries. Edits invalidate offsets after the edit point.
pub trait DocumentSource {
    /// Total length of the text
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All sections in document order
    fn sections(&self) -> Vec<SectionSummary>;

    /// Bounds of the section carrying `id`
    fn find_section(&self, id: &SectionId) -> Option<SectionBounds>;

    /// Give the section whose heading starts at `heading_begin` the identifier `id`
    fn assign_section_id(&mut self, heading_begin: usize, id: &SectionId) -> Result<(), DocumentError>;

    fn section_has_children(&self, id: &SectionId) -> bool;

    /// Where a new first child of the section would go
    fn first_child_insertion_point(&self, id: &SectionId) -> Option<usize>;

    /// Append a child section titled `title` and return its identifier
    fn create_child_section(&mut self, parent: &SectionId, title: &str) -> Result<SectionId, DocumentError>;

    fn read_range(&self, start: usize, end: usize) -> Result<&str, DocumentError>;

    /// Insert `text` at `position`, returning the shift applied to later offsets
    fn insert_at(&mut self, position: usize, text: &str) -> Result<usize, DocumentError>;

    /// Replace `start..end` by `text`, returning the signed shift applied to later offsets
    fn replace_range(&mut self, start: usize, end: usize, text: &str) -> Result<isize, DocumentError>;

    /// Start of the `occurrence`-th match of `needle` at or after `from`, ending before `to`
    fn search_forward(&self, needle: &str, from: usize, to: Option<usize>, occurrence: usize) -> Option<usize>;

    /// Start of the nearest match of `needle` ending at or before `from`, starting at or after `to`
    fn search_backward(&self, needle: &str, from: usize, to: Option<usize>) -> Option<usize>;

    /// Tagged references fully inside `start..end`, in document order
    fn tag_references_in_range(&self, start: usize, end: usize) -> Vec<TagReference>;

    /// Markup for a tagged reference
    fn render_tag_reference(&self, term_id: &TermId, display: &str) -> String;

    /// Structural elements inside `start..end`, in document order
    fn elements_in_range(&self, start: usize, end: usize) -> Vec<StructuralElement>;
}
