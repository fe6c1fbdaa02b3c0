/*!
 * In-memory glossary table.
 *
 * The table is a cache derived from the tagged references in the document:
 * it can always be rebuilt by scanning the text, so it is never persisted
 * on its own.
 */

use serde::Serialize;
use std::collections::HashMap;

use crate::document::TermId;

/// Insertion-ordered set of strings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct OrderedSet(Vec<String>);

impl OrderedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append unless already present. Returns whether it was added.
    pub fn push_back(&mut self, value: &str) -> bool {
        if self.contains(value) {
            return false;
        }
        self.0.push(value.to_string());
        true
    }

    /// Put `value` first, moving it if already present
    pub fn push_front(&mut self, value: &str) {
        self.0.retain(|v| v != value);
        self.0.insert(0, value.to_string());
    }

    pub fn contains(&self, value: &str) -> bool {
        self.0.iter().any(|v| v == value)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn first(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One glossary term and the translations used for it so far
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GlossaryEntry {
    pub id: TermId,
    /// Source strings registered under this term, normally one
    pub source_terms: OrderedSet,
    /// Translations used so far, most recent first
    pub translation_alternatives: OrderedSet,
}

impl GlossaryEntry {
    pub fn new(id: TermId) -> Self {
        Self {
            id,
            source_terms: OrderedSet::new(),
            translation_alternatives: OrderedSet::new(),
        }
    }

    /// The preferred source string
    pub fn source_text(&self) -> Option<&str> {
        self.source_terms.first()
    }
}

/// Glossary entries in order of first appearance
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GlossaryTable {
    entries: Vec<GlossaryEntry>,
    #[serde(skip)]
    index: HashMap<TermId, usize>,
}

impl GlossaryTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &TermId) -> Option<&GlossaryEntry> {
        self.index.get(id).map(|i| &self.entries[*i])
    }

    /// Entry for `id`, created empty if missing
    pub fn entry(&mut self, id: &TermId) -> &mut GlossaryEntry {
        let next = self.entries.len();
        let index = *self.index.entry(id.clone()).or_insert(next);
        if index == next {
            self.entries.push(GlossaryEntry::new(id.clone()));
        }
        &mut self.entries[index]
    }

    /// Entry that registered `source_text`, if any
    pub fn find_by_source(&self, source_text: &str) -> Option<&GlossaryEntry> {
        self.entries.iter().find(|e| e.source_terms.contains(source_text))
    }

    pub fn add_source_term(&mut self, id: &TermId, source_text: &str) {
        self.entry(id).source_terms.push_back(source_text);
    }

    /// Record a chosen translation as the most recent alternative
    pub fn record_translation(&mut self, id: &TermId, translation: &str) {
        self.entry(id).translation_alternatives.push_front(translation);
    }

    /// Append a translation found while rebuilding, keeping existing order
    pub fn add_known_translation(&mut self, id: &TermId, translation: &str) {
        self.entry(id).translation_alternatives.push_back(translation);
    }

    pub fn iter(&self) -> impl Iterator<Item = &GlossaryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
