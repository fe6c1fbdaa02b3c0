/*!
 * Glossary term registration and translation lookup.
 *
 * This module provides:
 * - Registration of a source term: a glossary entry section plus tagged
 *   references replacing every occurrence in the source stream
 * - Lookup of the next term to translate in the current segment, with the
 *   translations chosen for it before
 * - Reconstruction of the glossary table from the document text
 */

use log::{debug, info};

use super::table::GlossaryTable;
use crate::document::{DocumentSource, SectionBounds, SectionId, TermId, TextEdit};
use crate::errors::{DocumentError, GlossaryError};
use crate::locator::ProjectRoots;

/// Outcome of registering a term
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub term_id: TermId,
    /// Occurrences replaced in the source stream
    pub replacements: usize,
    /// Every edit applied to the document, in order
    pub edits: Vec<TextEdit>,
}

/// The next term awaiting translation in the current segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationChoice {
    pub term_id: TermId,
    /// Display text of the source reference
    pub source_text: String,
    /// Translations used before, most recent first
    pub candidates: Vec<String>,
}

fn bounds<D: DocumentSource>(document: &D, id: &SectionId) -> Result<SectionBounds, DocumentError> {
    document
        .find_section(id)
        .ok_or_else(|| DocumentError::MissingSection(id.to_string()))
}

/// Glossary operations over a project's document
#[derive(Debug, Clone)]
pub struct GlossaryManager {
    delimiter: String,
}

impl GlossaryManager {
    pub fn new(delimiter: char) -> Self {
        Self {
            delimiter: delimiter.to_string(),
        }
    }

    /// Register `source_text` as a glossary term and link its occurrences.
    ///
    /// Matching is literal: an occurrence broken across lines is not found.
    pub fn register_term<D: DocumentSource>(
        &self,
        document: &mut D,
        table: &mut GlossaryTable,
        roots: &ProjectRoots,
        source_text: &str,
    ) -> Result<Registration, GlossaryError> {
        if source_text.trim().is_empty() {
            return Err(GlossaryError::EmptyTerm);
        }
        if let Some(existing) = table.find_by_source(source_text) {
            return Err(GlossaryError::AlreadyRegistered {
                term: source_text.to_string(),
                id: existing.id.to_string(),
            });
        }

        let mut edits = Vec::new();
        if !document.section_has_children(&roots.glossary) {
            debug!("Creating the first glossary entry");
        }
        let length_before = document.len();
        let section = document.create_child_section(&roots.glossary, source_text)?;
        let entry_begin = bounds(document, &section)?.begin;
        edits.push(TextEdit {
            at: entry_begin,
            delta: (document.len() - length_before) as isize,
        });
        let term_id = TermId::from(section);

        let reference = document.render_tag_reference(&term_id, source_text);
        let mut replacements = 0;
        let mut position = bounds(document, &roots.source)?.contents_begin;
        loop {
            let source = bounds(document, &roots.source)?;
            let Some(found) = document.search_forward(source_text, position, Some(source.end), 1) else {
                break;
            };
            let linked = document
                .tag_references_in_range(source.contents_begin, source.end)
                .into_iter()
                .find(|r| r.start <= found && found < r.end);
            if let Some(existing) = linked {
                position = existing.end;
                continue;
            }

            let delta = document.replace_range(found, found + source_text.len(), &reference)?;
            edits.push(TextEdit { at: found, delta });
            position = found + reference.len();
            replacements += 1;
        }

        table.add_source_term(&term_id, source_text);
        if replacements == 0 {
            debug!("Term '{}' does not occur in the source stream", source_text);
        }
        info!("Registered term '{}' as {} ({} occurrences)", source_text, term_id, replacements);

        Ok(Registration {
            term_id,
            replacements,
            edits,
        })
    }

    /// Find the next term to translate in the current segment.
    ///
    /// Counts the references already typed in the translation segment
    /// around `cursor` (k) and returns the (k+1)-th reference of the source
    /// segment starting at `probable_source_position`.
    pub fn next_translation_choice<D: DocumentSource>(
        &self,
        document: &D,
        table: &GlossaryTable,
        roots: &ProjectRoots,
        probable_source_position: usize,
        cursor: usize,
    ) -> Result<TranslationChoice, GlossaryError> {
        let translation = bounds(document, &roots.translation)?;
        let source = bounds(document, &roots.source)?;
        let width = self.delimiter.len();

        let segment_start = document
            .search_backward(&self.delimiter, cursor, Some(translation.contents_begin))
            .map_or(translation.contents_begin, |found| found + width);
        let typed = document.tag_references_in_range(segment_start, cursor).len();

        let mut from = probable_source_position.clamp(source.contents_begin, source.end);
        if document.search_forward(&self.delimiter, from, Some(source.end), 1) == Some(from) {
            from += width;
        }
        let segment_end = document
            .search_forward(&self.delimiter, from, Some(source.end), 1)
            .unwrap_or(source.end);

        let reference = document
            .tag_references_in_range(from, segment_end)
            .into_iter()
            .nth(typed)
            .ok_or(GlossaryError::NoPendingTerm)?;
        debug!("Term {} is next ({} already typed in this segment)", reference.term_id, typed);

        let candidates = table
            .get(&reference.term_id)
            .map(|entry| entry.translation_alternatives.as_slice().to_vec())
            .unwrap_or_default();

        Ok(TranslationChoice {
            term_id: reference.term_id,
            source_text: reference.display,
            candidates,
        })
    }

    /// Remember `chosen` as the most recent translation of `term_id`
    pub fn record_translation(&self, table: &mut GlossaryTable, term_id: &TermId, chosen: &str) {
        table.record_translation(term_id, chosen);
    }

    /// Rebuild the table from glossary entries and tagged references
    pub fn rebuild<D: DocumentSource>(&self, document: &D, roots: &ProjectRoots) -> Result<GlossaryTable, DocumentError> {
        let mut table = GlossaryTable::new();

        let glossary = bounds(document, &roots.glossary)?;
        let sections = document.sections();
        let level = sections
            .iter()
            .find(|s| s.begin == glossary.begin)
            .map_or(1, |s| s.level);
        for entry in sections
            .iter()
            .filter(|s| s.begin > glossary.begin && s.begin < glossary.end && s.level == level + 1)
        {
            if let Some(id) = &entry.id {
                table.add_source_term(&TermId::from(id.clone()), entry.title.trim());
            }
        }

        let source = bounds(document, &roots.source)?;
        for reference in document.tag_references_in_range(source.contents_begin, source.end) {
            table.add_source_term(&reference.term_id, &reference.display);
        }

        let translation = bounds(document, &roots.translation)?;
        for reference in document.tag_references_in_range(translation.contents_begin, translation.end) {
            table.add_known_translation(&reference.term_id, &reference.display);
        }

        debug!("Glossary rebuilt with {} entries", table.len());
        Ok(table)
    }
}
