/*!
 * Delimiter placement over a section subtree.
 *
 * Every structural element starts a segment: a sub-heading right before
 * its title, a block or paragraph at the start of its text. Paragraphs are
 * further split by the configured mover. Boundaries are collected into a
 * plan first and inserted afterwards, so a plan can be inspected or
 * discarded without touching the document.
 */

use log::{debug, info};

use super::strategy::{SegmentMover, SegmentationStrategy};
use crate::document::{DocumentSource, ElementKind, SectionBounds, SectionId, Stream};
use crate::errors::{ConfigError, DocumentError, SegmentationError};

/// Characters that carry meaning in the outline markup
const MARKUP_CHARS: &[char] = &['*', '[', ']', ':', '|', '#', '-', '+', '\u{000C}'];

/// Check that `delimiter` cannot be confused with ordinary text
pub fn validate_delimiter(delimiter: char) -> Result<(), ConfigError> {
    if delimiter.is_whitespace()
        || delimiter.is_alphanumeric()
        || delimiter.is_control()
        || MARKUP_CHARS.contains(&delimiter)
    {
        return Err(ConfigError::InvalidDelimiter(delimiter));
    }
    Ok(())
}

/// Delimiter positions computed for one subtree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentationPlan {
    stream: Stream,
    delimiter: char,
    boundaries: Vec<usize>,
}

impl SegmentationPlan {
    pub fn stream(&self) -> Stream {
        self.stream
    }

    /// Insertion offsets in the current text, ascending
    pub fn boundaries(&self) -> &[usize] {
        &self.boundaries
    }

    pub fn len(&self) -> usize {
        self.boundaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boundaries.is_empty()
    }

    /// Where `position` ends up once the plan is applied
    pub fn shifted(&self, position: usize) -> usize {
        let before = self.boundaries.iter().filter(|b| **b < position).count();
        position + before * self.delimiter.len_utf8()
    }

    /// Insert the delimiters, back to front. Returns the final delimiter offsets.
    pub fn apply<D: DocumentSource>(&self, document: &mut D) -> Result<Vec<usize>, DocumentError> {
        let delimiter = self.delimiter.to_string();
        for boundary in self.boundaries.iter().rev() {
            document.insert_at(*boundary, &delimiter)?;
        }
        let width = delimiter.len();
        Ok(self
            .boundaries
            .iter()
            .enumerate()
            .map(|(index, boundary)| boundary + index * width)
            .collect())
    }
}

/// Splits subtrees into delimiter-separated segments
#[derive(Debug, Clone)]
pub struct Segmenter {
    source_mover: SegmentMover,
    translation_mover: SegmentMover,
    delimiter: char,
}

impl Segmenter {
    pub fn new(strategy: &SegmentationStrategy, delimiter: char) -> Result<Self, ConfigError> {
        validate_delimiter(delimiter)?;
        let mover = SegmentMover::from_strategy(strategy)?;
        Ok(Self {
            source_mover: mover.clone(),
            translation_mover: mover,
            delimiter,
        })
    }

    /// Apply the sentence rules of each stream's language
    pub fn with_languages(self, source_language: &str, target_language: &str) -> Self {
        Self {
            source_mover: self.source_mover.for_language(source_language),
            translation_mover: self.translation_mover.for_language(target_language),
            delimiter: self.delimiter,
        }
    }

    fn mover(&self, stream: Stream) -> &SegmentMover {
        match stream {
            Stream::Translation => &self.translation_mover,
            _ => &self.source_mover,
        }
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// Number of delimiters inside the subtree contents
    pub fn count_delimiters<D: DocumentSource>(&self, document: &D, bounds: &SectionBounds) -> Result<usize, DocumentError> {
        Ok(document
            .read_range(bounds.contents_begin, bounds.end)?
            .matches(self.delimiter)
            .count())
    }

    /// Compute delimiter positions for the subtree `root`.
    ///
    /// Refuses a subtree that already holds delimiters: inserting a second
    /// set would corrupt every ordinal. Boundaries never fall inside a
    /// tagged reference.
    pub fn plan<D: DocumentSource>(&self, document: &D, root: &SectionId, stream: Stream) -> Result<SegmentationPlan, SegmentationError> {
        let bounds = document
            .find_section(root)
            .ok_or_else(|| DocumentError::MissingSection(root.to_string()))?;

        let existing = self.count_delimiters(document, &bounds)?;
        if existing > 0 {
            return Err(SegmentationError::AlreadySegmented { stream, existing });
        }

        let mut boundaries = Vec::new();
        for element in document.elements_in_range(bounds.contents_begin, bounds.end) {
            boundaries.push(element.contents_begin);
            if element.kind == ElementKind::Paragraph {
                let text = document.read_range(element.contents_begin, element.contents_end)?;
                let references = document.tag_references_in_range(element.contents_begin, element.contents_end);
                boundaries.extend(
                    self.mover(stream)
                        .boundaries(text)
                        .into_iter()
                        .map(|offset| element.contents_begin + offset)
                        .filter(|offset| {
                            !references
                                .iter()
                                .any(|reference| reference.start < *offset && *offset < reference.end)
                        }),
                );
            }
        }
        boundaries.dedup();

        debug!("Planned {} {} segments in {}", boundaries.len(), stream, root);
        Ok(SegmentationPlan {
            stream,
            delimiter: self.delimiter,
            boundaries,
        })
    }

    /// Plan and apply in one step
    pub fn segment<D: DocumentSource>(&self, document: &mut D, root: &SectionId, stream: Stream) -> Result<Vec<usize>, SegmentationError> {
        let plan = self.plan(document, root, stream)?;
        let inserted = plan.apply(document)?;
        info!("Segmented the {} stream into {} segments", stream, inserted.len());
        Ok(inserted)
    }
}
