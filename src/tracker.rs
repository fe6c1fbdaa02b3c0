/*!
 * Ordinal correspondence between the translation and the source stream.
 *
 * Nothing links a translation segment to its source segment except their
 * position in the sequence: the n-th delimiter of one stream corresponds
 * to the n-th delimiter of the other. The tracker turns a translation
 * position into an ordinal by counting delimiters, then walks the same
 * number of delimiters in the source.
 *
 * The resulting source position is only *probable*. Both streams are edited
 * by hand, so the counts can drift apart; when they do the tracker keeps
 * its previous guess and reports a mismatch instead of failing.
 */

use log::{debug, warn};
use std::ops::Range;

use crate::document::{DocumentSource, SectionBounds, Stream};
use crate::errors::TrackerError;

/// Tracker state owned by a project session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackerState {
    /// Best guess of the source offset matching the translator's position
    pub probable_source_position: Option<usize>,
    /// Extent of the source segment around the probable position
    pub highlight_range: Option<Range<usize>>,
}

/// Outcome of a resynchronisation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resync {
    /// The probable source position was updated
    Located(usize),
    /// The source has fewer segments than the translation ordinal requires
    Mismatch {
        /// Ordinal requested by the translation side
        ordinal: usize,
        /// Delimiters actually present in the source
        available: usize,
    },
}

impl Resync {
    pub fn position(&self) -> Option<usize> {
        match self {
            Self::Located(position) => Some(*position),
            Self::Mismatch { .. } => None,
        }
    }

    pub fn is_mismatch(&self) -> bool {
        matches!(self, Self::Mismatch { .. })
    }
}

/// Result of moving across segments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Movement {
    /// New translation cursor
    pub cursor: usize,
    /// What happened on the source side
    pub resync: Resync,
}

/// Computes and holds the probable source position
#[derive(Debug, Clone)]
pub struct CorrespondenceTracker {
    delimiter: String,
    state: TrackerState,
}

impl CorrespondenceTracker {
    pub fn new(delimiter: char) -> Self {
        Self {
            delimiter: delimiter.to_string(),
            state: TrackerState::default(),
        }
    }

    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    pub fn probable_source_position(&self) -> Option<usize> {
        self.state.probable_source_position
    }

    pub fn reset(&mut self) {
        self.state = TrackerState::default();
    }

    /// Number of delimiters between the start of `bounds` and `position`
    pub fn segment_ordinal<D: DocumentSource>(&self, document: &D, bounds: &SectionBounds, position: usize) -> usize {
        let mut count = 0;
        let mut cursor = position.min(bounds.end);
        while let Some(found) = document.search_backward(&self.delimiter, cursor, Some(bounds.contents_begin)) {
            count += 1;
            cursor = found;
        }
        count
    }

    /// Start of the segment following the `ordinal`-th delimiter
    fn skip_delimiters<D: DocumentSource>(&self, document: &D, bounds: &SectionBounds, ordinal: usize) -> Option<usize> {
        if ordinal == 0 {
            return Some(bounds.contents_begin);
        }
        document
            .search_forward(&self.delimiter, bounds.contents_begin, Some(bounds.end), ordinal)
            .map(|found| found + self.delimiter.len())
    }

    /// Move `count` segments from `from` inside `bounds`.
    ///
    /// Forward lands after the `count`-th following delimiter; backward
    /// lands after the `(|count|+1)`-th preceding one, i.e. at the start of
    /// the segment `|count|` before the current one.
    fn step<D: DocumentSource>(&self, document: &D, bounds: &SectionBounds, from: usize, count: isize) -> Option<usize> {
        let width = self.delimiter.len();
        if count > 0 {
            return document
                .search_forward(&self.delimiter, from, Some(bounds.end), count as usize)
                .map(|found| found + width);
        }
        let mut cursor = from;
        for _ in 0..=count.unsigned_abs() {
            cursor = document.search_backward(&self.delimiter, cursor, Some(bounds.contents_begin))?;
        }
        Some(cursor + width)
    }

    /// Resolve the source position matching `translation_position`.
    ///
    /// Fails only when the position lies outside the translation stream.
    /// A segment-count mismatch keeps the previous state.
    pub fn locate_in_source<D: DocumentSource>(
        &mut self,
        document: &D,
        source: &SectionBounds,
        translation: &SectionBounds,
        translation_position: usize,
    ) -> Result<Resync, TrackerError> {
        let resync = self.resolve_in_source(document, source, translation, translation_position)?;
        if let Resync::Located(position) = resync {
            self.set_probable(document, source, position);
        }
        Ok(resync)
    }

    /// Like [`Self::locate_in_source`], without touching the tracker state
    pub fn resolve_in_source<D: DocumentSource>(
        &self,
        document: &D,
        source: &SectionBounds,
        translation: &SectionBounds,
        translation_position: usize,
    ) -> Result<Resync, TrackerError> {
        if !translation.contains(translation_position) {
            return Err(TrackerError::OutOfBounds {
                stream: Stream::Translation,
                position: translation_position,
                start: translation.contents_begin,
                end: translation.end,
            });
        }

        let ordinal = self.segment_ordinal(document, translation, translation_position);
        match self.skip_delimiters(document, source, ordinal) {
            Some(position) => {
                debug!("Translation ordinal {} maps to source offset {}", ordinal, position);
                Ok(Resync::Located(position))
            }
            None => Ok(self.mismatch(document, source, ordinal)),
        }
    }

    /// Move the translation cursor `count` segments (negative: backward) and
    /// mirror the movement in the source.
    pub fn move_segments<D: DocumentSource>(
        &mut self,
        document: &D,
        source: &SectionBounds,
        translation: &SectionBounds,
        cursor: usize,
        count: isize,
    ) -> Result<Movement, TrackerError> {
        if !translation.contains(cursor) {
            return Err(TrackerError::OutOfBounds {
                stream: Stream::Translation,
                position: cursor,
                start: translation.contents_begin,
                end: translation.end,
            });
        }
        if count == 0 {
            let resync = self.locate_in_source(document, source, translation, cursor)?;
            return Ok(Movement { cursor, resync });
        }

        let moved = self
            .step(document, translation, cursor, count)
            .ok_or(TrackerError::NoSuchSegment {
                stream: Stream::Translation,
                count,
            })?;

        let resync = match self.state.probable_source_position {
            Some(probable) if source.contains(probable) => match self.step(document, source, probable, count) {
                Some(position) => {
                    self.set_probable(document, source, position);
                    Resync::Located(position)
                }
                None => {
                    let ordinal = self.segment_ordinal(document, translation, moved);
                    self.mismatch(document, source, ordinal)
                }
            },
            _ => self.locate_in_source(document, source, translation, moved)?,
        };

        Ok(Movement { cursor: moved, resync })
    }

    /// Recompute the highlight from the current probable position
    pub fn refresh_highlight<D: DocumentSource>(&mut self, document: &D, source: &SectionBounds) {
        self.state.highlight_range = self
            .state
            .probable_source_position
            .and_then(|position| highlight_range(document, source, position, &self.delimiter));
    }

    /// Keep offsets valid after `delta` bytes were inserted (or removed) at `at`
    pub fn shift(&mut self, at: usize, delta: isize) {
        if let Some(position) = self.state.probable_source_position.as_mut() {
            *position = shift_offset(*position, at, delta);
        }
        if let Some(range) = self.state.highlight_range.as_mut() {
            *range = shift_offset(range.start, at, delta)..shift_offset(range.end, at, delta);
        }
    }

    fn set_probable<D: DocumentSource>(&mut self, document: &D, source: &SectionBounds, position: usize) {
        self.state.probable_source_position = Some(position);
        self.refresh_highlight(document, source);
    }

    fn mismatch<D: DocumentSource>(&self, document: &D, source: &SectionBounds, ordinal: usize) -> Resync {
        let available = self.segment_ordinal(document, source, source.end);
        warn!(
            "Segment count mismatch: the translation is at segment {} but the source only has {}; re-segment to realign",
            ordinal, available
        );
        Resync::Mismatch { ordinal, available }
    }
}

/// Shift `offset` for an edit of `delta` bytes at `at`. Offsets inside a
/// removed span collapse onto `at`.
pub fn shift_offset(offset: usize, at: usize, delta: isize) -> usize {
    if offset <= at {
        return offset;
    }
    (offset as isize + delta).max(at as isize) as usize
}

/// Extent of the source segment around `position`.
///
/// A position sitting on a delimiter belongs to the following segment. The
/// segment ends at the next delimiter, else at the next blank line, else at
/// the end of the subtree. A segment followed by a sub-heading ends before
/// the heading line; trailing whitespace is trimmed.
pub fn highlight_range<D: DocumentSource>(
    document: &D,
    bounds: &SectionBounds,
    position: usize,
    delimiter: &str,
) -> Option<Range<usize>> {
    let mut position = position.clamp(bounds.contents_begin, bounds.end);
    let width = delimiter.len();
    if position + width <= bounds.end
        && document
            .read_range(position, position + width)
            .is_ok_and(|text| text == delimiter)
    {
        position += width;
    }

    let start = document
        .search_backward(delimiter, position, Some(bounds.contents_begin))
        .map_or(bounds.contents_begin, |found| found + width);

    let end = document
        .search_forward(delimiter, position, Some(bounds.end), 1)
        .or_else(|| document.search_forward("\n\n", position, Some(bounds.end), 1))
        .unwrap_or(bounds.end);

    let mut text = document.read_range(start, end).ok()?;
    if let Some(newline) = text.rfind('\n') {
        // A sub-heading delimiter follows the stars
        let tail = &text[newline + 1..];
        let after_stars = tail.trim_start_matches('*');
        if after_stars.len() < tail.len() && after_stars.trim().is_empty() {
            text = &text[..newline];
        }
    }

    Some(start..start + text.trim_end().len())
}
