/*!
 * Callbacks from a project session to whoever drives it.
 *
 * Every call is synchronous. The session only commits a change after the
 * surface answered, so an abort never leaves partial state behind.
 */

use std::ops::Range;

use crate::document::Stream;
use crate::glossary::TranslationChoice;

/// Answer to a translation choice prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice {
    /// Use this translation (picked from the candidates or typed anew)
    Chosen(String),
    /// Leave everything as it was
    Aborted,
}

/// Interaction points of a project session
pub trait InteractionSurface {
    /// Pick a translation for the next term of the current segment
    fn request_translation_choice(&mut self, choice: &TranslationChoice) -> Choice;

    /// Confirm inserting `boundaries` delimiters into `stream`
    fn confirm_segmentation(&mut self, stream: Stream, boundaries: usize) -> bool;

    /// A delimiter was inserted at `position`
    fn segment_boundary_inserted(&mut self, _stream: Stream, _position: usize) {}

    /// The source segment matching the translator's position changed
    fn highlight_changed(&mut self, _range: Option<Range<usize>>) {}
}

/// Non-interactive surface: confirms everything and keeps the most recent
/// translation, or the source text itself for a term never translated.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSurface;

impl InteractionSurface for NullSurface {
    fn request_translation_choice(&mut self, choice: &TranslationChoice) -> Choice {
        let text = choice
            .candidates
            .first()
            .cloned()
            .unwrap_or_else(|| choice.source_text.clone());
        Choice::Chosen(text)
    }

    fn confirm_segmentation(&mut self, _stream: Stream, _boundaries: usize) -> bool {
        true
    }
}
