/*!
 * A project session over one open document.
 *
 * The session ties the engine together: it resolves the three roots once,
 * owns the tracker state and the glossary table, and keeps every stored
 * offset (translator cursor, probable source position, highlight) valid
 * across the edits it performs itself.
 */

use log::{debug, info};
use std::ops::Range;

use super::surface::{Choice, InteractionSurface};
use crate::app_config::ProjectConfig;
use crate::document::{DocumentSource, SectionBounds, Stream, TermId};
use crate::errors::{DocumentError, GlossaryError, ProjectError, TrackerError};
use crate::glossary::{GlossaryManager, GlossaryTable, Registration};
use crate::locator::{resolve_roots, ProjectRoots};
use crate::progress::progress_percentage;
use crate::segmentation::{SegmentationPlan, Segmenter};
use crate::tracker::{shift_offset, CorrespondenceTracker, Movement, Resync, TrackerState};

/// An active project bound to its document
pub struct Project<'d, D: DocumentSource> {
    document: &'d mut D,
    settings: ProjectConfig,
    roots: ProjectRoots,
    segmenter: Segmenter,
    tracker: CorrespondenceTracker,
    glossary: GlossaryTable,
    glossary_manager: GlossaryManager,
    /// Translator position in the translation stream
    cursor: usize,
}

impl<'d, D: DocumentSource> Project<'d, D> {
    /// Activate a project: validate the settings, resolve the three roots and
    /// rebuild the glossary table. Nothing is kept if any step fails.
    pub fn activate(document: &'d mut D, settings: ProjectConfig) -> Result<Self, ProjectError> {
        let segmenter = Segmenter::new(&settings.strategy, settings.delimiter)?;
        let roots = resolve_roots(&settings, &mut *document)?;
        let glossary_manager = GlossaryManager::new(settings.delimiter);
        let glossary = glossary_manager.rebuild(&*document, &roots)?;

        let translation = document
            .find_section(&roots.translation)
            .ok_or_else(|| DocumentError::MissingSection(roots.translation.to_string()))?;

        info!(
            "Project activated ({} strategy, {} glossary entries)",
            settings.strategy,
            glossary.len()
        );

        Ok(Self {
            document,
            segmenter,
            tracker: CorrespondenceTracker::new(settings.delimiter),
            glossary,
            glossary_manager,
            cursor: translation.contents_begin,
            roots,
            settings,
        })
    }

    /// Use the sentence rules of the project languages
    pub fn with_languages(mut self, source_language: &str, target_language: &str) -> Self {
        self.segmenter = self.segmenter.with_languages(source_language, target_language);
        self
    }

    pub fn roots(&self) -> &ProjectRoots {
        &self.roots
    }

    pub fn settings(&self) -> &ProjectConfig {
        &self.settings
    }

    pub fn glossary(&self) -> &GlossaryTable {
        &self.glossary
    }

    pub fn tracker_state(&self) -> &TrackerState {
        self.tracker.state()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn document(&self) -> &D {
        &*self.document
    }

    /// Current bounds of one of the three streams
    pub fn bounds(&self, stream: Stream) -> Result<SectionBounds, DocumentError> {
        let id = self.roots.get(stream);
        self.document
            .find_section(id)
            .ok_or_else(|| DocumentError::MissingSection(id.to_string()))
    }

    pub fn source_bounds(&self) -> Result<SectionBounds, DocumentError> {
        self.bounds(Stream::Source)
    }

    pub fn translation_bounds(&self) -> Result<SectionBounds, DocumentError> {
        self.bounds(Stream::Translation)
    }

    // =========================================================================
    // Segmentation
    // =========================================================================

    /// Segment the source stream, and the translation stream too when the
    /// settings ask for it. Returns the number of delimiters inserted.
    pub fn segment_source<S: InteractionSurface>(&mut self, surface: &mut S) -> Result<usize, ProjectError> {
        let plan = self.segmenter.plan(&*self.document, &self.roots.source, Stream::Source)?;
        let mut inserted = self.confirm_and_apply(&plan, surface)?;
        if self.settings.segment_translation {
            inserted += self.ensure_translation_segmented(surface)?;
        }
        Ok(inserted)
    }

    /// Segment the translation stream unless it already holds delimiters
    pub fn ensure_translation_segmented<S: InteractionSurface>(&mut self, surface: &mut S) -> Result<usize, ProjectError> {
        let bounds = self.translation_bounds()?;
        let existing = self.segmenter.count_delimiters(&*self.document, &bounds)?;
        if existing > 0 {
            debug!("Translation stream already holds {} delimiters", existing);
            return Ok(0);
        }
        let plan = self
            .segmenter
            .plan(&*self.document, &self.roots.translation, Stream::Translation)?;
        self.confirm_and_apply(&plan, surface)
    }

    /// Strip every delimiter from `stream` and segment it again.
    ///
    /// The recovery path once the streams drifted apart. If the surface
    /// declines, the removed delimiters are put back where they were.
    pub fn resegment<S: InteractionSurface>(&mut self, stream: Stream, surface: &mut S) -> Result<usize, ProjectError> {
        let bounds = self.bounds(stream)?;
        let delimiter = self.segmenter.delimiter().to_string();
        let width = delimiter.len();

        let mut removed = Vec::new();
        let mut from = bounds.contents_begin;
        while let Some(found) = self.document.search_forward(&delimiter, from, Some(bounds.end), 1) {
            removed.push(found);
            from = found + width;
        }
        for at in removed.iter().rev() {
            self.document.replace_range(*at, *at + width, "")?;
        }

        let plan = match self.segmenter.plan(&*self.document, self.roots.get(stream), stream) {
            Ok(plan) => plan,
            Err(e) => {
                self.restore_delimiters(&removed)?;
                return Err(e.into());
            }
        };
        if !plan.is_empty() && !surface.confirm_segmentation(stream, plan.len()) {
            self.restore_delimiters(&removed)?;
            info!("Re-segmentation of the {} stream cancelled", stream);
            return Ok(0);
        }

        for at in removed.iter().rev() {
            self.cursor = shift_offset(self.cursor, *at, -(width as isize));
        }
        self.tracker.reset();
        info!("Removed {} delimiters from the {} stream", removed.len(), stream);
        self.apply_plan(&plan, surface)
    }

    fn restore_delimiters(&mut self, removed: &[usize]) -> Result<(), DocumentError> {
        let delimiter = self.segmenter.delimiter().to_string();
        for at in removed {
            self.document.insert_at(*at, &delimiter)?;
        }
        Ok(())
    }

    fn confirm_and_apply<S: InteractionSurface>(&mut self, plan: &SegmentationPlan, surface: &mut S) -> Result<usize, ProjectError> {
        if plan.is_empty() {
            debug!("Nothing to segment in the {} stream", plan.stream());
            return Ok(0);
        }
        if !surface.confirm_segmentation(plan.stream(), plan.len()) {
            info!("Segmentation of the {} stream cancelled", plan.stream());
            return Ok(0);
        }
        self.apply_plan(plan, surface)
    }

    fn apply_plan<S: InteractionSurface>(&mut self, plan: &SegmentationPlan, surface: &mut S) -> Result<usize, ProjectError> {
        let before = self.tracker.state().highlight_range.clone();
        let inserted = plan.apply(&mut *self.document)?;

        self.cursor = plan.shifted(self.cursor);
        let width = self.segmenter.delimiter().len_utf8() as isize;
        for boundary in plan.boundaries().iter().rev() {
            self.tracker.shift(*boundary, width);
        }
        for position in &inserted {
            surface.segment_boundary_inserted(plan.stream(), *position);
        }

        let source = self.source_bounds()?;
        self.tracker.refresh_highlight(&*self.document, &source);
        self.notify_highlight(before, surface);

        info!("Segmented the {} stream into {} segments", plan.stream(), inserted.len());
        Ok(inserted.len())
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Move the translator cursor and resynchronise the source position
    pub fn set_cursor<S: InteractionSurface>(&mut self, position: usize, surface: &mut S) -> Result<Resync, ProjectError> {
        let translation = self.translation_bounds()?;
        if !translation.contains(position) {
            return Err(TrackerError::OutOfBounds {
                stream: Stream::Translation,
                position,
                start: translation.contents_begin,
                end: translation.end,
            }
            .into());
        }
        self.cursor = position;
        self.resync(surface)
    }

    /// Recompute the probable source position from the cursor
    pub fn resync<S: InteractionSurface>(&mut self, surface: &mut S) -> Result<Resync, ProjectError> {
        let source = self.source_bounds()?;
        let translation = self.translation_bounds()?;
        let before = self.tracker.state().highlight_range.clone();

        let resync = self
            .tracker
            .locate_in_source(&*self.document, &source, &translation, self.cursor)?;
        self.notify_highlight(before, surface);
        Ok(resync)
    }

    /// Move `count` segments in both streams (negative: backward)
    pub fn move_segments<S: InteractionSurface>(&mut self, count: isize, surface: &mut S) -> Result<Movement, ProjectError> {
        let source = self.source_bounds()?;
        let translation = self.translation_bounds()?;
        let before = self.tracker.state().highlight_range.clone();

        let movement = self
            .tracker
            .move_segments(&*self.document, &source, &translation, self.cursor, count)?;
        self.cursor = movement.cursor;
        self.notify_highlight(before, surface);
        Ok(movement)
    }

    fn notify_highlight<S: InteractionSurface>(&self, before: Option<Range<usize>>, surface: &mut S) {
        let after = &self.tracker.state().highlight_range;
        if *after != before {
            surface.highlight_changed(after.clone());
        }
    }

    /// Percentage of the source stream behind the probable source position
    pub fn progress(&self) -> Option<f64> {
        let position = self.tracker.probable_source_position()?;
        let source = self.source_bounds().ok()?;
        Some(progress_percentage(position, source.contents_begin, source.end))
    }

    /// Text of the source segment matching the translator's position
    pub fn highlighted_text(&self) -> Option<&str> {
        let range = self.tracker.state().highlight_range.as_ref()?;
        self.document.read_range(range.start, range.end).ok()
    }

    // =========================================================================
    // Glossary
    // =========================================================================

    /// Register a glossary term and link its occurrences in the source
    pub fn register_term(&mut self, source_text: &str) -> Result<Registration, ProjectError> {
        let registration =
            self.glossary_manager
                .register_term(&mut *self.document, &mut self.glossary, &self.roots, source_text)?;

        for edit in &registration.edits {
            self.cursor = shift_offset(self.cursor, edit.at, edit.delta);
            self.tracker.shift(edit.at, edit.delta);
        }
        let source = self.source_bounds()?;
        self.tracker.refresh_highlight(&*self.document, &source);
        Ok(registration)
    }

    /// Offer the next untranslated term of the current segment and insert
    /// the chosen translation at the cursor.
    ///
    /// The source segment is resolved from the cursor every time, since the
    /// translator may have typed new segments since the last resync. Returns
    /// `None` when the surface aborted; nothing is changed then.
    pub fn translate_next_term<S: InteractionSurface>(&mut self, surface: &mut S) -> Result<Option<TermId>, ProjectError> {
        let source = self.source_bounds()?;
        let translation = self.translation_bounds()?;
        let resync = self
            .tracker
            .resolve_in_source(&*self.document, &source, &translation, self.cursor)?;
        let probable = resync
            .position()
            .or(self.tracker.probable_source_position())
            .ok_or(GlossaryError::NoPendingTerm)?;

        let choice = self.glossary_manager.next_translation_choice(
            &*self.document,
            &self.glossary,
            &self.roots,
            probable,
            self.cursor,
        )?;

        let chosen = match surface.request_translation_choice(&choice) {
            Choice::Chosen(text) if !text.trim().is_empty() => text,
            _ => {
                debug!("Translation of term {} aborted", choice.term_id);
                return Ok(None);
            }
        };

        if resync.position().is_some() {
            self.resync(surface)?;
        }
        let reference = self.document.render_tag_reference(&choice.term_id, &chosen);
        self.insert_translation(&reference, surface)?;
        self.glossary_manager
            .record_translation(&mut self.glossary, &choice.term_id, &chosen);
        info!("Translated '{}' as '{}'", choice.source_text, chosen);
        Ok(Some(choice.term_id))
    }

    /// Type `text` at the cursor, which moves past it.
    ///
    /// Typing into an empty translation section opens a line of its own so
    /// the text stays off the next heading. A typed delimiter starts a new
    /// segment, so the source position is resynchronised.
    pub fn insert_translation<S: InteractionSurface>(&mut self, text: &str, surface: &mut S) -> Result<(), ProjectError> {
        let at = self.cursor;
        let translation = self.translation_bounds()?;
        let at_line_start = at > 0
            && self
                .document
                .read_range(at - 1, at)
                .is_ok_and(|before| before == "\n");

        let delta = if at == translation.end && at_line_start && !text.ends_with('\n') {
            self.document.insert_at(at, &format!("{}\n", text))?
        } else {
            self.document.insert_at(at, text)?
        };
        self.tracker.shift(at, delta as isize);
        self.cursor = at + text.len();

        let delimiter = self.segmenter.delimiter();
        if text.contains(delimiter) {
            for (offset, _) in text.match_indices(delimiter) {
                surface.segment_boundary_inserted(Stream::Translation, at + offset);
            }
            self.resync(surface)?;
        }
        Ok(())
    }

    /// Close the session, dropping tracker state. Returns the resolved roots
    /// so the caller can pin them in the project settings.
    pub fn deactivate(mut self) -> ProjectRoots {
        self.tracker.reset();
        info!("Project deactivated");
        self.roots
    }
}
