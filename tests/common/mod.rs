/*!
 * Common test utilities for the bitext test suite
 */

#![allow(dead_code)]

use anyhow::Result;
use std::collections::VecDeque;
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use bitext::document::{OutlineDocument, Stream};
use bitext::glossary::TranslationChoice;
use bitext::session::{Choice, InteractionSurface};

/// A bilingual document with two sentences on each side
pub const BILINGUAL: &str = "#+TITLE: Sample\n\
* Original :source:\n\
Hello. World.\n\
* Translated :translation:\n\
Bonjour. Monde.\n\
* Terms :glossary:\n";

/// A longer source with a sub-heading and a list
pub const CHAPTERS: &str = "* Original :source:\n\
The cat sleeps. The dog barks.\n\
\n\
** Chapter two\n\
An apple a day. Keeps the doctor away.\n\
\n\
- one item\n\
- another item\n\
* Translated :translation:\n\
* Terms :glossary:\n";

/// Route library logs to the test output; safe to call from every test
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn document(text: &str) -> OutlineDocument {
    OutlineDocument::new(text)
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Surface that answers from a script and records every notification
#[derive(Debug, Default)]
pub struct ScriptedSurface {
    pub choices: VecDeque<Choice>,
    pub confirm: bool,
    pub offered: Vec<TranslationChoice>,
    pub confirmations: Vec<(Stream, usize)>,
    pub inserted: Vec<(Stream, usize)>,
    pub highlights: Vec<Option<Range<usize>>>,
}

impl ScriptedSurface {
    pub fn confirming() -> Self {
        Self {
            confirm: true,
            ..Self::default()
        }
    }

    pub fn with_choices(choices: Vec<Choice>) -> Self {
        Self {
            choices: choices.into(),
            confirm: true,
            ..Self::default()
        }
    }
}

impl InteractionSurface for ScriptedSurface {
    fn request_translation_choice(&mut self, choice: &TranslationChoice) -> Choice {
        self.offered.push(choice.clone());
        self.choices.pop_front().unwrap_or(Choice::Aborted)
    }

    fn confirm_segmentation(&mut self, stream: Stream, boundaries: usize) -> bool {
        self.confirmations.push((stream, boundaries));
        self.confirm
    }

    fn segment_boundary_inserted(&mut self, stream: Stream, position: usize) {
        self.inserted.push((stream, position));
    }

    fn highlight_changed(&mut self, range: Option<Range<usize>>) {
        self.highlights.push(range);
    }
}
