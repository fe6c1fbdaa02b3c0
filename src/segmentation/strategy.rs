/*!
 * Intra-paragraph splitting strategies.
 *
 * A mover starts from an offset inside a paragraph and returns the offset
 * where the next segment begins. The engine applies it repeatedly until
 * the paragraph is exhausted.
 */

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use unicode_segmentation::UnicodeSegmentation;

use crate::errors::ConfigError;
use crate::language_utils::normalize_to_part2t;

/// Page delimiter, always a segment boundary
pub const PAGE_DELIMITER: char = '\u{000C}';

/// Configured splitting strategy
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SegmentationStrategy {
    /// One segment per sentence
    #[default]
    Sentence,
    /// One segment per paragraph
    Paragraph,
    /// A new segment after every match of the pattern
    Regex { pattern: String },
}

impl fmt::Display for SegmentationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sentence => write!(f, "sentence"),
            Self::Paragraph => write!(f, "paragraph"),
            Self::Regex { pattern } => write!(f, "regex /{}/", pattern),
        }
    }
}

/// Abbreviations ending in a period that do not end a sentence, per
/// ISO 639-2/T code. UAX #29 itself is language independent.
const ABBREVIATIONS: &[(&str, &[&str])] = &[
    ("eng", &["Mr", "Mrs", "Ms", "Dr", "Prof", "St", "Jr", "Sr", "Mt", "vs", "etc", "e.g", "i.e", "No"]),
    ("fra", &["M", "Mme", "Mlle", "MM", "Dr", "Pr", "St", "Ste", "cf", "etc", "p.ex"]),
    ("deu", &["Dr", "Prof", "Hr", "Fr", "Nr", "St", "bzw", "ca", "usw", "z.B", "d.h", "u.a"]),
    ("spa", &["Sr", "Sra", "Srta", "Dr", "Dra", "Ud", "Uds", "etc", "p.ej"]),
    ("ita", &["Sig", "Sig.ra", "Dott", "Prof", "ecc", "ad.es"]),
    ("por", &["Sr", "Sra", "Dr", "Dra", "etc"]),
    ("nld", &["dhr", "mevr", "dr", "bijv", "enz", "o.a"]),
];

/// Abbreviation table for `language`, empty for unknown languages
pub fn abbreviations_for(language: &str) -> &'static [&'static str] {
    let Ok(code) = normalize_to_part2t(language) else {
        return &[];
    };
    ABBREVIATIONS
        .iter()
        .find(|(lang, _)| *lang == code)
        .map(|(_, list)| *list)
        .unwrap_or(&[])
}

/// A compiled strategy
#[derive(Debug, Clone)]
pub enum SegmentMover {
    Sentence { abbreviations: &'static [&'static str] },
    Paragraph,
    Regex(Regex),
}

impl SegmentMover {
    pub fn from_strategy(strategy: &SegmentationStrategy) -> Result<Self, ConfigError> {
        match strategy {
            SegmentationStrategy::Sentence => Ok(Self::Sentence { abbreviations: &[] }),
            SegmentationStrategy::Paragraph => Ok(Self::Paragraph),
            SegmentationStrategy::Regex { pattern } => Regex::new(pattern)
                .map(Self::Regex)
                .map_err(|e| ConfigError::InvalidStrategy {
                    pattern: pattern.clone(),
                    message: e.to_string(),
                }),
        }
    }

    /// Same strategy, with the sentence rules of `language`
    pub fn for_language(self, language: &str) -> Self {
        match self {
            Self::Sentence { .. } => Self::Sentence {
                abbreviations: abbreviations_for(language),
            },
            other => other,
        }
    }

    /// Offset of the next segment start after `from`, or `None` when the
    /// rest of the paragraph is a single segment
    pub fn next_boundary(&self, paragraph: &str, from: usize) -> Option<usize> {
        let rest = &paragraph[from..];
        let end = match self {
            Self::Paragraph => return None,
            Self::Sentence { abbreviations } => {
                // Line breaks inside a paragraph are only wrapping
                let flattened = rest.replace(['\n', '\r'], " ");
                let mut length = 0;
                for sentence in flattened.split_sentence_bounds() {
                    length += sentence.len();
                    if !ends_with_abbreviation(&flattened[..length], abbreviations) {
                        break;
                    }
                }
                if length == 0 {
                    return None;
                }
                from + length
            }
            Self::Regex(regex) => {
                let found = regex
                    .find_iter(paragraph)
                    .find(|m| m.end() > from && m.start() >= from && !m.as_str().is_empty())?;
                found.end()
            }
        };
        Some(skip_blanks(paragraph, end))
    }

    /// All segment starts strictly inside the paragraph, ascending
    pub fn boundaries(&self, paragraph: &str) -> Vec<usize> {
        let mut boundaries = Vec::new();
        let mut position = 0;
        while let Some(next) = self.next_boundary(paragraph, position) {
            if next <= position || at_paragraph_end(paragraph, next) {
                break;
            }
            boundaries.push(next);
            position = next;
        }

        for (index, _) in paragraph.match_indices(PAGE_DELIMITER) {
            let after = skip_blanks(paragraph, index + PAGE_DELIMITER.len_utf8());
            if !at_paragraph_end(paragraph, after) {
                boundaries.push(after);
            }
        }
        boundaries.sort_unstable();
        boundaries.dedup();
        boundaries
    }
}

/// Whether `text` ends with one of `abbreviations` followed by a period
fn ends_with_abbreviation(text: &str, abbreviations: &[&str]) -> bool {
    let Some(body) = text.trim_end().strip_suffix('.') else {
        return false;
    };
    let word = body
        .rsplit(|c: char| c.is_whitespace() || "([\"'«".contains(c))
        .next()
        .unwrap_or(body);
    abbreviations.contains(&word)
}

fn skip_blanks(text: &str, from: usize) -> usize {
    let rest = &text[from..];
    from + (rest.len() - rest.trim_start().len())
}

/// A boundary with only whitespace after it snaps to the paragraph end
fn at_paragraph_end(paragraph: &str, position: usize) -> bool {
    paragraph[position..].trim().is_empty()
}
