/*!
 * Locating the named sections of a project.
 *
 * A locator is only a way to find a section the first time. Once found,
 * the section is given a durable identifier and every later access goes
 * through that identifier.
 */

use log::{debug, info};
use regex::RegexBuilder;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::app_config::ProjectConfig;
use crate::document::{DocumentSource, SectionId, SectionSummary, Stream};
use crate::errors::{ConfigError, LocatorError};

/// Rule for finding a structural section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "by", rename_all = "snake_case")]
pub enum Locator {
    /// First section carrying the tag
    Tag { tag: String },
    /// Section with this durable identifier
    StableId { id: SectionId },
    /// First section whose property equals the value
    Property { name: String, value: String },
    /// First section whose title matches the pattern, ignoring case
    HeadingText { pattern: String },
}

impl Locator {
    pub fn tag(tag: impl Into<String>) -> Self {
        Self::Tag { tag: tag.into() }
    }

    pub fn stable(id: SectionId) -> Self {
        Self::StableId { id }
    }

    pub fn property(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Property {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn heading_text(pattern: impl Into<String>) -> Self {
        Self::HeadingText {
            pattern: pattern.into(),
        }
    }

    pub fn is_stable(&self) -> bool {
        matches!(self, Self::StableId { .. })
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tag { tag } => write!(f, "tag '{}'", tag),
            Self::StableId { id } => write!(f, "id '{}'", id),
            Self::Property { name, value } => write!(f, "property {}='{}'", name, value),
            Self::HeadingText { pattern } => write!(f, "heading matching '{}'", pattern),
        }
    }
}

/// Find the first section matching `locator`, without touching the document
pub fn find<D: DocumentSource>(locator: &Locator, document: &D) -> Result<SectionSummary, LocatorError> {
    let sections = document.sections();
    let found = match locator {
        Locator::Tag { tag } => sections.into_iter().find(|s| s.has_tag(tag)),
        Locator::StableId { id } => sections.into_iter().find(|s| s.id.as_ref() == Some(id)),
        Locator::Property { name, value } => sections
            .into_iter()
            .find(|s| s.property(name) == Some(value.as_str())),
        Locator::HeadingText { pattern } => {
            let regex = RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map_err(|e| LocatorError::InvalidPattern {
                    pattern: pattern.clone(),
                    message: e.to_string(),
                })?;
            sections.into_iter().find(|s| regex.is_match(&s.title))
        }
    };
    found.ok_or_else(|| LocatorError::NotFound(locator.to_string()))
}

/// Resolve `locator` to a durable identifier, creating one if the section has none
pub fn resolve<D: DocumentSource>(locator: &Locator, document: &mut D) -> Result<SectionId, LocatorError> {
    let section = find(locator, document)?;
    ensure_identifier(&section, document)
}

fn ensure_identifier<D: DocumentSource>(section: &SectionSummary, document: &mut D) -> Result<SectionId, LocatorError> {
    if let Some(id) = &section.id {
        return Ok(id.clone());
    }
    let id = SectionId::generate();
    document.assign_section_id(section.begin, &id)?;
    info!("Section '{}' now tracked as {}", section.title, id);
    Ok(id)
}

/// The three resolved roots of a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRoots {
    pub source: SectionId,
    pub translation: SectionId,
    pub glossary: SectionId,
}

impl ProjectRoots {
    pub fn get(&self, stream: Stream) -> &SectionId {
        match stream {
            Stream::Source => &self.source,
            Stream::Translation => &self.translation,
            Stream::Glossary => &self.glossary,
        }
    }
}

/// Resolve all three roots of a project.
///
/// Nothing is written to the document unless every root is found and the
/// three are distinct.
pub fn resolve_roots<D: DocumentSource>(settings: &ProjectConfig, document: &mut D) -> Result<ProjectRoots, ConfigError> {
    let mut found: Vec<(Stream, SectionSummary)> = Vec::with_capacity(3);
    for (stream, locator) in [
        (Stream::Source, &settings.source),
        (Stream::Translation, &settings.translation),
        (Stream::Glossary, &settings.glossary),
    ] {
        let section = find(locator, document).map_err(|source| ConfigError::UnresolvedRoot { stream, source })?;
        if let Some((other, _)) = found.iter().find(|(_, s)| s.begin == section.begin) {
            return Err(ConfigError::SharedRoot {
                first: *other,
                second: stream,
                id: section.id.as_ref().map_or_else(|| section.title.clone(), |id| id.to_string()),
            });
        }
        debug!("{} root located by {} at offset {}", stream, locator, section.begin);
        found.push((stream, section));
    }

    let ids: Vec<SectionId> = found
        .iter()
        .map(|(_, section)| section.id.clone().unwrap_or_else(SectionId::generate))
        .collect();

    // Later headings first, so earlier heading offsets stay valid
    let mut pending: Vec<(&Stream, &SectionSummary, &SectionId)> = found
        .iter()
        .zip(&ids)
        .filter(|((_, section), _)| section.id.is_none())
        .map(|((stream, section), id)| (stream, section, id))
        .collect();
    pending.sort_by(|a, b| b.1.begin.cmp(&a.1.begin));
    for (stream, section, id) in pending {
        document
            .assign_section_id(section.begin, id)
            .map_err(|e| ConfigError::UnresolvedRoot { stream: *stream, source: e.into() })?;
        info!("{} root '{}' now tracked as {}", stream, section.title, id);
    }

    let mut ids = ids.into_iter();
    match (ids.next(), ids.next(), ids.next()) {
        (Some(source), Some(translation), Some(glossary)) => Ok(ProjectRoots {
            source,
            translation,
            glossary,
        }),
        _ => unreachable!("three locators always yield three identifiers"),
    }
}
