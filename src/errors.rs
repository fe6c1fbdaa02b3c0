/*!
 * Error types for the bitext engine.
 *
 * This module contains custom error types for the different parts of the
 * engine, using the thiserror crate for ergonomic error definitions.
 * Every error that concerns one of the text streams names that stream.
 */

use thiserror::Error;

use crate::document::Stream;

/// Errors raised by a document backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// Offset outside the text or not on a character boundary
    #[error("Invalid document offset {offset} (document length {len})")]
    InvalidOffset {
        /// Offending offset
        offset: usize,
        /// Current document length
        len: usize,
    },

    /// No section carries the given identifier
    #[error("No section with identifier '{0}'")]
    MissingSection(String),

    /// The given offset does not start a heading line
    #[error("No heading starts at offset {0}")]
    NotAHeading(usize),
}

/// Errors raised while resolving a section locator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocatorError {
    /// No section matched
    #[error("No section matches {0}")]
    NotFound(String),

    /// The heading text pattern is not a valid regular expression
    #[error("Invalid heading pattern '{pattern}': {message}")]
    InvalidPattern {
        /// The rejected pattern
        pattern: String,
        /// Parser message
        message: String,
    },

    /// Assigning a durable identifier failed
    #[error("Could not assign identifier: {0}")]
    Document(#[from] DocumentError),
}

/// Configuration errors, fatal to project activation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A root section could not be located
    #[error("No heading located for the {stream} root: {source}")]
    UnresolvedRoot {
        /// Which root failed
        stream: Stream,
        /// Underlying locator failure
        source: LocatorError,
    },

    /// Two roots resolved to the same section
    #[error("The {first} and {second} roots resolve to the same section '{id}'")]
    SharedRoot {
        /// First root
        first: Stream,
        /// Second root
        second: Stream,
        /// Shared identifier
        id: String,
    },

    /// The regex segmentation strategy does not compile
    #[error("Invalid segmentation pattern '{pattern}': {message}")]
    InvalidStrategy {
        /// The rejected pattern
        pattern: String,
        /// Parser message
        message: String,
    },

    /// The delimiter would collide with ordinary text
    #[error("Unusable segment delimiter {0:?}: it must not be whitespace, alphanumeric or a markup character")]
    InvalidDelimiter(char),
}

/// Errors raised by the segmentation engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SegmentationError {
    /// The subtree already contains delimiters
    #[error("The {stream} subtree is already segmented ({existing} delimiters); re-segment it instead")]
    AlreadySegmented {
        /// Stream that was targeted
        stream: Stream,
        /// Delimiters already present
        existing: usize,
    },

    /// The subtree vanished from the document
    #[error("Segmentation failed: {0}")]
    Document(#[from] DocumentError),
}

/// Operation precondition failures of the correspondence tracker
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrackerError {
    /// Position outside the stream bounds
    #[error("Position {position} is outside the {stream} stream ({start}..{end})")]
    OutOfBounds {
        /// Stream that was targeted
        stream: Stream,
        /// Offending position
        position: usize,
        /// Content start of the stream
        start: usize,
        /// End of the stream
        end: usize,
    },

    /// Not enough segments in the requested direction
    #[error("No segment {count} steps away in the {stream} stream; re-segment if the streams diverged")]
    NoSuchSegment {
        /// Stream that was targeted
        stream: Stream,
        /// Requested movement
        count: isize,
    },

    /// A root section vanished from the document
    #[error("Tracking failed: {0}")]
    Document(#[from] DocumentError),
}

/// Errors raised by the glossary manager
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GlossaryError {
    /// Blank source term
    #[error("Cannot register an empty term")]
    EmptyTerm,

    /// The term is already in the glossary
    #[error("Term '{term}' is already registered as '{id}'")]
    AlreadyRegistered {
        /// The source text
        term: String,
        /// Existing identifier
        id: String,
    },

    /// No tagged reference left in the current source segment
    #[error("No untranslated term left in the current source segment")]
    NoPendingTerm,

    /// Tracking failure while looking up the current segment
    #[error("Glossary lookup failed: {0}")]
    Tracker(#[from] TrackerError),

    /// Document failure while editing the glossary or source
    #[error("Glossary update failed: {0}")]
    Document(#[from] DocumentError),
}

/// Errors surfaced by a project session
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProjectError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Segmentation error
    #[error("Segmentation error: {0}")]
    Segmentation(#[from] SegmentationError),

    /// Tracker error
    #[error("Tracker error: {0}")]
    Tracker(#[from] TrackerError),

    /// Glossary error
    #[error("Glossary error: {0}")]
    Glossary(#[from] GlossaryError),

    /// Document error
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),
}
