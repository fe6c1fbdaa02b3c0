/*!
 * Document access for the alignment engine.
 *
 * - `source`: the `DocumentSource` trait and the value types it exchanges
 * - `outline`: an in-memory org-style outline implementing it
 */

pub mod outline;
pub mod source;

pub use outline::OutlineDocument;
pub use source::{
    DocumentSource, ElementKind, SectionBounds, SectionId, SectionSummary, Stream,
    StructuralElement, TagReference, TermId, TextEdit,
};
