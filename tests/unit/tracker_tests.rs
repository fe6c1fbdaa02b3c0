/*!
 * Tests for the correspondence tracker on segmented documents
 */

use bitext::document::{DocumentSource, OutlineDocument, SectionBounds, SectionId};
use bitext::tracker::{CorrespondenceTracker, Resync};

struct Streams {
    doc: OutlineDocument,
    source: SectionBounds,
    translation: SectionBounds,
}

fn streams(source: &str, translation: &str) -> Streams {
    let doc = OutlineDocument::new(format!(
        "* Source\n:PROPERTIES:\n:ID:       s\n:END:\n{}* Translation\n:PROPERTIES:\n:ID:       t\n:END:\n{}",
        source, translation
    ));
    let source = doc.find_section(&SectionId::new("s")).unwrap();
    let translation = doc.find_section(&SectionId::new("t")).unwrap();
    Streams {
        doc,
        source,
        translation,
    }
}

fn offset_of(doc: &OutlineDocument, needle: &str) -> usize {
    doc.text().find(needle).unwrap()
}

/// Start of translation segment 1 resolves to start of source segment 1
#[test]
fn test_tracker_locateInSource_secondSegment_shouldResolveToSecondSourceSegment() {
    let s = streams("❡Hello. ❡World.\n", "❡Bonjour. ❡Monde.\n");
    let mut tracker = CorrespondenceTracker::new('❡');

    let resync = tracker
        .locate_in_source(&s.doc, &s.source, &s.translation, offset_of(&s.doc, "Monde"))
        .unwrap();

    assert_eq!(resync, Resync::Located(offset_of(&s.doc, "World")));
    assert_eq!(tracker.probable_source_position(), Some(offset_of(&s.doc, "World")));
}

/// Source with 3 delimiters, translation ordinal 5: state kept, no error
#[test]
fn test_tracker_locateInSource_ordinalBeyondSource_shouldKeepPreviousPosition() {
    let s = streams("❡A. ❡B. ❡C.\n", "❡1. ❡2. ❡3. ❡4. ❡5. ❡6.\n");
    let mut tracker = CorrespondenceTracker::new('❡');
    tracker
        .locate_in_source(&s.doc, &s.source, &s.translation, offset_of(&s.doc, "2."))
        .unwrap();
    let before = tracker.state().clone();

    let resync = tracker
        .locate_in_source(&s.doc, &s.source, &s.translation, offset_of(&s.doc, "5."))
        .unwrap();

    assert_eq!(resync, Resync::Mismatch { ordinal: 5, available: 3 });
    assert_eq!(tracker.state(), &before);
    assert_eq!(before.probable_source_position, Some(offset_of(&s.doc, "B.")));
}

/// Forward n then backward n returns to the original segment start
#[test]
fn test_tracker_moveSegments_roundTrip_shouldReturnToSegmentStart() {
    let s = streams("❡One. ❡Two. ❡Three. ❡Four.\n", "❡Un. ❡Deux. ❡Trois. ❡Quatre.\n");
    let mut tracker = CorrespondenceTracker::new('❡');
    let start = offset_of(&s.doc, "Deux");
    tracker
        .locate_in_source(&s.doc, &s.source, &s.translation, start)
        .unwrap();
    let source_start = tracker.probable_source_position();

    let forward = tracker
        .move_segments(&s.doc, &s.source, &s.translation, start, 2)
        .unwrap();
    assert_eq!(forward.cursor, offset_of(&s.doc, "Quatre"));
    assert_eq!(forward.resync, Resync::Located(offset_of(&s.doc, "Four")));

    let back = tracker
        .move_segments(&s.doc, &s.source, &s.translation, forward.cursor, -2)
        .unwrap();
    assert_eq!(back.cursor, start);
    assert_eq!(tracker.probable_source_position(), source_start);
}

#[test]
fn test_tracker_moveSegments_pastLastSegment_shouldFailWithoutStateChange() {
    let s = streams("❡One. ❡Two.\n", "❡Un. ❡Deux.\n");
    let mut tracker = CorrespondenceTracker::new('❡');
    let cursor = offset_of(&s.doc, "Deux");
    tracker
        .locate_in_source(&s.doc, &s.source, &s.translation, cursor)
        .unwrap();
    let before = tracker.state().clone();

    let result = tracker.move_segments(&s.doc, &s.source, &s.translation, cursor, 1);

    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("translation"));
    assert_eq!(tracker.state(), &before);
}

#[test]
fn test_tracker_highlight_shouldCoverCurrentSourceSegment() {
    let s = streams("❡Hello there.  ❡General Kenobi.\n", "❡Bonjour. ❡Général.\n");
    let mut tracker = CorrespondenceTracker::new('❡');

    tracker
        .locate_in_source(&s.doc, &s.source, &s.translation, offset_of(&s.doc, "Bonjour"))
        .unwrap();

    let range = tracker.state().highlight_range.clone().unwrap();
    assert_eq!(&s.doc.text()[range], "Hello there.");
}
