/*!
 * Tests for segmentation properties over whole subtrees
 */

use bitext::app_config::ProjectConfig;
use bitext::document::{DocumentSource, OutlineDocument, Stream};
use bitext::locator::resolve_roots;
use bitext::segmentation::{Segmenter, SegmentationStrategy};
use crate::common;

fn segmented_source(text: &str, strategy: SegmentationStrategy) -> (OutlineDocument, usize) {
    let mut doc = common::document(text);
    let roots = resolve_roots(&ProjectConfig::default(), &mut doc).unwrap();
    let inserted = Segmenter::new(&strategy, '❡')
        .unwrap()
        .segment(&mut doc, &roots.source, Stream::Source)
        .unwrap();
    (doc, inserted.len())
}

/// Same input and strategy always give the same plan
#[test]
fn test_segmenter_plan_sameInput_shouldBeDeterministic() {
    let mut doc = common::document(common::CHAPTERS);
    let roots = resolve_roots(&ProjectConfig::default(), &mut doc).unwrap();
    let segmenter = Segmenter::new(&SegmentationStrategy::Sentence, '❡').unwrap();

    let first = segmenter.plan(&doc, &roots.source, Stream::Source).unwrap();
    let second = segmenter.plan(&doc, &roots.source, Stream::Source).unwrap();

    assert_eq!(first, second);
    assert!(!first.is_empty());
}

/// One delimiter per sentence, per sub-heading and per non-paragraph block
#[test]
fn test_segmenter_sentenceStrategy_shouldCountSentencesHeadingsAndBlocks() {
    let (doc, inserted) = segmented_source(common::CHAPTERS, SegmentationStrategy::Sentence);

    // 4 sentences + 1 sub-heading + 1 list
    assert_eq!(inserted, 6);
    assert_eq!(doc.text().matches('❡').count(), 6);
    assert!(doc.text().contains("❡The cat sleeps. ❡The dog barks."));
    assert!(doc.text().contains("** ❡Chapter two\n"));
    assert!(doc.text().contains("❡- one item\n- another item\n"));
}

#[test]
fn test_segmenter_paragraphStrategy_shouldKeepParagraphsWhole() {
    let (doc, inserted) = segmented_source(common::CHAPTERS, SegmentationStrategy::Paragraph);

    assert_eq!(inserted, 4);
    assert!(doc.text().contains("❡The cat sleeps. The dog barks.\n"));
}

#[test]
fn test_segmenter_regexStrategy_shouldSplitAfterMatches() {
    let text = "* Original :source:\nfirst; second; third\n* Translated :translation:\n* Terms :glossary:\n";
    let strategy = SegmentationStrategy::Regex {
        pattern: ";".to_string(),
    };
    let (doc, inserted) = segmented_source(text, strategy);

    assert_eq!(inserted, 3);
    assert!(doc.text().contains("❡first; ❡second; ❡third\n"));
}

#[test]
fn test_segmenter_segment_shouldNotTouchOtherStreams() {
    let (doc, _) = segmented_source(common::BILINGUAL, SegmentationStrategy::Sentence);

    assert!(doc.text().contains("❡Hello. ❡World.\n"));
    assert!(doc.text().contains("Bonjour. Monde.\n"));
    assert!(!doc.text().contains("❡Bonjour"));
}

#[test]
fn test_segmenter_countDelimiters_shouldMatchInsertedCount() {
    let (doc, inserted) = segmented_source(common::CHAPTERS, SegmentationStrategy::Sentence);
    let roots = resolve_roots(&ProjectConfig::default(), &mut doc.clone()).unwrap();
    let bounds = doc.find_section(&roots.source).unwrap();

    let segmenter = Segmenter::new(&SegmentationStrategy::Sentence, '❡').unwrap();
    assert_eq!(segmenter.count_delimiters(&doc, &bounds).unwrap(), inserted);
}
