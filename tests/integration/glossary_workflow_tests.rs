/*!
 * Integration tests for glossary terms through a project session
 */

use anyhow::Result;
use bitext::app_config::ProjectConfig;
use bitext::document::OutlineDocument;
use bitext::DocumentSource;
use bitext::errors::{GlossaryError, ProjectError};
use bitext::session::{Choice, NullSurface, Project};
use bitext::tracker::TrackerState;
use crate::common::{self, ScriptedSurface};

const APPLES: &str = "* Original :source:\n\
I ate an apple today. The apple was red.\n\
* Translated :translation:\n\
Une \n\
\n\
La \n\
* Terms :glossary:\n";

fn offset_after(project: &Project<'_, OutlineDocument>, needle: &str) -> usize {
    project.document().text().find(needle).unwrap() + needle.len()
}

/// Registering "apple" links its occurrence and records the source term
#[test]
fn test_project_registerTerm_shouldLinkOccurrenceAndRecordSourceTerm() -> Result<()> {
    let mut doc = common::document(
        "* Original :source:\nI ate an apple today.\n* Translated :translation:\n* Terms :glossary:\n",
    );
    let mut project = Project::activate(&mut doc, ProjectConfig::default())?;

    let registration = project.register_term("apple")?;

    assert_eq!(registration.replacements, 1);
    let expected = format!("I ate an [[trans:{}][apple]] today.", registration.term_id);
    assert!(project.document().text().contains(&expected));
    let entry = project.glossary().get(&registration.term_id).unwrap();
    assert_eq!(entry.source_terms.as_slice(), ["apple"]);
    Ok(())
}

/// Choosing "pomme" then "fruit" keeps the most recent choice first
#[test]
fn test_project_translateNextTerm_twice_shouldOrderAlternativesByRecency() -> Result<()> {
    let mut doc = common::document(APPLES);
    let mut project = Project::activate(&mut doc, ProjectConfig::default())?;
    project.segment_source(&mut NullSurface)?;
    let registration = project.register_term("apple")?;
    assert_eq!(registration.replacements, 2);

    let mut surface = ScriptedSurface::with_choices(vec![
        Choice::Chosen("pomme".to_string()),
        Choice::Chosen("fruit".to_string()),
    ]);

    let first = offset_after(&project, "Une ");
    project.set_cursor(first, &mut surface)?;
    assert_eq!(project.translate_next_term(&mut surface)?, Some(registration.term_id.clone()));
    assert!(surface.offered[0].candidates.is_empty());

    let second = offset_after(&project, "La ");
    project.set_cursor(second, &mut surface)?;
    project.translate_next_term(&mut surface)?;
    assert_eq!(surface.offered[1].candidates, vec!["pomme".to_string()]);

    let entry = project.glossary().get(&registration.term_id).unwrap();
    assert_eq!(entry.translation_alternatives.as_slice(), ["fruit", "pomme"]);
    let text = project.document().text();
    assert!(text.contains(&format!("❡Une [[trans:{}][pomme]]\n", registration.term_id)));
    assert!(text.contains(&format!("❡La [[trans:{}][fruit]]\n", registration.term_id)));
    Ok(())
}

/// Aborting the choice leaves document and glossary untouched
#[test]
fn test_project_translateNextTerm_aborted_shouldChangeNothing() -> Result<()> {
    let mut doc = common::document(APPLES);
    let mut project = Project::activate(&mut doc, ProjectConfig::default())?;
    project.segment_source(&mut NullSurface)?;
    let registration = project.register_term("apple")?;

    let cursor = offset_after(&project, "Une ");
    project.set_cursor(cursor, &mut NullSurface)?;
    let text = project.document().text().to_string();
    let state = project.tracker_state().clone();

    let mut surface = ScriptedSurface::with_choices(vec![Choice::Aborted]);
    assert_eq!(project.translate_next_term(&mut surface)?, None);

    assert_eq!(project.document().text(), text);
    assert_eq!(project.cursor(), cursor);
    assert_eq!(project.tracker_state(), &state);
    assert!(project
        .glossary()
        .get(&registration.term_id)
        .unwrap()
        .translation_alternatives
        .is_empty());
    Ok(())
}

#[test]
fn test_project_translateNextTerm_segmentDone_shouldReportNoPendingTerm() -> Result<()> {
    let mut doc = common::document(APPLES);
    let mut project = Project::activate(&mut doc, ProjectConfig::default())?;
    project.segment_source(&mut NullSurface)?;
    project.register_term("apple")?;

    let cursor = offset_after(&project, "Une ");
    project.set_cursor(cursor, &mut NullSurface)?;
    project.translate_next_term(&mut NullSurface)?;

    let result = project.translate_next_term(&mut NullSurface);
    assert!(matches!(result, Err(ProjectError::Glossary(GlossaryError::NoPendingTerm))));
    Ok(())
}

/// The table is rebuilt from the document on the next activation
#[test]
fn test_project_reactivate_shouldRebuildGlossaryFromReferences() -> Result<()> {
    common::init_logger();
    let mut doc = common::document(APPLES);
    let term_id = {
        let mut project = Project::activate(&mut doc, ProjectConfig::default())?;
        project.segment_source(&mut NullSurface)?;
        let registration = project.register_term("apple")?;
        let mut surface = ScriptedSurface::with_choices(vec![
            Choice::Chosen("pomme".to_string()),
            Choice::Chosen("fruit".to_string()),
        ]);
        let first = offset_after(&project, "Une ");
        project.set_cursor(first, &mut surface)?;
        project.translate_next_term(&mut surface)?;
        let second = offset_after(&project, "La ");
        project.set_cursor(second, &mut surface)?;
        project.translate_next_term(&mut surface)?;
        project.deactivate();
        registration.term_id
    };

    let project = Project::activate(&mut doc, ProjectConfig::default())?;
    let entry = project.glossary().get(&term_id).unwrap();

    assert_eq!(entry.source_terms.as_slice(), ["apple"]);
    // Rebuilt in document order
    assert_eq!(entry.translation_alternatives.as_slice(), ["pomme", "fruit"]);
    assert_eq!(project.glossary().len(), 1);
    Ok(())
}

#[test]
fn test_project_registerTerm_duplicate_shouldBeRejected() -> Result<()> {
    let mut doc = common::document(APPLES);
    let mut project = Project::activate(&mut doc, ProjectConfig::default())?;
    project.register_term("apple")?;

    let result = project.register_term("apple");
    assert!(matches!(
        result,
        Err(ProjectError::Glossary(GlossaryError::AlreadyRegistered { .. }))
    ));
    Ok(())
}

/// Typing a delimiter moves term lookup on to the next source segment
#[test]
fn test_project_translateNextTerm_afterTypedDelimiter_shouldOfferNextSegmentTerm() -> Result<()> {
    let mut doc = common::document(
        "* Original :source:\nThe cat sleeps. The dog barks.\n* Translated :translation:\n* Terms :glossary:\n",
    );
    let mut project = Project::activate(&mut doc, ProjectConfig::default())?;
    project.segment_source(&mut NullSurface)?;
    let cat = project.register_term("cat")?.term_id;
    let dog = project.register_term("dog")?.term_id;

    let mut surface = ScriptedSurface::with_choices(vec![
        Choice::Chosen("chat".to_string()),
        Choice::Chosen("chien".to_string()),
    ]);
    project.insert_translation("❡Le ", &mut surface)?;
    assert_eq!(project.translate_next_term(&mut surface)?, Some(cat.clone()));

    project.insert_translation(" dort. ❡Le ", &mut surface)?;
    assert_eq!(project.translate_next_term(&mut surface)?, Some(dog.clone()));
    assert_eq!(surface.offered[1].source_text, "dog");

    let translation = project.translation_bounds()?;
    let text = project.document().read_range(translation.contents_begin, translation.end)?;
    assert_eq!(
        text,
        format!("❡Le [[trans:{}][chat]] dort. ❡Le [[trans:{}][chien]]\n", cat, dog)
    );
    assert_eq!(project.highlighted_text(), Some(&*format!("The [[trans:{}][dog]] barks.", dog)));
    Ok(())
}

/// An abort before any resync leaves the tracker untouched
#[test]
fn test_project_translateNextTerm_abortedWithoutPosition_shouldKeepTrackerState() -> Result<()> {
    let mut doc = common::document(APPLES);
    let mut project = Project::activate(&mut doc, ProjectConfig::default())?;
    project.segment_source(&mut NullSurface)?;
    project.register_term("apple")?;
    assert_eq!(project.tracker_state(), &TrackerState::default());

    let mut surface = ScriptedSurface::with_choices(vec![Choice::Aborted]);
    assert_eq!(project.translate_next_term(&mut surface)?, None);

    assert_eq!(surface.offered.len(), 1);
    assert_eq!(surface.offered[0].source_text, "apple");
    assert_eq!(project.tracker_state(), &TrackerState::default());
    assert!(surface.highlights.is_empty());
    Ok(())
}

/// A term containing a sentence end survives segmentation in one piece
#[test]
fn test_project_segmentAfterRegister_shouldKeepReferencesWhole() -> Result<()> {
    let mut doc = common::document(
        "* Original :source:\nI met Dr. Who today. Fine.\n* Translated :translation:\n* Terms :glossary:\n",
    );
    let term_id = {
        let mut project = Project::activate(&mut doc, ProjectConfig::default())?;
        let registration = project.register_term("Dr. Who")?;
        project.segment_source(&mut NullSurface)?;

        let source = project.source_bounds()?;
        let text = project.document().read_range(source.contents_begin, source.end)?;
        assert_eq!(
            text,
            format!("❡I met [[trans:{}][Dr. Who]] today. ❡Fine.\n", registration.term_id)
        );
        project.deactivate();
        registration.term_id
    };

    let project = Project::activate(&mut doc, ProjectConfig::default())?;
    let entry = project.glossary().get(&term_id).unwrap();
    assert_eq!(entry.source_terms.as_slice(), ["Dr. Who"]);
    Ok(())
}
