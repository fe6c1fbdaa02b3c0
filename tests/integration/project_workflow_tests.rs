/*!
 * Integration tests for a full project session
 */

use anyhow::Result;
use bitext::app_config::{Config, ProjectConfig};
use bitext::document::{DocumentSource, Stream};
use bitext::file_utils::FileManager;
use bitext::locator::Locator;
use bitext::session::{NullSurface, Project};
use bitext::tracker::Resync;
use crate::common::{self, ScriptedSurface};

/// Segment both streams, walk through them and check the highlight follows
#[test]
fn test_project_segmentAndNavigate_shouldFollowTranslator() -> Result<()> {
    let mut doc = common::document(common::BILINGUAL);
    let mut surface = ScriptedSurface::confirming();
    let mut project = Project::activate(&mut doc, ProjectConfig::default())?;

    let inserted = project.segment_source(&mut surface)?;
    assert_eq!(inserted, 4);
    assert_eq!(surface.confirmations, vec![(Stream::Source, 2), (Stream::Translation, 2)]);
    assert_eq!(surface.inserted.len(), 4);

    project.move_segments(1, &mut surface)?;
    assert_eq!(project.highlighted_text(), Some("Hello."));

    let movement = project.move_segments(1, &mut surface)?;
    assert_eq!(project.highlighted_text(), Some("World."));
    assert_eq!(&project.document().text()[movement.cursor..movement.cursor + 6], "Monde.");

    project.move_segments(-1, &mut surface)?;
    assert_eq!(project.highlighted_text(), Some("Hello."));
    assert_eq!(surface.highlights.len(), 3);
    Ok(())
}

#[test]
fn test_project_setCursor_shouldResyncSource() -> Result<()> {
    let mut doc = common::document(common::BILINGUAL);
    let mut project = Project::activate(&mut doc, ProjectConfig::default())?;
    project.segment_source(&mut NullSurface)?;

    let monde = project.document().text().find("Monde").unwrap();
    let resync = project.set_cursor(monde, &mut NullSurface)?;

    let world = project.document().text().find("World").unwrap();
    assert_eq!(resync, Resync::Located(world));
    assert_eq!(project.cursor(), monde);
    Ok(())
}

#[test]
fn test_project_setCursor_outsideTranslation_shouldFail() -> Result<()> {
    let mut doc = common::document(common::BILINGUAL);
    let mut project = Project::activate(&mut doc, ProjectConfig::default())?;
    let cursor = project.cursor();

    let hello = project.document().text().find("Hello").unwrap();
    let error = project.set_cursor(hello, &mut NullSurface).unwrap_err();

    assert!(error.to_string().contains("translation"));
    assert_eq!(project.cursor(), cursor);
    Ok(())
}

/// Hand edits that add translation segments degrade to a mismatch, which
/// re-segmenting the translation repairs
#[test]
fn test_project_divergedStreams_shouldRecoverAfterResegment() -> Result<()> {
    common::init_logger();
    let mut doc = common::document(common::BILINGUAL);
    let mut project = Project::activate(&mut doc, ProjectConfig::default())?;
    project.segment_source(&mut NullSurface)?;

    let end = project.translation_bounds()?.end;
    project.set_cursor(end - 1, &mut NullSurface)?;
    project.insert_translation(" ❡Extra. ❡More.", &mut NullSurface)?;
    let resync = project.resync(&mut NullSurface)?;
    assert_eq!(resync, Resync::Mismatch { ordinal: 4, available: 2 });

    let inserted = project.resegment(Stream::Translation, &mut NullSurface)?;
    assert_eq!(inserted, 4);
    let translation = project.translation_bounds()?;
    let text = project.document().read_range(translation.contents_begin, translation.end)?;
    assert_eq!(text, "❡Bonjour. ❡Monde. ❡Extra. ❡More.\n");
    Ok(())
}

#[test]
fn test_project_progress_shouldGrowWithPosition() -> Result<()> {
    let mut doc = common::document(common::CHAPTERS);
    let mut project = Project::activate(&mut doc, ProjectConfig::default())?;
    assert_eq!(project.progress(), None);

    project.segment_source(&mut NullSurface)?;
    project.insert_translation("Un. Deux. Trois.\n", &mut NullSurface)?;
    project.ensure_translation_segmented(&mut NullSurface)?;
    let start = project.translation_bounds()?.contents_begin;
    project.set_cursor(start, &mut NullSurface)?;
    assert_eq!(project.progress(), Some(0.0));

    let mut previous = -1.0;
    for _ in 0..3 {
        project.move_segments(1, &mut NullSurface)?;
        let progress = project.progress().unwrap();
        assert!(progress > previous);
        assert!((0.0..100.0).contains(&progress));
        previous = progress;
    }
    Ok(())
}

/// Locators resolved once are pinned as stable identifiers for the next activation
#[test]
fn test_project_pinnedRoots_shouldSurviveHeadingRename() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let doc_path = common::create_test_file(temp_dir.path(), "book.org", common::BILINGUAL)?;
    let config_path = temp_dir.path().join("bitext.json");

    let mut config = Config::load_or_create(&config_path)?;
    config.project.source = Locator::heading_text("^original$");
    let mut doc = FileManager::load_document(&doc_path)?;
    let roots = Project::activate(&mut doc, config.project.clone())?.deactivate();
    config.project.pin_roots(&roots);
    config.save(&config_path)?;
    FileManager::save_document(&doc_path, &doc)?;

    let renamed = FileManager::read_to_string(&doc_path)?.replace("* Original :source:", "* Renamed");
    let mut doc = common::document(&renamed);
    let config = Config::load_or_create(&config_path)?;
    let project = Project::activate(&mut doc, config.project)?;

    assert_eq!(project.roots(), &roots);
    Ok(())
}
