/*!
 * Tests for the annotation store
 */

use anyhow::Result;
use dramaline::catalog::Drama;
use dramaline::file_utils::FileManager;
use std::path::Path;
use crate::common;

fn drama(root: &Path) -> Drama {
    Drama::new("demo", "示例剧", 1, 3, "demo_E{episode:02d}", root, "/videos", "{episode}.mp4", None).unwrap()
}

/// Test that file_exists returns true for existing files
#[test]
fn test_file_exists_withExistingFile_shouldReturnTrue() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let test_file = common::create_test_file(temp_dir.path(), "test_file_exists.tmp", "test content")?;

    assert!(FileManager::file_exists(&test_file));
    assert!(!FileManager::file_exists(temp_dir.path()));
    Ok(())
}

#[test]
fn test_dir_exists_withNonExistentDir_shouldReturnFalse() {
    assert!(!FileManager::dir_exists("./non_existent_directory_12345"));
}

#[test]
fn test_annotation_paths_shouldFollowEpisodeLayout() {
    let paths = FileManager::annotation_paths(&drama(Path::new("/out")), "demo_E01");

    assert_eq!(paths.subtitles, Path::new("/out/demo_E01/subtitles/subtitle.txt"));
    assert_eq!(paths.names, Path::new("/out/demo_E01/subtitles/names.txt"));
}

#[test]
fn test_existing_episodes_shouldKeepRangeOrderAndSkipStrays() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::write_episode(temp_dir.path(), "demo_E03", Some(common::SUBTITLE_TEXT), None)?;
    common::write_episode(temp_dir.path(), "demo_E01", Some(common::SUBTITLE_TEXT), None)?;
    common::write_episode(temp_dir.path(), "demo_E09", Some(common::SUBTITLE_TEXT), None)?;
    common::create_test_file(temp_dir.path(), "demo_E02", "a file, not a folder")?;

    let episodes = FileManager::existing_episodes(&drama(temp_dir.path()))?;

    assert_eq!(episodes, vec!["demo_E01", "demo_E03"]);
    Ok(())
}

#[test]
fn test_existing_episodes_withMissingRoot_shouldReturnEmpty() -> Result<()> {
    common::init_logging();
    let episodes = FileManager::existing_episodes(&drama(Path::new("./no_such_annotation_root")))?;

    assert!(episodes.is_empty());
    Ok(())
}

#[test]
fn test_read_annotation_withMissingFile_shouldReturnEmpty() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;

    assert_eq!(FileManager::read_annotation(temp_dir.path().join("names.txt")), "");
    Ok(())
}

#[test]
fn test_read_annotation_withExistingFile_shouldReturnContent() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "subtitle.txt", common::SUBTITLE_TEXT)?;

    assert_eq!(FileManager::read_annotation(&path), common::SUBTITLE_TEXT);
    Ok(())
}

#[test]
fn test_write_to_file_shouldCreateParentDirectories() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("nested").join("dir").join("out.txt");

    FileManager::write_to_file(&path, "内容")?;

    assert_eq!(FileManager::read_to_string(&path)?, "内容");
    Ok(())
}
