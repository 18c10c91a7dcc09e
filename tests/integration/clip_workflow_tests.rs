/*!
 * Clip extraction tests against a temporary clip cache
 */

use anyhow::Result;
use std::fs;

use dramaline::app_controller::Controller;
use dramaline::errors::{CatalogError, ClipError};
use dramaline::media::{ClipExtractor, ClipRequest, ClipWindow, FfmpegClipExtractor};
use crate::common::{self, FixedLookup};

fn request(episode_id: &str, start: f64, end: f64) -> ClipRequest {
    ClipRequest {
        drama_id: "demo".to_string(),
        episode_id: episode_id.to_string(),
        start_seconds: start,
        end_seconds: end,
        context_seconds: 2.0,
    }
}

#[test]
fn test_extract_withCachedClip_shouldSkipTranscoding() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let config = common::test_config(temp_dir.path(), &temp_dir.path().join("videos"), &temp_dir.path().join("clips"));
    let catalog = config.catalog()?;
    let drama = catalog.get("demo").expect("demo drama");

    // No transcoder on the path; a cache miss would fail loudly
    let extractor = FfmpegClipExtractor::new(temp_dir.path().join("clips"), "missing-transcoder", 5);
    let window = ClipWindow { start: 8.0, end: 14.5 };
    let cache_dir = extractor.cache_dir("demo", 2);
    let cached_name = format!("{}abcd1234.mp4", FfmpegClipExtractor::cache_prefix("demo", 2, &window));
    common::create_test_file(&cache_dir, &cached_name, "clip")?;

    let clip = tokio_test::block_on(extractor.extract(drama, &request("demo_E02", 10.0, 12.5)))?;

    assert!(clip.cached);
    assert_eq!(clip.window, window);
    assert_eq!(clip.file_name(), cached_name);
    assert!(cache_dir.ends_with("demo_episode_02"));
    Ok(())
}

#[test]
fn test_extract_withoutVideo_shouldReportVideoNotFound() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let config = common::test_config(temp_dir.path(), &temp_dir.path().join("videos"), &temp_dir.path().join("clips"));
    let catalog = config.catalog()?;
    let drama = catalog.get("demo").expect("demo drama");
    let extractor = FfmpegClipExtractor::new(temp_dir.path().join("clips"), "missing-transcoder", 5);

    let result = tokio_test::block_on(extractor.extract(drama, &request("demo_E01", 1.0, 2.0)));

    assert!(matches!(result, Err(ClipError::VideoNotFound { .. })));
    Ok(())
}

#[test]
fn test_extract_withEpisodeOutsideRange_shouldReportNotInCatalog() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let config = common::test_config(temp_dir.path(), &temp_dir.path().join("videos"), &temp_dir.path().join("clips"));
    let catalog = config.catalog()?;
    let drama = catalog.get("demo").expect("demo drama");
    let extractor = FfmpegClipExtractor::new(temp_dir.path().join("clips"), "missing-transcoder", 5);

    let result = tokio_test::block_on(extractor.extract(drama, &request("demo_E09", 1.0, 2.0)));

    match result {
        Err(ClipError::EpisodeNotInCatalog { drama_id, episode_id }) => {
            assert_eq!(drama_id, "demo");
            assert_eq!(episode_id, "demo_E09");
        }
        other => panic!("unexpected result: {:?}", other),
    }
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_extract_withFailingTranscoder_shouldReportTranscoderError() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let videos = temp_dir.path().join("videos");
    // Only the fallback name exists
    common::create_test_file(&videos, "demo_1.mp4", "not really a video")?;

    let config = common::test_config(temp_dir.path(), &videos, &temp_dir.path().join("clips"));
    let catalog = config.catalog()?;
    let drama = catalog.get("demo").expect("demo drama");
    let extractor = FfmpegClipExtractor::new(temp_dir.path().join("clips"), "false", 5);

    let result = tokio_test::block_on(extractor.extract(drama, &request("demo_E01", 1.0, 2.0)));

    assert!(matches!(result, Err(ClipError::Transcoder(_))));
    let leftovers = fs::read_dir(extractor.cache_dir("demo", 1))?.count();
    assert_eq!(leftovers, 0);
    Ok(())
}

/// Write an executable stand-in transcoder that writes its output path, then runs `tail`
#[cfg(unix)]
fn fake_transcoder(dir: &std::path::Path, tail: &str) -> Result<std::path::PathBuf> {
    use std::os::unix::fs::PermissionsExt;

    let script = format!(
        "#!/bin/sh\nfor last in \"$@\"; do :; done\nprintf partial > \"$last\"\n{}\n",
        tail
    );
    let path = common::create_test_file(dir, "fake-transcoder.sh", &script)?;
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
    Ok(path)
}

#[cfg(unix)]
#[test]
fn test_extract_afterTranscoderFailure_shouldNotServePartialClip() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let videos = temp_dir.path().join("videos");
    common::create_test_file(&videos, "demo_E01.mp4", "not really a video")?;
    let program = fake_transcoder(temp_dir.path(), "echo boom >&2\nexit 1")?;

    let config = common::test_config(temp_dir.path(), &videos, &temp_dir.path().join("clips"));
    let catalog = config.catalog()?;
    let drama = catalog.get("demo").expect("demo drama");
    let extractor = FfmpegClipExtractor::new(temp_dir.path().join("clips"), &program.to_string_lossy(), 5);

    let first = tokio_test::block_on(extractor.extract(drama, &request("demo_E01", 10.0, 12.0)));
    match first {
        Err(ClipError::Transcoder(message)) => assert_eq!(message, "boom"),
        other => panic!("unexpected result: {:?}", other),
    }
    assert_eq!(fs::read_dir(extractor.cache_dir("demo", 1))?.count(), 0);

    let second = tokio_test::block_on(extractor.extract(drama, &request("demo_E01", 10.0, 12.0)));
    assert!(matches!(second, Err(ClipError::Transcoder(_))));
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_extract_withHangingTranscoder_shouldTimeOutAndLeaveNoClip() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let videos = temp_dir.path().join("videos");
    common::create_test_file(&videos, "demo_E01.mp4", "not really a video")?;
    let program = fake_transcoder(temp_dir.path(), "exec sleep 30")?;

    let config = common::test_config(temp_dir.path(), &videos, &temp_dir.path().join("clips"));
    let catalog = config.catalog()?;
    let drama = catalog.get("demo").expect("demo drama");
    let extractor = FfmpegClipExtractor::new(temp_dir.path().join("clips"), &program.to_string_lossy(), 1);

    let result = tokio_test::block_on(extractor.extract(drama, &request("demo_E01", 10.0, 12.0)));

    assert!(matches!(result, Err(ClipError::Timeout(1))));
    assert_eq!(fs::read_dir(extractor.cache_dir("demo", 1))?.count(), 0);
    Ok(())
}

#[test]
fn test_controllerClip_withUnknownDrama_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let config = common::test_config(temp_dir.path(), &temp_dir.path().join("videos"), &temp_dir.path().join("clips"));
    let controller = Controller::with_lookup(config, std::sync::Arc::new(FixedLookup::standard()))?;
    let extractor = controller.clip_extractor();

    let mut unknown = request("demo_E01", 1.0, 2.0);
    unknown.drama_id = "nowhere".to_string();
    let error = tokio_test::block_on(controller.clip(&extractor, &unknown)).unwrap_err();

    assert_eq!(
        error.downcast_ref::<CatalogError>(),
        Some(&CatalogError::UnknownDrama("nowhere".to_string()))
    );
    Ok(())
}
