/*!
 * Tests for error types and conversions
 */

use dramaline::errors::{AppError, CatalogError, ClipError};

#[test]
fn test_catalog_error_display_shouldNameTheDrama() {
    let error = CatalogError::InvalidEpisodeRange {
        drama_id: "lurk".to_string(),
        start: 9,
        end: 3,
    };

    assert_eq!(error.to_string(), "Invalid episode range for 'lurk': 9 > 3");
}

#[test]
fn test_app_error_fromCatalogError_shouldWrap() {
    let error: AppError = CatalogError::DuplicateDrama("x".to_string()).into();

    assert!(matches!(error, AppError::Catalog(CatalogError::DuplicateDrama(_))));
    assert_eq!(error.to_string(), "Catalog error: Duplicate drama id: x");
}

#[test]
fn test_app_error_fromIoError_shouldBecomeFileError() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    let error: AppError = io.into();

    assert!(matches!(error, AppError::File(message) if message == "gone"));
}

#[test]
fn test_clip_error_fromIoError_shouldWrap() {
    let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let error: ClipError = io.into();

    assert!(matches!(error, ClipError::Io(_)));
    assert_eq!(ClipError::Timeout(120).to_string(), "Transcoder timed out after 120 seconds");
}

#[test]
fn test_app_error_fromAnyhow_shouldKeepMessage() {
    let error: AppError = anyhow::anyhow!("boom").into();

    assert!(matches!(error, AppError::Unknown(message) if message == "boom"));
}
