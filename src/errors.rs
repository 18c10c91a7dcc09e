/*!
 * Error types for the dramaline application.
 *
 * Retrieval over a loaded corpus never fails; these types cover the
 * catalog, clip extraction and the application shell around them,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors raised while building the typed drama catalog
#[derive(Error, Debug, PartialEq)]
pub enum CatalogError {
    /// Episode range where the first episode comes after the last one
    #[error("Invalid episode range for '{drama_id}': {start} > {end}")]
    InvalidEpisodeRange {
        /// Drama identifier
        drama_id: String,
        /// First episode number
        start: u32,
        /// Last episode number
        end: u32,
    },

    /// Name pattern with an unsupported or malformed placeholder
    #[error("Invalid name pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The offending pattern
        pattern: String,
        /// What is wrong with it
        reason: String,
    },

    /// Two catalog entries share one identifier
    #[error("Duplicate drama id: {0}")]
    DuplicateDrama(String),

    /// A referenced drama id is not in the catalog
    #[error("Unknown drama id: {0}")]
    UnknownDrama(String),
}

/// Errors that can occur while cutting a video clip
#[derive(Error, Debug)]
pub enum ClipError {
    /// The episode identifier does not belong to the drama's episode range
    #[error("Episode '{episode_id}' is not part of drama '{drama_id}'")]
    EpisodeNotInCatalog {
        /// Drama identifier
        drama_id: String,
        /// Episode identifier
        episode_id: String,
    },

    /// Neither the primary nor the fallback video path exists
    #[error("Video file not found for {drama_id} episode {episode_id}")]
    VideoNotFound {
        /// Drama identifier
        drama_id: String,
        /// Episode identifier
        episode_id: String,
    },

    /// The transcoder exited with a failure status
    #[error("Transcoder failed: {0}")]
    Transcoder(String),

    /// The transcoder did not finish in time
    #[error("Transcoder timed out after {0} seconds")]
    Timeout(u64),

    /// File system failure around the clip cache
    #[error("Clip I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from the drama catalog
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Error from clip extraction
    #[error("Clip error: {0}")]
    Clip(#[from] ClipError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
