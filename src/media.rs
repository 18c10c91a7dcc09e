/*!
 * Video clip extraction for subtitle lines.
 *
 * The corpus only hands out `(drama, episode, start, end)`; this module
 * turns that into a playable file by cutting the source video with an
 * external transcoder. Clips are cached on disk by drama, episode number
 * and whole-second window.
 */

use async_trait::async_trait;
use log::{debug, error, info, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;

use crate::catalog::Drama;
use crate::errors::ClipError;

/// A request for the video behind a subtitle line
#[derive(Debug, Clone, PartialEq)]
pub struct ClipRequest {
    pub drama_id: String,
    pub episode_id: String,
    pub start_seconds: f64,
    pub end_seconds: f64,

    /// Extra seconds kept before and after the line
    pub context_seconds: f64,
}

/// Time range actually cut from the source video
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClipWindow {
    pub start: f64,
    pub end: f64,
}

impl ClipWindow {
    /// Widen the request by its context on both sides, clamping at zero
    pub fn from_request(request: &ClipRequest) -> Self {
        Self {
            start: (request.start_seconds - request.context_seconds).max(0.0),
            end: request.end_seconds + request.context_seconds,
        }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Reference to a playable clip on disk
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClipRef {
    pub path: PathBuf,
    pub window: ClipWindow,

    /// Served from the clip cache without transcoding
    pub cached: bool,
}

impl ClipRef {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Format seconds as `HH:MM:SS.mmm` for transcoder seek arguments
pub fn format_transcoder_time(seconds: f64) -> String {
    let seconds = seconds.max(0.0);
    let hours = (seconds / 3600.0) as u64;
    let minutes = ((seconds % 3600.0) / 60.0) as u64;
    let secs = seconds % 60.0;
    format!("{:02}:{:02}:{:06.3}", hours, minutes, secs)
}

/// Anything that can cut a clip for a request
#[async_trait]
pub trait ClipExtractor: Send + Sync {
    async fn extract(&self, drama: &Drama, request: &ClipRequest) -> Result<ClipRef, ClipError>;
}

/// Clip extractor backed by an `ffmpeg` executable
#[derive(Debug, Clone)]
pub struct FfmpegClipExtractor {
    output_dir: PathBuf,
    program: String,
    timeout_secs: u64,
}

impl FfmpegClipExtractor {
    pub fn new(output_dir: impl AsRef<Path>, program: &str, timeout_secs: u64) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            program: program.to_string(),
            timeout_secs,
        }
    }

    /// Cache directory for one episode of a drama
    pub fn cache_dir(&self, drama_id: &str, episode_number: u32) -> PathBuf {
        self.output_dir.join(format!("{}_episode_{:02}", drama_id, episode_number))
    }

    /// File name prefix shared by every cached clip of one window
    pub fn cache_prefix(drama_id: &str, episode_number: u32, window: &ClipWindow) -> String {
        format!(
            "{}_{:02}_{}_{}_",
            drama_id,
            episode_number,
            window.start as u64,
            window.end as u64
        )
    }

    fn find_cached(dir: &Path, prefix: &str) -> Result<Option<PathBuf>, ClipError> {
        let mut hits: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(prefix) && n.ends_with(".mp4"))
            })
            .collect();
        hits.sort();
        Ok(hits.into_iter().next())
    }

    fn transcoder_args(video: &Path, window: &ClipWindow, output: &Path) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-ss".to_string(),
            format_transcoder_time(window.start),
            "-i".to_string(),
            video.to_string_lossy().into_owned(),
            "-t".to_string(),
            format!("{:.3}", window.duration()),
            "-c:v".to_string(),
            "libx264".to_string(),
            "-c:a".to_string(),
            "aac".to_string(),
            "-preset".to_string(),
            "ultrafast".to_string(),
            "-tune".to_string(),
            "fastdecode".to_string(),
            "-crf".to_string(),
            "30".to_string(),
            "-movflags".to_string(),
            "+faststart".to_string(),
            output.to_string_lossy().into_owned(),
        ]
    }

    // Keep only the last lines of transcoder output; the rest is banner noise
    fn stderr_tail(stderr: &[u8]) -> String {
        let text = String::from_utf8_lossy(stderr);
        let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
        lines[lines.len().saturating_sub(3)..].join(" | ")
    }

    // A failed run must not leave a file the cache lookup would pick up
    async fn discard_partial(output: &Path) {
        match tokio::fs::remove_file(output).await {
            Ok(()) => debug!("Removed partial clip: {:?}", output),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove partial clip {:?}: {}", output, e),
        }
    }
}

#[async_trait]
impl ClipExtractor for FfmpegClipExtractor {
    async fn extract(&self, drama: &Drama, request: &ClipRequest) -> Result<ClipRef, ClipError> {
        let not_in_catalog = || ClipError::EpisodeNotInCatalog {
            drama_id: request.drama_id.clone(),
            episode_id: request.episode_id.clone(),
        };

        if drama.id != request.drama_id {
            return Err(not_in_catalog());
        }
        let episode_number = drama.episode_number(&request.episode_id).ok_or_else(not_in_catalog)?;

        let window = ClipWindow::from_request(request);
        let cache_dir = self.cache_dir(&drama.id, episode_number);
        tokio::fs::create_dir_all(&cache_dir).await?;

        let prefix = Self::cache_prefix(&drama.id, episode_number, &window);
        if let Some(path) = Self::find_cached(&cache_dir, &prefix)? {
            debug!("Using cached clip: {:?}", path);
            return Ok(ClipRef { path, window, cached: true });
        }

        let video = drama
            .video_candidates(&request.episode_id, episode_number)
            .into_iter()
            .find(|p| p.is_file())
            .ok_or_else(|| ClipError::VideoNotFound {
                drama_id: request.drama_id.clone(),
                episode_id: request.episode_id.clone(),
            })?;

        let clip_id = uuid::Uuid::new_v4().simple().to_string();
        let output = cache_dir.join(format!("{}{}.mp4", prefix, &clip_id[..8]));

        debug!("Cutting clip from {:?} into {:?}", video, output);
        let transcode = Command::new(&self.program)
            .args(Self::transcoder_args(&video, &window, &output))
            .kill_on_drop(true)
            .output();

        let result = tokio::select! {
            result = transcode => match result {
                Ok(result) => result,
                Err(e) => {
                    Self::discard_partial(&output).await;
                    return Err(e.into());
                }
            },
            _ = tokio::time::sleep(Duration::from_secs(self.timeout_secs)) => {
                Self::discard_partial(&output).await;
                return Err(ClipError::Timeout(self.timeout_secs));
            }
        };

        if !result.status.success() {
            Self::discard_partial(&output).await;
            let message = Self::stderr_tail(&result.stderr);
            error!("Clip extraction failed: {}", message);
            return Err(ClipError::Transcoder(message));
        }

        info!("Clip ready: {:?}", output);
        Ok(ClipRef { path: output, window, cached: false })
    }
}
