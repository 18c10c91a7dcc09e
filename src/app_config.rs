use anyhow::{anyhow, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::catalog::{Catalog, Drama};

/// Application configuration module
/// This module handles loading, validating and saving the drama catalog
/// and query settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Dramas available for loading, in display order
    pub dramas: Vec<DramaConfig>,

    /// Drama used when a command names none
    #[serde(default)]
    pub default_drama: Option<String>,

    /// Query defaults
    #[serde(default)]
    pub query: QueryConfig,

    /// Clip extraction settings
    #[serde(default)]
    pub clip: ClipConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Catalog entry as written in the config file
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DramaConfig {
    // @field: Stable identifier, e.g. "zhenhuan"
    pub id: String,

    // @field: Display name
    pub name: String,

    // @field: Directory with one annotation folder per episode
    pub annotation_root: String,

    // @field: Directory with the source videos
    pub video_root: String,

    // @field: Episode range and folder naming
    pub episodes: EpisodeRangeConfig,

    // @field: Video file naming
    pub video_pattern: VideoPatternConfig,
}

/// Inclusive episode range plus the folder name pattern
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct EpisodeRangeConfig {
    pub start: u32,
    pub end: u32,
    pub pattern: String,
}

/// Video file name patterns, tried in order
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct VideoPatternConfig {
    pub primary: String,

    #[serde(default)]
    pub fallback: Option<String>,
}

/// Query defaults, overridable per command
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct QueryConfig {
    // @field: Shortest rhyme candidate, in characters
    #[serde(default = "default_min_length")]
    pub min_length: usize,

    // @field: Longest rhyme candidate, in characters
    #[serde(default = "default_max_length")]
    pub max_length: usize,

    // @field: Maximum rhyme results
    #[serde(default = "default_rhyme_limit")]
    pub rhyme_limit: usize,

    // @field: Lines returned by random sampling
    #[serde(default = "default_random_count")]
    pub random_count: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            min_length: default_min_length(),
            max_length: default_max_length(),
            rhyme_limit: default_rhyme_limit(),
            random_count: default_random_count(),
        }
    }
}

/// Clip extraction settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ClipConfig {
    // @field: Root of the clip cache
    #[serde(default = "default_clip_output_dir")]
    pub output_dir: String,

    // @field: Seconds kept around the requested line
    #[serde(default = "default_context_seconds")]
    pub context_seconds: f64,

    // @field: Transcoder timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    // @field: Transcoder executable
    #[serde(default = "default_transcoder")]
    pub transcoder: String,
}

impl Default for ClipConfig {
    fn default() -> Self {
        Self {
            output_dir: default_clip_output_dir(),
            context_seconds: default_context_seconds(),
            timeout_secs: default_timeout_secs(),
            transcoder: default_transcoder(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_min_length() -> usize {
    3
}

fn default_max_length() -> usize {
    8
}

fn default_rhyme_limit() -> usize {
    20
}

fn default_random_count() -> usize {
    8
}

fn default_clip_output_dir() -> String {
    "./video_clips".to_string()
}

fn default_context_seconds() -> f64 {
    2.0
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_transcoder() -> String {
    "ffmpeg".to_string()
}

impl DramaConfig {
    /// Convert into a typed catalog entry
    pub fn to_drama(&self) -> Result<Drama> {
        let drama = Drama::new(
            &self.id,
            &self.name,
            self.episodes.start,
            self.episodes.end,
            &self.episodes.pattern,
            &self.annotation_root,
            &self.video_root,
            &self.video_pattern.primary,
            self.video_pattern.fallback.as_deref(),
        )
        .with_context(|| format!("Invalid drama entry '{}'", self.id))?;
        Ok(drama)
    }
}

impl Config {
    /// Load the config file, writing a default one first if it is missing
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            let file = File::open(path).with_context(|| format!("Failed to open config file: {:?}", path))?;
            let reader = BufReader::new(file);
            let config: Config =
                serde_json::from_reader(reader).with_context(|| format!("Failed to parse config file: {:?}", path))?;
            return Ok(config);
        }

        warn!("Config file not found at {:?}, creating default config.", path);
        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config).context("Failed to serialize default config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write default config to file: {:?}", path))?;

        Ok(config)
    }

    /// Build the typed catalog, validating every drama entry
    pub fn catalog(&self) -> Result<Catalog> {
        let dramas = self
            .dramas
            .iter()
            .map(DramaConfig::to_drama)
            .collect::<Result<Vec<_>>>()?;

        Ok(Catalog::new(dramas, self.default_drama.as_deref())?)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        self.catalog()?;

        if self.query.min_length > self.query.max_length {
            return Err(anyhow!(
                "Query min_length ({}) is greater than max_length ({})",
                self.query.min_length,
                self.query.max_length
            ));
        }

        if self.clip.context_seconds < 0.0 {
            return Err(anyhow!("Clip context_seconds must not be negative"));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            dramas: vec![
                DramaConfig {
                    id: "zhenhuan".to_string(),
                    name: "甄嬛传".to_string(),
                    annotation_root: "./output".to_string(),
                    video_root: "./videos/甄嬛传".to_string(),
                    episodes: EpisodeRangeConfig {
                        start: 1,
                        end: 76,
                        pattern: "后宫·甄嬛传{episode:02d}".to_string(),
                    },
                    video_pattern: VideoPatternConfig {
                        primary: "{episode}.mp4/{episode}.mp4".to_string(),
                        fallback: Some("甄嬛传_{episode_num:02d}.mp4/甄嬛传_{episode_num:02d}.mp4".to_string()),
                    },
                },
                DramaConfig {
                    id: "lurk".to_string(),
                    name: "潜伏".to_string(),
                    annotation_root: "./output".to_string(),
                    video_root: "./videos/潜伏".to_string(),
                    episodes: EpisodeRangeConfig {
                        start: 1,
                        end: 30,
                        pattern: "潜伏.Lurk.2009.E{episode:02d}.WEB-DL.4K.2160p.H265.AAC-DHTCLUB".to_string(),
                    },
                    video_pattern: VideoPatternConfig {
                        primary: "潜伏.Lurk.2009.E{episode_num:02d}.WEB-DL.4K.2160p.H265.AAC-DHTCLUB.mp4".to_string(),
                        fallback: Some(
                            "潜伏.Lurk.2009.E{episode_num:02d}.WEB-DL.4K.2160p.H265.AAC-DHTCLUB.mp4".to_string(),
                        ),
                    },
                },
            ],
            default_drama: Some("zhenhuan".to_string()),
            query: QueryConfig::default(),
            clip: ClipConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
