/*!
 * Typed drama catalog.
 *
 * Episode directories and video files are named from per-drama patterns
 * such as `后宫·甄嬛传{episode:02d}`. Patterns are parsed once, when the
 * catalog is built, so a bad placeholder is reported at startup instead of
 * at query time.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::errors::CatalogError;

// @const: `{name}` or `{name:spec}` placeholder
static PLACEHOLDER_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{([^{}]*)\}").unwrap());

// @const: Supported integer format spec, e.g. `d`, `02d`
static FORMAT_SPEC_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(0?)(\d*)d$").unwrap());

/// Variables a name pattern can refer to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternVar {
    Episode,
    EpisodeNum,
}

/// Value substituted for a pattern variable
#[derive(Debug, Clone, Copy)]
pub enum PatternValue<'a> {
    Number(u32),
    Text(&'a str),
}

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Literal(String),
    Placeholder {
        var: PatternVar,
        zero_pad: bool,
        width: usize,
    },
}

/// Parsed episode or video naming pattern
#[derive(Debug, Clone, PartialEq)]
pub struct NamePattern {
    source: String,
    segments: Vec<Segment>,
}

impl NamePattern {
    /// Parse a pattern, rejecting unknown variables and format specs.
    pub fn parse(pattern: &str) -> Result<Self, CatalogError> {
        let invalid = |reason: String| CatalogError::InvalidPattern {
            pattern: pattern.to_string(),
            reason,
        };

        let mut segments = Vec::new();
        let mut last = 0;

        for caps in PLACEHOLDER_REGEX.captures_iter(pattern) {
            let whole = caps.get(0).ok_or_else(|| invalid("empty match".to_string()))?;
            let literal = &pattern[last..whole.start()];
            if literal.contains('{') || literal.contains('}') {
                return Err(invalid("unbalanced brace".to_string()));
            }
            if !literal.is_empty() {
                segments.push(Segment::Literal(literal.to_string()));
            }
            last = whole.end();

            let body = &caps[1];
            let (name, spec) = match body.split_once(':') {
                Some((name, spec)) => (name, Some(spec)),
                None => (body, None),
            };

            let var = match name {
                "episode" => PatternVar::Episode,
                "episode_num" => PatternVar::EpisodeNum,
                other => return Err(invalid(format!("unknown placeholder '{}'", other))),
            };

            let (zero_pad, width) = match spec {
                None => (false, 0),
                Some(spec) => {
                    let spec_caps = FORMAT_SPEC_REGEX
                        .captures(spec)
                        .ok_or_else(|| invalid(format!("unsupported format spec '{}'", spec)))?;
                    let width = match &spec_caps[2] {
                        "" => 0,
                        digits => digits
                            .parse()
                            .map_err(|_| invalid(format!("bad width '{}'", digits)))?,
                    };
                    (!spec_caps[1].is_empty(), width)
                }
            };

            segments.push(Segment::Placeholder { var, zero_pad, width });
        }

        let rest = &pattern[last..];
        if rest.contains('{') || rest.contains('}') {
            return Err(invalid("unbalanced brace".to_string()));
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }

        Ok(Self {
            source: pattern.to_string(),
            segments,
        })
    }

    /// The pattern as written in the configuration
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Substitute variables. Padding only applies to numeric values.
    pub fn render(&self, episode: PatternValue<'_>, episode_num: PatternValue<'_>) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder { var, zero_pad, width } => {
                    let value = match var {
                        PatternVar::Episode => episode,
                        PatternVar::EpisodeNum => episode_num,
                    };
                    match value {
                        PatternValue::Number(n) if *zero_pad => {
                            out.push_str(&format!("{:0width$}", n, width = *width))
                        }
                        PatternValue::Number(n) => out.push_str(&format!("{:width$}", n, width = *width)),
                        PatternValue::Text(text) => out.push_str(text),
                    }
                }
            }
        }
        out
    }

    /// Render with the same episode number for every variable
    pub fn render_number(&self, number: u32) -> String {
        self.render(PatternValue::Number(number), PatternValue::Number(number))
    }
}

/// Catalog entry for one drama
#[derive(Debug, Clone)]
pub struct Drama {
    pub id: String,
    pub name: String,
    pub episode_start: u32,
    pub episode_end: u32,
    pub episode_pattern: NamePattern,

    /// Directory holding one annotation folder per episode
    pub annotation_root: PathBuf,

    /// Directory holding the source videos
    pub video_root: PathBuf,
    pub video_primary: NamePattern,
    pub video_fallback: Option<NamePattern>,
}

impl Drama {
    /// Validate and build a catalog entry
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: &str,
        name: &str,
        episode_start: u32,
        episode_end: u32,
        episode_pattern: &str,
        annotation_root: impl AsRef<Path>,
        video_root: impl AsRef<Path>,
        video_primary: &str,
        video_fallback: Option<&str>,
    ) -> Result<Self, CatalogError> {
        if episode_start > episode_end {
            return Err(CatalogError::InvalidEpisodeRange {
                drama_id: id.to_string(),
                start: episode_start,
                end: episode_end,
            });
        }

        Ok(Self {
            id: id.to_string(),
            name: name.to_string(),
            episode_start,
            episode_end,
            episode_pattern: NamePattern::parse(episode_pattern)?,
            annotation_root: annotation_root.as_ref().to_path_buf(),
            video_root: video_root.as_ref().to_path_buf(),
            video_primary: NamePattern::parse(video_primary)?,
            video_fallback: video_fallback.map(NamePattern::parse).transpose()?,
        })
    }

    /// Episode identifiers for the whole configured range, in order
    pub fn episode_names(&self) -> Vec<String> {
        (self.episode_start..=self.episode_end)
            .map(|n| self.episode_pattern.render_number(n))
            .collect()
    }

    /// Recover the episode number an identifier was rendered from
    pub fn episode_number(&self, episode_id: &str) -> Option<u32> {
        (self.episode_start..=self.episode_end).find(|&n| self.episode_pattern.render_number(n) == episode_id)
    }

    /// Candidate video paths for an episode: primary first, then fallback
    pub fn video_candidates(&self, episode_id: &str, episode_number: u32) -> Vec<PathBuf> {
        let episode = PatternValue::Text(episode_id);
        let number = PatternValue::Number(episode_number);

        std::iter::once(&self.video_primary)
            .chain(self.video_fallback.as_ref())
            .map(|pattern| self.video_root.join(pattern.render(episode, number)))
            .collect()
    }

    pub fn summary(&self) -> DramaSummary {
        DramaSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            episode_start: self.episode_start,
            episode_end: self.episode_end,
        }
    }
}

/// Public listing of a drama
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DramaSummary {
    pub id: String,
    pub name: String,
    pub episode_start: u32,
    pub episode_end: u32,
}

/// Ordered set of dramas with unique ids
#[derive(Debug, Clone)]
pub struct Catalog {
    dramas: Vec<Drama>,
    default_drama: Option<String>,
}

impl Catalog {
    /// Build a catalog; ids must be unique and the default must exist.
    pub fn new(dramas: Vec<Drama>, default_drama: Option<&str>) -> Result<Self, CatalogError> {
        for (i, drama) in dramas.iter().enumerate() {
            if dramas[..i].iter().any(|d| d.id == drama.id) {
                return Err(CatalogError::DuplicateDrama(drama.id.clone()));
            }
        }

        if let Some(default) = default_drama {
            if !dramas.iter().any(|d| d.id == default) {
                return Err(CatalogError::UnknownDrama(default.to_string()));
            }
        }

        Ok(Self {
            dramas,
            default_drama: default_drama.map(str::to_string),
        })
    }

    pub fn get(&self, id: &str) -> Option<&Drama> {
        self.dramas.iter().find(|d| d.id == id)
    }

    pub fn default_drama(&self) -> Option<&Drama> {
        self.default_drama.as_deref().and_then(|id| self.get(id))
    }

    pub fn dramas(&self) -> &[Drama] {
        &self.dramas
    }

    pub fn summaries(&self) -> Vec<DramaSummary> {
        self.dramas.iter().map(Drama::summary).collect()
    }
}
