use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::timecode::TimestampNormalizer;

// @module: Annotation text parsing into subtitle lines and name tags

// @const: `[<start> - <end>] <payload>` annotation line
static BRACKET_LINE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\[(.*?) - (.*?)\] (.*)").unwrap()
});

/// Transcription artifacts some corpora prepend to subtitle text
const TEXT_ARTIFACT_PREFIXES: [&str; 2] = ["第 ", "羊 "];

// @struct: Identity of one episode inside one drama
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct EpisodeKey {
    pub drama_id: String,
    pub episode_id: String,
}

impl EpisodeKey {
    pub fn new(drama_id: impl Into<String>, episode_id: impl Into<String>) -> Self {
        Self {
            drama_id: drama_id.into(),
            episode_id: episode_id.into(),
        }
    }
}

// @struct: Single subtitle line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubtitleLine {
    // @field: Drama identifier
    pub drama_id: String,

    // @field: Episode identifier
    pub episode_id: String,

    // @field: Start timestamp as written
    pub start_time: String,

    // @field: End timestamp as written
    pub end_time: String,

    // @field: Start in seconds
    pub start_seconds: f64,

    // @field: End in seconds
    pub end_seconds: f64,

    // @field: Subtitle text, possibly empty
    pub text: String,
}

impl SubtitleLine {
    /// Build a line from raw timestamps; seconds are derived, never corrected.
    pub fn new(key: &EpisodeKey, start_time: &str, end_time: &str, text: &str) -> Self {
        SubtitleLine {
            drama_id: key.drama_id.clone(),
            episode_id: key.episode_id.clone(),
            start_time: start_time.to_string(),
            end_time: end_time.to_string(),
            start_seconds: TimestampNormalizer::to_seconds(start_time),
            end_seconds: TimestampNormalizer::to_seconds(end_time),
            text: text.to_string(),
        }
    }

    /// Whether this line belongs to the given drama and episode
    pub fn is_from(&self, drama_id: &str, episode_id: &str) -> bool {
        self.drama_id == drama_id && self.episode_id == episode_id
    }
}

// @struct: On-screen name annotation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NameTag {
    pub drama_id: String,
    pub episode_id: String,

    /// Cleaned start timestamp
    pub start_time: String,

    /// Cleaned end timestamp
    pub end_time: String,

    pub start_seconds: f64,
    pub end_seconds: f64,

    /// Displayed name
    pub name: String,

    /// Both timestamps passed validation
    pub valid: bool,
}

impl NameTag {
    pub fn new(key: &EpisodeKey, raw_start: &str, raw_end: &str, name: &str) -> Self {
        let start_time = TimestampNormalizer::clean(raw_start);
        let end_time = TimestampNormalizer::clean(raw_end);
        let valid = TimestampNormalizer::is_valid(&start_time) && TimestampNormalizer::is_valid(&end_time);

        NameTag {
            drama_id: key.drama_id.clone(),
            episode_id: key.episode_id.clone(),
            start_seconds: TimestampNormalizer::to_seconds(&start_time),
            end_seconds: TimestampNormalizer::to_seconds(&end_time),
            start_time,
            end_time,
            name: name.to_string(),
            valid,
        }
    }
}

/// Parsed content of one episode's annotation files
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EpisodeData {
    /// Subtitle lines in file order
    pub subtitles: Vec<SubtitleLine>,

    /// Name tags in file order, invalid ones included
    pub names: Vec<NameTag>,
}

impl EpisodeData {
    /// Number of name tags with usable timestamps
    pub fn valid_name_count(&self) -> usize {
        self.names.iter().filter(|n| n.valid).count()
    }
}

/// Outcome of reading one annotation line
#[derive(Debug, Clone, PartialEq)]
pub enum BracketLine<'a> {
    /// `[start - end] payload`
    Parsed {
        start: &'a str,
        end: &'a str,
        payload: &'a str,
    },
    /// Blank, header, or otherwise unusable line
    Skipped,
}

impl<'a> BracketLine<'a> {
    /// Classify a single annotation line
    pub fn parse(line: &'a str) -> Self {
        let line = line.trim();
        if line.is_empty() || !line.starts_with('[') {
            return BracketLine::Skipped;
        }

        match BRACKET_LINE_REGEX.captures(line) {
            Some(caps) => match (caps.get(1), caps.get(2), caps.get(3)) {
                (Some(start), Some(end), Some(payload)) => BracketLine::Parsed {
                    start: start.as_str(),
                    end: end.as_str(),
                    payload: payload.as_str(),
                },
                _ => BracketLine::Skipped,
            },
            None => BracketLine::Skipped,
        }
    }
}

// @struct: Pure parsers over already-read annotation text
pub struct SubtitleCorpusLoader;

impl SubtitleCorpusLoader {
    /// Parse a `subtitle.txt` blob into subtitle lines.
    pub fn parse_subtitle_block(key: &EpisodeKey, text: &str) -> Vec<SubtitleLine> {
        Self::bracket_lines(text)
            .map(|(start, end, payload)| {
                SubtitleLine::new(key, start, end, Self::strip_artifact_prefix(payload))
            })
            .collect()
    }

    /// Parse a `names.txt` blob into name tags, validating both timestamps.
    pub fn parse_name_block(key: &EpisodeKey, text: &str) -> Vec<NameTag> {
        Self::bracket_lines(text)
            .map(|(start, end, name)| NameTag::new(key, start, end, name))
            .collect()
    }

    /// Combine both parses for one episode. No cross-validation is done.
    pub fn load_episode(key: &EpisodeKey, subtitle_text: &str, name_text: &str) -> EpisodeData {
        EpisodeData {
            subtitles: Self::parse_subtitle_block(key, subtitle_text),
            names: Self::parse_name_block(key, name_text),
        }
    }

    // @returns: Bracketed lines after the header, as (start, end, payload)
    fn bracket_lines(text: &str) -> impl Iterator<Item = (&str, &str, &str)> {
        text.lines()
            .skip_while(|line| !Self::is_header_end(line))
            .filter_map(|line| match BracketLine::parse(line) {
                BracketLine::Parsed { start, end, payload } => Some((start, end, payload)),
                BracketLine::Skipped => None,
            })
    }

    // First line that looks like `[... - ...]` ends the header
    fn is_header_end(line: &str) -> bool {
        line.trim().starts_with('[') && line.contains(" - ") && line.contains(']')
    }

    fn strip_artifact_prefix(text: &str) -> &str {
        TEXT_ARTIFACT_PREFIXES
            .iter()
            .find_map(|prefix| text.strip_prefix(prefix))
            .unwrap_or(text)
    }
}
