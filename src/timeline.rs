/*!
 * Chronological event stream for one episode.
 *
 * Subtitle and name annotations are merged into start/end events ordered
 * by elapsed seconds. Events borrow the entity they came from.
 */

use serde::Serialize;

use crate::subtitle_processor::{EpisodeData, NameTag, SubtitleLine};

/// What happened at a point of the timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    SubtitleStart,
    SubtitleEnd,
    NameStart,
    NameEnd,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SubtitleStart => "subtitle_start",
            Self::SubtitleEnd => "subtitle_end",
            Self::NameStart => "name_start",
            Self::NameEnd => "name_end",
        }
    }
}

/// Entity an event was emitted for
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EventSource<'a> {
    Subtitle(&'a SubtitleLine),
    Name(&'a NameTag),
}

/// One timeline occurrence
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimelineEvent<'a> {
    pub seconds: f64,
    pub kind: EventKind,
    pub source: EventSource<'a>,
}

impl TimelineEvent<'_> {
    /// The timestamp string the event was derived from
    pub fn timestamp(&self) -> &str {
        match (self.kind, self.source) {
            (EventKind::SubtitleStart, EventSource::Subtitle(s)) => &s.start_time,
            (_, EventSource::Subtitle(s)) => &s.end_time,
            (EventKind::NameStart, EventSource::Name(n)) => &n.start_time,
            (_, EventSource::Name(n)) => &n.end_time,
        }
    }
}

pub struct TimelineBuilder;

impl TimelineBuilder {
    /// Build the sorted event stream for an episode.
    ///
    /// Subtitle events are emitted before name events and the sort is
    /// stable, so events at equal seconds keep that relative order.
    /// Invalid name tags produce no events.
    pub fn build(episode: &EpisodeData) -> Vec<TimelineEvent<'_>> {
        let valid_names = episode.names.iter().filter(|n| n.valid);
        let mut events = Vec::with_capacity(2 * (episode.subtitles.len() + episode.names.len()));

        for line in &episode.subtitles {
            let source = EventSource::Subtitle(line);
            events.push(TimelineEvent { seconds: line.start_seconds, kind: EventKind::SubtitleStart, source });
            events.push(TimelineEvent { seconds: line.end_seconds, kind: EventKind::SubtitleEnd, source });
        }

        for tag in valid_names {
            let source = EventSource::Name(tag);
            events.push(TimelineEvent { seconds: tag.start_seconds, kind: EventKind::NameStart, source });
            events.push(TimelineEvent { seconds: tag.end_seconds, kind: EventKind::NameEnd, source });
        }

        events.sort_by(|a, b| a.seconds.total_cmp(&b.seconds));
        events
    }
}
