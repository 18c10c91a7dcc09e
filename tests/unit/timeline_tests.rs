/*!
 * Tests for per-episode timeline ordering
 */

use dramaline::subtitle_processor::{EpisodeData, EpisodeKey, SubtitleCorpusLoader};
use dramaline::timeline::{EventKind, EventSource, TimelineBuilder};

const SUBTITLES: &str = "[00:00:01 - 00:00:02] 第一句\n[00:00:03 - 00:00:04] 第二句\n";
const NAMES: &str = "[00:00:01 - 00:00:03] 甄嬛\n[# - 00:00:05] 无效\n[00:00:03 - :10] 华妃\n";

fn episode() -> EpisodeData {
    SubtitleCorpusLoader::load_episode(&EpisodeKey::new("zhenhuan", "ep01"), SUBTITLES, NAMES)
}

fn label(source: EventSource<'_>) -> &str {
    match source {
        EventSource::Subtitle(line) => &line.text,
        EventSource::Name(tag) => &tag.name,
    }
}

#[test]
fn test_build_shouldEmitTwoEventsPerLineAndValidName() {
    let data = episode();
    let events = TimelineBuilder::build(&data);

    assert_eq!(events.len(), 2 * data.subtitles.len() + 2 * data.valid_name_count());
    assert_eq!(events.len(), 8);
}

#[test]
fn test_build_shouldSortBySecondsNonDecreasing() {
    let data = episode();
    let events = TimelineBuilder::build(&data);

    assert!(events.windows(2).all(|w| w[0].seconds <= w[1].seconds));
}

#[test]
fn test_build_withEqualSeconds_shouldPutSubtitlesBeforeNames() {
    let data = episode();
    let events = TimelineBuilder::build(&data);

    let order: Vec<(f64, EventKind, &str)> = events.iter().map(|e| (e.seconds, e.kind, label(e.source))).collect();
    assert_eq!(
        order,
        vec![
            (1.0, EventKind::SubtitleStart, "第一句"),
            (1.0, EventKind::NameStart, "甄嬛"),
            (2.0, EventKind::SubtitleEnd, "第一句"),
            (3.0, EventKind::SubtitleStart, "第二句"),
            (3.0, EventKind::NameEnd, "甄嬛"),
            (3.0, EventKind::NameStart, "华妃"),
            (4.0, EventKind::SubtitleEnd, "第二句"),
            (10.0, EventKind::NameEnd, "华妃"),
        ]
    );
}

#[test]
fn test_build_shouldExcludeInvalidNamesButKeepThemInRawList() {
    let data = episode();
    let events = TimelineBuilder::build(&data);

    assert_eq!(data.names.len(), 3);
    assert!(events.iter().all(|e| label(e.source) != "无效"));
}

#[test]
fn test_timestamp_shouldReturnMatchingEndpoint() {
    let data = episode();
    let events = TimelineBuilder::build(&data);

    assert_eq!(events[0].timestamp(), "00:00:01");
    assert_eq!(events[2].timestamp(), "00:00:02");
    assert_eq!(events[7].timestamp(), "0:10");
}

#[test]
fn test_build_withEmptyEpisode_shouldReturnNoEvents() {
    assert!(TimelineBuilder::build(&EpisodeData::default()).is_empty());
}
