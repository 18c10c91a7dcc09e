/*!
 * Tests for annotation parsing
 */

use dramaline::subtitle_processor::{BracketLine, EpisodeKey, SubtitleCorpusLoader};
use crate::common;

fn key() -> EpisodeKey {
    EpisodeKey::new("zhenhuan", "后宫·甄嬛传01")
}

#[test]
fn test_parse_subtitle_block_withHeaderAndNoise_shouldKeepBracketLinesOnly() {
    let lines = SubtitleCorpusLoader::parse_subtitle_block(&key(), common::SUBTITLE_TEXT);

    let texts: Vec<&str> = lines.iter().map(|l| l.text.as_str()).collect();
    assert_eq!(texts, vec!["皇上驾到", "臣妾做不到啊", "你今天吃饭了吗"]);
}

#[test]
fn test_parse_subtitle_block_shouldDeriveSecondsAndKeepRawTimes() {
    let lines = SubtitleCorpusLoader::parse_subtitle_block(&key(), common::SUBTITLE_TEXT);
    let last = &lines[2];

    assert_eq!(last.start_time, "00:01:00");
    assert_eq!(last.end_time, "00:01:02.5");
    assert_eq!(last.start_seconds, 60.0);
    assert_eq!(last.end_seconds, 62.5);
    assert_eq!(last.drama_id, "zhenhuan");
    assert_eq!(last.episode_id, "后宫·甄嬛传01");
}

#[test]
fn test_parse_subtitle_block_withArtifactPrefix_shouldStripOnlyPrefixWithSpace() {
    let text = "[1 - 2] 第 一句\n[3 - 4] 第一次见面\n[5 - 6] 羊 羊肉\n[7 - 8] 羊羊";
    let lines = SubtitleCorpusLoader::parse_subtitle_block(&key(), text);

    let texts: Vec<&str> = lines.iter().map(|l| l.text.as_str()).collect();
    assert_eq!(texts, vec!["一句", "第一次见面", "羊肉", "羊羊"]);
}

#[test]
fn test_parse_subtitle_block_withoutBracketLines_shouldReturnEmpty() {
    assert!(SubtitleCorpusLoader::parse_subtitle_block(&key(), "").is_empty());
    assert!(SubtitleCorpusLoader::parse_subtitle_block(&key(), "header\n[Script Info]\nnothing").is_empty());
}

#[test]
fn test_parse_subtitle_block_withReversedTimes_shouldNotCorrectThem() {
    let lines = SubtitleCorpusLoader::parse_subtitle_block(&key(), "[00:00:09 - 00:00:03] 倒序");

    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].start_seconds, 9.0);
    assert_eq!(lines[0].end_seconds, 3.0);
}

#[test]
fn test_parse_subtitle_block_withWindowsLineEndings_shouldParse() {
    let lines = SubtitleCorpusLoader::parse_subtitle_block(&key(), "head\r\n[1 - 2] 你好\r\n[3 - 4] 再见\r\n");

    assert_eq!(lines.len(), 2);
    assert_eq!(lines[1].text, "再见");
}

#[test]
fn test_parse_name_block_shouldCleanTimestampsAndFlagValidity() {
    let tags = SubtitleCorpusLoader::parse_name_block(&key(), common::NAMES_TEXT);

    assert_eq!(tags.len(), 3);
    assert_eq!(tags[0].name, "甄嬛");
    assert!(tags[0].valid);

    assert_eq!(tags[1].name, "无效");
    assert_eq!(tags[1].start_time, "");
    assert!(!tags[1].valid);

    assert_eq!(tags[2].end_time, "0:10");
    assert_eq!(tags[2].end_seconds, 10.0);
    assert!(tags[2].valid);
}

#[test]
fn test_load_episode_shouldCombineBothBlocks() {
    let data = SubtitleCorpusLoader::load_episode(&key(), common::SUBTITLE_TEXT, common::NAMES_TEXT);

    assert_eq!(data.subtitles.len(), 3);
    assert_eq!(data.names.len(), 3);
    assert_eq!(data.valid_name_count(), 2);
}

#[test]
fn test_load_episode_withMissingNames_shouldLeaveNamesEmpty() {
    let data = SubtitleCorpusLoader::load_episode(&key(), common::SUBTITLE_TEXT, "");

    assert_eq!(data.subtitles.len(), 3);
    assert!(data.names.is_empty());
}

#[test]
fn test_bracket_line_parse_shouldClassifyLines() {
    assert_eq!(
        BracketLine::parse("  [0:01 - 0:02] 你好  "),
        BracketLine::Parsed { start: "0:01", end: "0:02", payload: "你好" }
    );
    assert_eq!(BracketLine::parse(""), BracketLine::Skipped);
    assert_eq!(BracketLine::parse("plain text"), BracketLine::Skipped);
    assert_eq!(BracketLine::parse("[0:01-0:02] 无空格"), BracketLine::Skipped);
    assert_eq!(BracketLine::parse("[0:01 - 0:02]"), BracketLine::Skipped);
}
