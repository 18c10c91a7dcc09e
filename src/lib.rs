/*!
 * # dramaline - subtitle line retrieval across TV dramas
 *
 * A Rust library for finding lines in per-episode subtitle annotations of
 * several dramas at once.
 *
 * ## Features
 *
 * - Load `[start - end] text` subtitle and name annotations per episode
 * - Substring or regex search with case control and literal fallback
 * - Rhyme ranking on the Mandarin final of a line's last character
 * - Rule-based reply suggestions for a sentence
 * - Per-episode timelines of subtitle and name events
 * - Cached video clip extraction for a line
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `catalog`: Typed drama catalog and name patterns
 * - `file_utils`: Annotation store on disk
 * - `subtitle_processor`: Annotation parsing
 * - `timecode`: Timestamp cleaning and conversion
 * - `corpus`: Immutable corpus snapshots and the swappable handle
 * - `search`, `rhyme`, `dialogue`: The three retrieval modes
 * - `timeline`: Chronological event streams
 * - `media`: Clip extraction
 * - `app_controller`: Main application controller
 * - `errors`: Custom error types for the application
 */

#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

pub mod app_config;
pub mod app_controller;
pub mod catalog;
pub mod corpus;
pub mod dialogue;
pub mod errors;
pub mod file_utils;
pub mod lexicon;
pub mod media;
pub mod rhyme;
pub mod search;
pub mod subtitle_processor;
pub mod timecode;
pub mod timeline;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::Controller;
pub use catalog::{Catalog, Drama};
pub use corpus::{Corpus, CorpusBuilder, CorpusHandle, Scope};
pub use errors::{AppError, CatalogError, ClipError};
pub use rhyme::{PhoneticLookup, PinyinLookup};
pub use subtitle_processor::{EpisodeData, NameTag, SubtitleLine};
