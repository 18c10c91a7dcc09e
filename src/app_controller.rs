use anyhow::{Context, Result};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{debug, info};
use rand::Rng;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

use crate::app_config::Config;
use crate::catalog::{Catalog, DramaSummary};
use crate::corpus::{Corpus, CorpusBuilder, CorpusHandle, CorpusStats, Scope};
use crate::dialogue::{CurrentEpisode, DialogueResponseRanker};
use crate::errors::CatalogError;
use crate::file_utils::FileManager;
use crate::media::{ClipExtractor, ClipRef, ClipRequest, FfmpegClipExtractor};
use crate::rhyme::{Final, PhoneticLookup, PinyinLookup, RhymeMatcher};
use crate::search::{QueryMode, SearchIndex};
use crate::subtitle_processor::{EpisodeKey, SubtitleCorpusLoader, SubtitleLine};
use crate::timeline::{EventKind, EventSource};

// @module: Application controller for corpus loading and queries

/// Search outcome detached from the corpus snapshot
#[derive(Debug, Clone, Serialize)]
pub struct SearchReport {
    pub mode: QueryMode,
    pub lines: Vec<SubtitleLine>,
}

/// A rhyming line with its score
#[derive(Debug, Clone, Serialize)]
pub struct ScoredLine {
    #[serde(flatten)]
    pub line: SubtitleLine,
    pub score: f64,
}

/// Rhyme outcome; `source_final` is `None` when the text has nothing to rhyme on
#[derive(Debug, Clone, Serialize)]
pub struct RhymeReport {
    pub source_final: Option<Final>,
    pub matches: Vec<ScoredLine>,
}

/// One printable timeline row
#[derive(Debug, Clone, Serialize)]
pub struct TimelineEntry {
    pub seconds: f64,
    pub kind: EventKind,
    pub timestamp: String,
    pub label: String,
}

/// Loaded corpus overview
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub loaded_at: String,
    #[serde(flatten)]
    pub stats: CorpusStats,
}

/// Main application controller for corpus queries
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Typed drama catalog
    catalog: Catalog,

    // @field: Current corpus snapshot
    corpus: CorpusHandle,

    // @field: Phonetic transcription for rhyme queries
    lookup: Arc<dyn PhoneticLookup>,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        Self::with_lookup(config, Arc::new(PinyinLookup))
    }

    /// Create a controller with a custom phonetic lookup
    pub fn with_lookup(config: Config, lookup: Arc<dyn PhoneticLookup>) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;
        let catalog = config.catalog()?;

        Ok(Self {
            config,
            catalog,
            corpus: CorpusHandle::new(Corpus::empty()),
            lookup,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Handle shared with anything that needs to observe reloads
    pub fn corpus_handle(&self) -> CorpusHandle {
        self.corpus.clone()
    }

    pub fn snapshot(&self) -> Arc<Corpus> {
        self.corpus.snapshot()
    }

    /// Read every catalog drama from disk into a new corpus
    pub fn build_corpus(&self, show_progress: bool) -> Result<Corpus> {
        let multi_progress = MultiProgress::new();
        let mut builder = CorpusBuilder::new();

        for drama in self.catalog.dramas() {
            builder.add_drama(&drama.id);
            let episodes = FileManager::existing_episodes(drama)
                .with_context(|| format!("Failed to list episodes for {}", drama.id))?;

            let progress_bar = if show_progress {
                multi_progress.add(ProgressBar::new(episodes.len() as u64))
            } else {
                ProgressBar::hidden()
            };
            let template_result = ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} episodes {msg}")
                .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{bar:40}] {pos}/{len} {msg}"))
                .unwrap_or_else(|_| ProgressStyle::default_bar());
            progress_bar.set_style(template_result.progress_chars("█▓▒░"));
            progress_bar.set_message(drama.name.clone());

            let mut subtitle_count = 0;
            for episode_id in &episodes {
                let paths = FileManager::annotation_paths(drama, episode_id);
                let key = EpisodeKey::new(drama.id.as_str(), episode_id.as_str());
                let data = SubtitleCorpusLoader::load_episode(
                    &key,
                    &FileManager::read_annotation(&paths.subtitles),
                    &FileManager::read_annotation(&paths.names),
                );

                debug!("{}: {} subtitles, {} valid names", episode_id, data.subtitles.len(), data.valid_name_count());
                subtitle_count += data.subtitles.len();
                builder.add_episode(&drama.id, episode_id, data);
                progress_bar.inc(1);
            }

            progress_bar.finish_and_clear();
            info!("Loaded {}: {} episodes, {} subtitles", drama.name, episodes.len(), subtitle_count);
        }

        let corpus = builder.build();
        let stats = corpus.stats();
        info!(
            "Corpus ready: {} dramas, {} episodes, {} subtitles",
            stats.dramas.len(),
            stats.total_episodes,
            stats.total_subtitles
        );
        Ok(corpus)
    }

    /// Build a fresh corpus and make it the current snapshot
    pub fn load_corpus(&self, show_progress: bool) -> Result<CorpusStats> {
        let corpus = self.build_corpus(show_progress)?;
        let stats = corpus.stats();
        self.corpus.replace(corpus);
        Ok(stats)
    }

    /// Reload from disk; queries already running keep their snapshot
    pub fn reload(&self) -> Result<CorpusStats> {
        info!("Reloading corpus");
        self.load_corpus(false)
    }

    pub fn dramas(&self) -> Vec<DramaSummary> {
        self.catalog.summaries()
    }

    pub fn search(&self, query: &str, scope: &Scope, case_sensitive: bool, use_regex: bool) -> SearchReport {
        let corpus = self.snapshot();
        let results = SearchIndex::new(&corpus).query(query, scope, case_sensitive, use_regex);
        SearchReport {
            mode: results.mode,
            lines: results.lines.into_iter().cloned().collect(),
        }
    }

    /// Rhyme ranking; unset bounds fall back to the configured defaults
    pub fn rhyme(
        &self,
        text: &str,
        scope: &Scope,
        min_length: Option<usize>,
        max_length: Option<usize>,
        limit: Option<usize>,
    ) -> RhymeReport {
        let corpus = self.snapshot();
        let matcher = RhymeMatcher::new(&corpus, self.lookup.as_ref());
        let query = &self.config.query;

        let matches = matcher
            .rank(
                text,
                scope,
                min_length.unwrap_or(query.min_length),
                max_length.unwrap_or(query.max_length),
                limit.unwrap_or(query.rhyme_limit),
            )
            .into_iter()
            .map(|m| ScoredLine {
                line: m.line.clone(),
                score: m.score,
            })
            .collect();

        RhymeReport {
            source_final: matcher.last_final(text),
            matches,
        }
    }

    /// Reply suggestions; `current` is the `(drama, episode)` the text came from
    pub fn respond<R: Rng + ?Sized>(
        &self,
        text: &str,
        current: Option<(&str, &str)>,
        scope: &Scope,
        rng: &mut R,
    ) -> Vec<SubtitleLine> {
        let corpus = self.snapshot();
        let (drama_id, episode_id) = current.unwrap_or(("", ""));
        let current = CurrentEpisode { drama_id, episode_id };

        DialogueResponseRanker::new(&corpus)
            .select(text, current, scope, rng)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn random<R: Rng + ?Sized>(&self, scope: &Scope, count: Option<usize>, rng: &mut R) -> Vec<SubtitleLine> {
        let corpus = self.snapshot();
        let count = count.unwrap_or(self.config.query.random_count);
        SearchIndex::new(&corpus)
            .sample_random(scope, count, rng)
            .into_iter()
            .cloned()
            .collect()
    }

    /// `None` when the episode is not loaded
    pub fn timeline(&self, drama_id: &str, episode_id: &str) -> Option<Vec<TimelineEntry>> {
        let corpus = self.snapshot();
        let events = corpus.timeline(drama_id, episode_id)?;

        Some(
            events
                .iter()
                .map(|event| TimelineEntry {
                    seconds: event.seconds,
                    kind: event.kind,
                    timestamp: event.timestamp().to_string(),
                    label: match event.source {
                        EventSource::Subtitle(line) => line.text.clone(),
                        EventSource::Name(tag) => tag.name.clone(),
                    },
                })
                .collect(),
        )
    }

    pub fn status(&self) -> StatusReport {
        let corpus = self.snapshot();
        StatusReport {
            loaded_at: corpus.built_at().format("%Y-%m-%d %H:%M:%S").to_string(),
            stats: corpus.stats(),
        }
    }

    /// Clip extractor configured from the `clip` section
    pub fn clip_extractor(&self) -> FfmpegClipExtractor {
        let clip = &self.config.clip;
        FfmpegClipExtractor::new(PathBuf::from(&clip.output_dir), &clip.transcoder, clip.timeout_secs)
    }

    pub async fn clip(&self, extractor: &dyn ClipExtractor, request: &ClipRequest) -> Result<ClipRef> {
        let drama = self
            .catalog
            .get(&request.drama_id)
            .ok_or_else(|| CatalogError::UnknownDrama(request.drama_id.clone()))?;

        let clip = extractor.extract(drama, request).await?;
        Ok(clip)
    }
}
