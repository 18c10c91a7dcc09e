/*!
 * Immutable cross-drama subtitle corpus.
 *
 * A `Corpus` is assembled once by a `CorpusBuilder` and only read after
 * that. Refreshing means building a new corpus and swapping it into a
 * `CorpusHandle`; readers keep whatever snapshot they already hold.
 */

use chrono::{DateTime, Local};
use log::debug;
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;

use crate::subtitle_processor::{EpisodeData, SubtitleLine};
use crate::timeline::{TimelineBuilder, TimelineEvent};

/// Which dramas a query looks at
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Scope {
    /// Every loaded drama
    #[default]
    All,
    /// Only the listed dramas, in the listed order
    Dramas(Vec<String>),
}

impl Scope {
    /// An empty list means every drama
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids: Vec<String> = ids.into_iter().map(Into::into).collect();
        if ids.is_empty() {
            Scope::All
        } else {
            Scope::Dramas(ids)
        }
    }
}

/// One parsed episode
#[derive(Debug, Clone)]
pub struct EpisodeEntry {
    pub episode_id: String,
    pub data: EpisodeData,
}

/// All episodes of one drama, in load order
#[derive(Debug, Clone)]
pub struct DramaCorpus {
    pub drama_id: String,
    pub episodes: Vec<EpisodeEntry>,
}

impl DramaCorpus {
    /// Flattened subtitle lines across episodes
    pub fn lines(&self) -> impl Iterator<Item = &SubtitleLine> {
        self.episodes.iter().flat_map(|e| e.data.subtitles.iter())
    }

    pub fn subtitle_count(&self) -> usize {
        self.episodes.iter().map(|e| e.data.subtitles.len()).sum()
    }
}

/// Per-drama counts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DramaStats {
    pub drama_id: String,
    pub episode_count: usize,
    pub subtitle_count: usize,
}

/// Corpus-wide counts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorpusStats {
    pub dramas: Vec<DramaStats>,
    pub total_episodes: usize,
    pub total_subtitles: usize,
}

/// Read-only snapshot of every loaded drama
#[derive(Debug, Clone)]
pub struct Corpus {
    dramas: Vec<DramaCorpus>,
    built_at: DateTime<Local>,
}

impl Corpus {
    pub fn empty() -> Self {
        CorpusBuilder::new().build()
    }

    pub fn drama_ids(&self) -> impl Iterator<Item = &str> {
        self.dramas.iter().map(|d| d.drama_id.as_str())
    }

    pub fn drama(&self, drama_id: &str) -> Option<&DramaCorpus> {
        self.dramas.iter().find(|d| d.drama_id == drama_id)
    }

    pub fn built_at(&self) -> DateTime<Local> {
        self.built_at
    }

    /// Dramas covered by a scope. Unknown ids are ignored.
    pub fn dramas_in(&self, scope: &Scope) -> Vec<&DramaCorpus> {
        match scope {
            Scope::All => self.dramas.iter().collect(),
            Scope::Dramas(ids) => ids
                .iter()
                .filter_map(|id| {
                    let drama = self.drama(id);
                    if drama.is_none() {
                        debug!("Ignoring unknown drama in scope: {}", id);
                    }
                    drama
                })
                .collect(),
        }
    }

    /// Subtitle lines of every drama in scope, in corpus order
    pub fn lines_in(&self, scope: &Scope) -> Vec<&SubtitleLine> {
        self.dramas_in(scope).into_iter().flat_map(|d| d.lines()).collect()
    }

    pub fn episode(&self, drama_id: &str, episode_id: &str) -> Option<&EpisodeData> {
        self.drama(drama_id)?
            .episodes
            .iter()
            .find(|e| e.episode_id == episode_id)
            .map(|e| &e.data)
    }

    /// Chronological events for one episode
    pub fn timeline(&self, drama_id: &str, episode_id: &str) -> Option<Vec<TimelineEvent<'_>>> {
        self.episode(drama_id, episode_id).map(TimelineBuilder::build)
    }

    pub fn stats(&self) -> CorpusStats {
        let dramas: Vec<DramaStats> = self
            .dramas
            .iter()
            .map(|d| DramaStats {
                drama_id: d.drama_id.clone(),
                episode_count: d.episodes.len(),
                subtitle_count: d.subtitle_count(),
            })
            .collect();

        CorpusStats {
            total_episodes: dramas.iter().map(|d| d.episode_count).sum(),
            total_subtitles: dramas.iter().map(|d| d.subtitle_count).sum(),
            dramas,
        }
    }
}

/// Single-threaded accumulator for a new corpus
#[derive(Debug, Default)]
pub struct CorpusBuilder {
    dramas: Vec<DramaCorpus>,
}

impl CorpusBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a drama even if it ends up with no episodes
    pub fn add_drama(&mut self, drama_id: &str) -> &mut Self {
        self.drama_mut(drama_id);
        self
    }

    /// Append an episode; dramas keep first-seen order
    pub fn add_episode(&mut self, drama_id: &str, episode_id: &str, data: EpisodeData) -> &mut Self {
        self.drama_mut(drama_id).episodes.push(EpisodeEntry {
            episode_id: episode_id.to_string(),
            data,
        });
        self
    }

    pub fn build(self) -> Corpus {
        Corpus {
            dramas: self.dramas,
            built_at: Local::now(),
        }
    }

    fn drama_mut(&mut self, drama_id: &str) -> &mut DramaCorpus {
        let index = match self.dramas.iter().position(|d| d.drama_id == drama_id) {
            Some(index) => index,
            None => {
                self.dramas.push(DramaCorpus {
                    drama_id: drama_id.to_string(),
                    episodes: Vec::new(),
                });
                self.dramas.len() - 1
            }
        };
        &mut self.dramas[index]
    }
}

/// Shared slot holding the current corpus snapshot
#[derive(Debug, Clone)]
pub struct CorpusHandle {
    current: Arc<RwLock<Arc<Corpus>>>,
}

impl CorpusHandle {
    pub fn new(corpus: Corpus) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(corpus))),
        }
    }

    /// The current snapshot; stays valid across later swaps
    pub fn snapshot(&self) -> Arc<Corpus> {
        Arc::clone(&self.current.read())
    }

    /// Swap in a fully built corpus, returning the previous one
    pub fn replace(&self, corpus: Corpus) -> Arc<Corpus> {
        let next = Arc::new(corpus);
        std::mem::replace(&mut *self.current.write(), next)
    }
}
