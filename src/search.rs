/*!
 * Substring/regex search and length-filtered sampling over the corpus.
 */

use log::debug;
use rand::Rng;
use regex::RegexBuilder;
use serde::Serialize;

use crate::corpus::{Corpus, Scope};
use crate::lexicon::{char_len, strip_trailing_filler};
use crate::subtitle_processor::SubtitleLine;

/// Default length window for sampled prompt lines
pub const SAMPLE_MIN_LENGTH: usize = 3;
pub const SAMPLE_MAX_LENGTH: usize = 8;

/// How a query was actually evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryMode {
    /// Compiled as a regular expression
    Pattern,
    /// Plain substring containment
    Literal,
    /// Regex requested but invalid, so matched as a literal instead
    FallbackLiteral,
}

/// Search hits plus the mode that produced them
#[derive(Debug, Clone)]
pub struct SearchResults<'a> {
    pub mode: QueryMode,
    pub lines: Vec<&'a SubtitleLine>,
}

impl SearchResults<'_> {
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Read-only search view over a corpus snapshot
pub struct SearchIndex<'a> {
    corpus: &'a Corpus,
}

impl<'a> SearchIndex<'a> {
    pub fn new(corpus: &'a Corpus) -> Self {
        Self { corpus }
    }

    /// Find lines whose text matches `text`, ordered by drama, episode and start.
    ///
    /// An invalid pattern never surfaces an error; the query is retried as a
    /// literal with the same case sensitivity.
    pub fn query(&self, text: &str, scope: &Scope, case_sensitive: bool, use_regex: bool) -> SearchResults<'a> {
        let lines = self.corpus.lines_in(scope);

        let (mode, pattern) = if use_regex {
            match RegexBuilder::new(text).case_insensitive(!case_sensitive).build() {
                Ok(pattern) => (QueryMode::Pattern, Some(pattern)),
                Err(e) => {
                    debug!("Invalid search pattern '{}', matching literally: {}", text, e);
                    (QueryMode::FallbackLiteral, Self::literal_pattern(text, case_sensitive))
                }
            }
        } else {
            (QueryMode::Literal, Self::literal_pattern(text, case_sensitive))
        };

        let mut hits: Vec<&SubtitleLine> = match &pattern {
            Some(pattern) => lines.into_iter().filter(|l| pattern.is_match(&l.text)).collect(),
            None => lines.into_iter().filter(|l| l.text.contains(text)).collect(),
        };

        hits.sort_by(|a, b| {
            a.drama_id
                .cmp(&b.drama_id)
                .then_with(|| a.episode_id.cmp(&b.episode_id))
                .then_with(|| a.start_seconds.total_cmp(&b.start_seconds))
        });

        SearchResults { mode, lines: hits }
    }

    /// Lines whose length, after dropping one trailing filler, lies in `[min_len, max_len]`.
    pub fn filter_by_length(&self, scope: &Scope, min_len: usize, max_len: usize) -> Vec<&'a SubtitleLine> {
        self.corpus
            .lines_in(scope)
            .into_iter()
            .filter(|l| {
                let len = char_len(strip_trailing_filler(&l.text));
                (min_len..=max_len).contains(&len)
            })
            .collect()
    }

    /// Uniform sample without replacement from short lines.
    ///
    /// When the population is not larger than `n` it is returned whole,
    /// in corpus order.
    pub fn sample_random<R: Rng + ?Sized>(&self, scope: &Scope, n: usize, rng: &mut R) -> Vec<&'a SubtitleLine> {
        let population = self.filter_by_length(scope, SAMPLE_MIN_LENGTH, SAMPLE_MAX_LENGTH);
        if population.len() <= n {
            return population;
        }

        rand::seq::index::sample(rng, population.len(), n)
            .into_iter()
            .map(|i| population[i])
            .collect()
    }

    // Case-sensitive literals use plain containment
    fn literal_pattern(text: &str, case_sensitive: bool) -> Option<regex::Regex> {
        if case_sensitive {
            return None;
        }
        RegexBuilder::new(&regex::escape(text))
            .case_insensitive(true)
            .build()
            .ok()
    }
}
