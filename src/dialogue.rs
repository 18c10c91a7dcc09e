/*!
 * Rule-based reply suggestions.
 *
 * A source sentence is reduced to a handful of keyword flags; every other
 * line in scope is scored by how well it "answers" those flags (a
 * statement for a question, opposite sentiment, a compliance or refusal for
 * an order). Lines from the caller's own episode are never suggested.
 */

use rand::Rng;
use rand::seq::SliceRandom;
use serde::Serialize;

use crate::corpus::{Corpus, Scope};
use crate::lexicon::{
    char_len, contains_any, COMMAND_WORDS, COMPLIANCE_OR_REFUSAL_WORDS, NEGATIVE_WORDS, POSITIVE_WORDS,
    QUESTION_MARKERS, SURPRISE_WORDS, TRANSITION_WORDS,
};
use crate::subtitle_processor::SubtitleLine;

/// Maximum number of suggestions
pub const RESPONSE_LIMIT: usize = 8;

/// Top-ranked suggestions that keep their position in the presentation shuffle
pub const PINNED_RESPONSES: usize = 3;

/// Length above which a sentence counts as long
const LONG_SENTENCE_CHARS: usize = 12;

/// Keyword flags of a sentence
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FeatureFlags {
    pub is_question: bool,
    pub is_long: bool,
    pub has_positive: bool,
    pub has_negative: bool,
    pub has_transition: bool,
    pub is_command: bool,
    pub is_surprised: bool,
}

impl FeatureFlags {
    pub fn classify(text: &str) -> Self {
        Self {
            is_question: contains_any(text, QUESTION_MARKERS),
            is_long: char_len(text) > LONG_SENTENCE_CHARS,
            has_positive: contains_any(text, POSITIVE_WORDS),
            has_negative: contains_any(text, NEGATIVE_WORDS),
            has_transition: contains_any(text, TRANSITION_WORDS),
            is_command: contains_any(text, COMMAND_WORDS),
            is_surprised: contains_any(text, SURPRISE_WORDS),
        }
    }
}

/// The episode the source sentence was taken from
#[derive(Debug, Clone, Copy)]
pub struct CurrentEpisode<'s> {
    pub drama_id: &'s str,
    pub episode_id: &'s str,
}

/// Score one candidate against a classified source sentence.
///
/// Returns -1.0 for a candidate from the current episode.
pub fn score_candidate(
    candidate_text: &str,
    candidate_drama: &str,
    candidate_episode: &str,
    source: &FeatureFlags,
    current: CurrentEpisode<'_>,
) -> f64 {
    if candidate_drama == current.drama_id && candidate_episode == current.episode_id {
        return -1.0;
    }

    let candidate = FeatureFlags::classify(candidate_text);
    let candidate_len = char_len(candidate_text);
    let mut score = 0.0;

    // question → statement
    if source.is_question && !candidate.is_question {
        score += 1.5;
    }

    if (source.is_long && candidate_len < 10) || (!source.is_long && candidate_len < 15) {
        score += 1.0;
    }

    if (source.has_positive && candidate.has_negative) || (source.has_negative && candidate.has_positive) {
        score += 1.5;
    }

    if source.has_transition != candidate.has_transition {
        score += 0.5;
    }

    if source.is_command && contains_any(candidate_text, COMPLIANCE_OR_REFUSAL_WORDS) {
        score += 1.5;
    }

    if source.is_surprised != candidate.is_surprised {
        score += 1.0;
    }

    score
}

/// Picks reply lines for a sentence
pub struct DialogueResponseRanker<'a> {
    corpus: &'a Corpus,
}

impl<'a> DialogueResponseRanker<'a> {
    pub fn new(corpus: &'a Corpus) -> Self {
        Self { corpus }
    }

    /// Up to eight replies: best scored first, random backfill when too few
    /// lines score, then ranks four and below shuffled for variety.
    pub fn select<R: Rng + ?Sized>(
        &self,
        source_text: &str,
        current: CurrentEpisode<'_>,
        scope: &Scope,
        rng: &mut R,
    ) -> Vec<&'a SubtitleLine> {
        let flags = FeatureFlags::classify(source_text);

        let eligible: Vec<&'a SubtitleLine> = self
            .corpus
            .lines_in(scope)
            .into_iter()
            .filter(|line| !line.is_from(current.drama_id, current.episode_id))
            .collect();

        let mut scored: Vec<(usize, f64)> = eligible
            .iter()
            .enumerate()
            .map(|(i, line)| (i, score_candidate(&line.text, &line.drama_id, &line.episode_id, &flags, current)))
            .filter(|(_, score)| *score > 0.0)
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(RESPONSE_LIMIT);

        let mut chosen: Vec<usize> = scored.into_iter().map(|(i, _)| i).collect();

        if chosen.len() < RESPONSE_LIMIT {
            // Equal lines score equally, so a copy of a chosen line was chosen too
            let pool: Vec<usize> = (0..eligible.len()).filter(|i| !chosen.contains(i)).collect();
            let needed = (RESPONSE_LIMIT - chosen.len()).min(pool.len());
            chosen.extend(rand::seq::index::sample(rng, pool.len(), needed).into_iter().map(|k| pool[k]));
        }

        if chosen.len() > PINNED_RESPONSES {
            chosen[PINNED_RESPONSES..].shuffle(rng);
        }

        chosen.into_iter().map(|i| eligible[i]).collect()
    }
}
