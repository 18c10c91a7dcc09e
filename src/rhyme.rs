/*!
 * Rhyme matching on the phonetic final of a line's last character.
 *
 * The final is the tone-stripped vowel/ending part of a character's
 * romanization. Transcription comes from a `PhoneticLookup`; a lookup that
 * fails or returns nothing is treated as "no final" for that character only.
 */

use anyhow::Result;
use log::debug;
use pinyin::ToPinyin;
use serde::Serialize;

use crate::corpus::{Corpus, Scope};
use crate::lexicon::{char_len, nth_last_char, strip_trailing_filler, RHYME_PUNCTUATION};
use crate::subtitle_processor::SubtitleLine;

const BASE_SCORE: f64 = 10.0;
const SECOND_LAST_MATCH_BONUS: f64 = 3.0;
const PUNCTUATION_PENALTY: f64 = 2.0;

/// Initials recognized when splitting a plain romanization, longest first
const INITIALS: &[&str] = &[
    "zh", "ch", "sh", "b", "p", "m", "f", "d", "t", "n", "l", "g", "k", "h", "j", "q", "x", "r", "z", "c", "s",
];

/// Source of per-character phonetic finals
pub trait PhoneticLookup: Send + Sync {
    /// Final of one character, possibly empty. May carry tone digits.
    fn final_of(&self, ch: char) -> Result<String>;
}

/// Mandarin finals derived from the `pinyin` crate's plain romanization.
///
/// A character without a reading (punctuation, Latin letters) is its own
/// final, so lines ending in the same symbol still rhyme.
#[derive(Debug, Clone, Copy, Default)]
pub struct PinyinLookup;

impl PhoneticLookup for PinyinLookup {
    fn final_of(&self, ch: char) -> Result<String> {
        Ok(match ch.to_pinyin() {
            Some(p) => finals_from_plain(p.plain()),
            None => ch.to_string(),
        })
    }
}

/// Split the final off a toneless romanization, in strict form:
/// `y`/`w` spellings are expanded (`you` → `iou`, `wei` → `uei`), `ü` is
/// written `v`, and the buzzed `i` after `zh ch sh r z c s` stays `i`.
pub fn finals_from_plain(plain: &str) -> String {
    let plain = plain.replace('ü', "v");
    if plain.is_empty() || plain.chars().any(|c| !c.is_ascii_lowercase()) {
        return String::new();
    }

    if let Some(rest) = plain.strip_prefix('y') {
        return match rest {
            "i" | "in" | "ing" => rest.to_string(),
            "u" | "ue" | "uan" | "un" => format!("v{}", &rest[1..]),
            "ou" => "iou".to_string(),
            _ => format!("i{}", rest),
        };
    }

    if let Some(rest) = plain.strip_prefix('w') {
        return match rest {
            "u" => "u".to_string(),
            "ei" => "uei".to_string(),
            "en" => "uen".to_string(),
            _ => format!("u{}", rest),
        };
    }

    let (initial, rest) = INITIALS
        .iter()
        .find_map(|initial| plain.strip_prefix(initial).map(|rest| (*initial, rest)))
        .unwrap_or(("", plain.as_str()));

    match (initial, rest) {
        ("j" | "q" | "x", r) if r.starts_with('u') => format!("v{}", &r[1..]),
        (_, "iu") => "iou".to_string(),
        (_, "ui") => "uei".to_string(),
        (_, "un") => "uen".to_string(),
        (_, r) => r.to_string(),
    }
}

/// Tone-stripped final used as a rhyme key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Final(String);

impl Final {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Final {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Result of transcribing one character
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinalLookup {
    Final(Final),
    NoFinal,
}

impl FinalLookup {
    /// Query the collaborator, folding failures and empty answers into `NoFinal`.
    pub fn of<L: PhoneticLookup + ?Sized>(lookup: &L, ch: char) -> Self {
        match lookup.final_of(ch) {
            Ok(raw) => {
                let toneless: String = raw.chars().filter(|c| !c.is_ascii_digit()).collect();
                if toneless.is_empty() {
                    FinalLookup::NoFinal
                } else {
                    FinalLookup::Final(Final(toneless))
                }
            }
            Err(e) => {
                debug!("Phonetic lookup failed for '{}': {}", ch, e);
                FinalLookup::NoFinal
            }
        }
    }

    pub fn into_option(self) -> Option<Final> {
        match self {
            FinalLookup::Final(f) => Some(f),
            FinalLookup::NoFinal => None,
        }
    }
}

/// A rhyming line and its score
#[derive(Debug, Clone, Serialize)]
pub struct RhymeMatch<'a> {
    pub line: &'a SubtitleLine,
    pub score: f64,
}

/// Ranks corpus lines by how well they rhyme with a given text
pub struct RhymeMatcher<'a, L: PhoneticLookup + ?Sized> {
    corpus: &'a Corpus,
    lookup: &'a L,
}

impl<'a, L: PhoneticLookup + ?Sized> RhymeMatcher<'a, L> {
    pub fn new(corpus: &'a Corpus, lookup: &'a L) -> Self {
        Self { corpus, lookup }
    }

    /// Final of the last character once a trailing filler is dropped
    pub fn last_final(&self, text: &str) -> Option<Final> {
        let trimmed = strip_trailing_filler(text);
        let last = nth_last_char(trimmed, 0)?;
        FinalLookup::of(self.lookup, last).into_option()
    }

    /// Lines in scope that share the source's final, best first.
    ///
    /// Ties keep corpus order. Returns nothing if the source has no final.
    pub fn rank(&self, source_text: &str, scope: &Scope, min_len: usize, max_len: usize, limit: usize) -> Vec<RhymeMatch<'a>> {
        let Some(source_final) = self.last_final(source_text) else {
            return Vec::new();
        };

        let mut matches: Vec<RhymeMatch<'a>> = self
            .corpus
            .lines_in(scope)
            .into_iter()
            .filter(|line| (min_len..=max_len).contains(&char_len(strip_trailing_filler(&line.text))))
            .filter(|line| self.last_final(&line.text).as_ref() == Some(&source_final))
            .filter_map(|line| {
                let score = self.calculate_rhyme_score(source_text, &line.text);
                (score > 0.0).then_some(RhymeMatch { line, score })
            })
            .collect();

        matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        matches.truncate(limit);
        matches
    }

    /// Score how well `candidate` rhymes with `source`; may be zero or negative.
    pub fn calculate_rhyme_score(&self, source: &str, candidate: &str) -> f64 {
        let source = strip_trailing_filler(source);
        let candidate = strip_trailing_filler(candidate);
        let source_len = char_len(source);
        let candidate_len = char_len(candidate);

        let mut score = BASE_SCORE;

        score += match candidate_len {
            4..=6 => 2.0,
            3 | 7 | 8 => 1.0,
            _ => 0.0,
        };

        if source_len >= 2 && candidate_len >= 2 && self.second_last_rhymes(source, candidate) {
            score += SECOND_LAST_MATCH_BONUS;
        }

        score += match source_len.abs_diff(candidate_len) {
            0 => 2.0,
            1 => 1.5,
            2 => 1.0,
            _ => 0.0,
        };

        if nth_last_char(candidate, 0).is_some_and(|c| RHYME_PUNCTUATION.contains(&c)) {
            score -= PUNCTUATION_PENALTY;
        }

        score
    }

    fn second_last_rhymes(&self, source: &str, candidate: &str) -> bool {
        let final_at = |text: &str| {
            nth_last_char(text, 1).and_then(|c| FinalLookup::of(self.lookup, c).into_option())
        };

        match (final_at(source), final_at(candidate)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}
