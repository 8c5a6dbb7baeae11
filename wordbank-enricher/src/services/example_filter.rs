//! Example sentence quality filter
//!
//! Pure scoring and ranking over candidate example sentences extracted from
//! a lookup payload. Never fails; an empty candidate list yields an empty
//! result.

use wordbank_common::db::{Difficulty, ExampleSentence};

/// Minimum accepted sentence length, in characters
const MIN_LENGTH: usize = 10;
/// Maximum accepted sentence length, in characters
const MAX_LENGTH: usize = 200;
/// Minimum accepted whitespace-separated token count
const MIN_TOKENS: usize = 3;
/// Sentences closest to this length rank first
const OPTIMAL_LENGTH: i64 = 50;

/// A candidate example sentence before quality filtering
#[derive(Debug, Clone)]
pub struct ExampleCandidate {
    pub sentence: String,
    pub part_of_speech: String,
}

/// Filter candidates through the acceptance predicate and rank the
/// survivors by ascending distance from the optimal length.
///
/// The sort is stable: candidates at equal distance keep their input order.
/// Each retained example carries its difficulty tier and character length.
pub fn filter_and_rank(candidates: Vec<ExampleCandidate>, source: &str) -> Vec<ExampleSentence> {
    let mut retained: Vec<ExampleSentence> = candidates
        .into_iter()
        .filter(|candidate| is_acceptable(&candidate.sentence))
        .map(|candidate| {
            let length = candidate.sentence.chars().count();
            ExampleSentence {
                difficulty: classify_difficulty(&candidate.sentence),
                length,
                sentence: candidate.sentence,
                part_of_speech: candidate.part_of_speech,
                source: source.to_string(),
            }
        })
        .collect();

    retained.sort_by_key(|example| (example.length as i64 - OPTIMAL_LENGTH).abs());
    retained
}

/// The acceptance predicate: every condition must hold
pub fn is_acceptable(sentence: &str) -> bool {
    let length = sentence.chars().count();

    length >= MIN_LENGTH
        && length <= MAX_LENGTH
        && !sentence.contains("http")
        && !sentence.contains("www.")
        && !is_numbered_list_artifact(sentence)
        && sentence.split_whitespace().count() >= MIN_TOKENS
}

/// True for sentences beginning with digits followed by a period ("3. ...")
fn is_numbered_list_artifact(sentence: &str) -> bool {
    let rest = sentence.trim_start_matches(|c: char| c.is_ascii_digit());
    rest.len() < sentence.len() && rest.starts_with('.')
}

/// Classify a sentence into a difficulty tier.
///
/// Within each tier the length threshold is evaluated before the word-count
/// threshold; the two conditions are OR'd, not combined.
pub fn classify_difficulty(sentence: &str) -> Difficulty {
    let length = sentence.chars().count();
    let words = sentence.split_whitespace().count();

    if length < 30 || words < 6 {
        Difficulty::Easy
    } else if length < 80 || words < 12 {
        Difficulty::Medium
    } else {
        Difficulty::Hard
    }
}
