use std::collections::BTreeMap;

use super::mask::ClozeMask;
use super::normalize::normalize;

/// Raw learner input keyed by word position
pub type Answers = BTreeMap<usize, String>;

/// Outcome for one gap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GapResult {
    pub position: usize,
    /// What the learner typed, untouched
    pub given: String,
    /// The word as written in the sentence
    pub expected: String,
    pub correct: bool,
}

/// Scored submission for one sentence. Lives until the learner moves on.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Attempt {
    pub results: Vec<GapResult>,
    pub all_correct: bool,
}

impl Attempt {
    pub fn correct_count(&self) -> usize {
        self.results.iter().filter(|r| r.correct).count()
    }

    pub fn accuracy(&self) -> f64 {
        if self.results.is_empty() {
            return 0.0;
        }
        (self.correct_count() as f64 / self.results.len() as f64 * 100.0).round()
    }
}

/// Compare the learner's answers against the hidden words.
///
/// Every gap is scored whether or not it was answered; a missing answer is
/// an empty string and never matches a real word.
///
/// # Panics
///
/// If the mask holds a position outside `words`.
pub fn score<S: AsRef<str>>(words: &[S], mask: &ClozeMask, answers: &Answers) -> Attempt {
    let results: Vec<GapResult> = mask
        .iter()
        .map(|position| {
            assert!(
                position < words.len(),
                "mask position {position} out of bounds for a sentence of {} words",
                words.len()
            );
            let expected = words[position].as_ref();
            let given = answers.get(&position).map(String::as_str).unwrap_or("");
            GapResult {
                position,
                given: given.to_string(),
                expected: expected.to_string(),
                correct: normalize(given) == normalize(expected),
            }
        })
        .collect();

    let all_correct = results.iter().all(|r| r.correct);
    Attempt {
        results,
        all_correct,
    }
}
