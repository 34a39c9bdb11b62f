//! Cloze engine: pick which words of a sentence to blank, then score the
//! learner's guesses against them.

pub mod difficulty;
pub mod mask;
pub mod normalize;
pub mod scoring;

pub use difficulty::{Difficulty, MaskRatios};
pub use mask::{candidate_positions, gap_count, select_masked_positions, ClozeMask};
pub use normalize::{is_candidate, normalize};
pub use scoring::{score, Answers, Attempt, GapResult};

/// The sentence with every gap replaced by its 1-based word number, e.g.
/// `I have [3] waiting`.
pub fn render_masked<S: AsRef<str>>(words: &[S], mask: &ClozeMask) -> String {
    words
        .iter()
        .enumerate()
        .map(|(i, w)| {
            if mask.contains(i) {
                format!("[{}]", i + 1)
            } else {
                w.as_ref().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
