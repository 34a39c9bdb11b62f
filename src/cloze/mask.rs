use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use super::difficulty::{Difficulty, MaskRatios};
use super::normalize::is_candidate;

/// Word positions hidden for one presentation of a sentence.
/// Sorted ascending, no duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClozeMask {
    positions: Vec<usize>,
}

impl ClozeMask {
    pub fn from_positions<I: IntoIterator<Item = usize>>(positions: I) -> Self {
        let mut positions: Vec<usize> = positions.into_iter().collect();
        positions.sort_unstable();
        positions.dedup();
        Self { positions }
    }

    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    pub fn contains(&self, position: usize) -> bool {
        self.positions.binary_search(&position).is_ok()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.positions.iter().copied()
    }
}

/// Number of gaps for `candidates` eligible words: the rounded fraction,
/// at least one, never more than there are candidates.
pub fn gap_count(candidates: usize, fraction: f64) -> usize {
    if candidates == 0 {
        return 0;
    }
    let target = (fraction * candidates as f64).round() as usize;
    target.clamp(1, candidates)
}

/// Positions of the words that may be blanked
pub fn candidate_positions<S: AsRef<str>>(words: &[S]) -> Vec<usize> {
    words
        .iter()
        .enumerate()
        .filter(|(_, w)| is_candidate(w.as_ref()))
        .map(|(i, _)| i)
        .collect()
}

/// Choose which words to hide.
///
/// Picks `gap_count` candidates uniformly without replacement. A sentence
/// with no candidate words still gets one gap, at position 0. Only an empty
/// word list yields an empty mask.
pub fn select_masked_positions<S, R>(
    words: &[S],
    difficulty: Difficulty,
    ratios: &MaskRatios,
    rng: &mut R,
) -> ClozeMask
where
    S: AsRef<str>,
    R: Rng + ?Sized,
{
    if words.is_empty() {
        return ClozeMask::default();
    }

    let candidates = candidate_positions(words);
    if candidates.is_empty() {
        debug!(words = words.len(), "no candidate words, masking first word");
        return ClozeMask::from_positions([0]);
    }

    let count = gap_count(candidates.len(), ratios.fraction(difficulty));
    let mask = ClozeMask::from_positions(candidates.choose_multiple(rng, count).copied());
    debug!(
        %difficulty,
        candidates = candidates.len(),
        gaps = mask.len(),
        "selected mask"
    );
    mask
}
