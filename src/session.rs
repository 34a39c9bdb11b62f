use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::cloze::{self, Answers, Attempt, ClozeMask, Difficulty, MaskRatios};
use crate::error::SessionError;
use crate::sentence::Sentence;

/// Where the current sentence is in its view/answer/check cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    AwaitingMask,
    MaskReady,
    Answering,
    Checked,
}

/// Result of moving to another sentence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Advance {
    pub index: usize,
    /// Moved past either end of the pool
    pub wrapped: bool,
}

/// One learner's walk through a sentence pool.
///
/// Mask, answers and the scored attempt belong to the current sentence only
/// and are dropped whenever the learner moves on or asks for a new mask.
#[derive(Debug)]
pub struct Session<R: Rng = StdRng> {
    pool: Vec<Sentence>,
    current_index: usize,
    mask: Option<ClozeMask>,
    answers: Answers,
    attempt: Option<Attempt>,
    phase: Phase,
    difficulty: Difficulty,
    ratios: MaskRatios,
    rng: R,
    rounds_completed: usize,
}

impl Session<StdRng> {
    /// Session with an entropy-seeded random source, or a fixed one when a
    /// seed is given
    pub fn with_seed(
        pool: Vec<Sentence>,
        difficulty: Difficulty,
        ratios: MaskRatios,
        seed: Option<u64>,
    ) -> Result<Self, SessionError> {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::new(pool, difficulty, ratios, rng)
    }
}

impl<R: Rng> Session<R> {
    pub fn new(
        pool: Vec<Sentence>,
        difficulty: Difficulty,
        ratios: MaskRatios,
        rng: R,
    ) -> Result<Self, SessionError> {
        if pool.is_empty() {
            return Err(SessionError::EmptyPool);
        }
        Ok(Self {
            pool,
            current_index: 0,
            mask: None,
            answers: Answers::new(),
            attempt: None,
            phase: Phase::AwaitingMask,
            difficulty,
            ratios,
            rng,
            rounds_completed: 0,
        })
    }

    pub fn current(&self) -> &Sentence {
        &self.pool[self.current_index]
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn words(&self) -> Vec<&str> {
        self.current().words()
    }

    pub fn pool(&self) -> &[Sentence] {
        &self.pool
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn mask(&self) -> Option<&ClozeMask> {
        self.mask.as_ref()
    }

    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    pub fn answer(&self, position: usize) -> &str {
        self.answers.get(&position).map(String::as_str).unwrap_or("")
    }

    pub fn attempt(&self) -> Option<&Attempt> {
        self.attempt.as_ref()
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn rounds_completed(&self) -> usize {
        self.rounds_completed
    }

    /// 1-based position of the current sentence and the pool size
    pub fn progress(&self) -> (usize, usize) {
        (self.current_index + 1, self.pool.len())
    }

    /// Pick the gaps for the current sentence if not already done.
    pub fn prepare(&mut self) -> &ClozeMask {
        if self.phase == Phase::AwaitingMask {
            self.new_mask();
        }
        self.mask.get_or_insert_with(ClozeMask::default)
    }

    fn new_mask(&mut self) {
        let sentence = &self.pool[self.current_index];
        let words = sentence.words();
        let mask = cloze::select_masked_positions(&words, self.difficulty, &self.ratios, &mut self.rng);
        debug!(index = self.current_index, gaps = ?mask.positions(), "mask ready");
        self.mask = Some(mask);
        self.answers.clear();
        self.attempt = None;
        self.phase = Phase::MaskReady;
    }

    /// Record the learner's text for one gap. Editing a checked sentence
    /// reopens it for answering.
    pub fn set_answer(&mut self, position: usize, text: impl Into<String>) -> Result<(), SessionError> {
        let mask = self.mask.as_ref().ok_or(SessionError::MaskNotReady)?;
        if !mask.contains(position) {
            return Err(SessionError::NotAGap { position });
        }
        self.answers.insert(position, text.into());
        self.attempt = None;
        self.phase = Phase::Answering;
        Ok(())
    }

    /// Score the buffered answers and freeze the result.
    pub fn submit(&mut self) -> Result<&Attempt, SessionError> {
        let mask = self.mask.as_ref().ok_or(SessionError::MaskNotReady)?;
        let words = self.pool[self.current_index].words();
        let attempt = cloze::score(&words, mask, &self.answers);
        debug!(
            index = self.current_index,
            correct = attempt.correct_count(),
            gaps = attempt.results.len(),
            "answers checked"
        );
        self.phase = Phase::Checked;
        Ok(&*self.attempt.insert(attempt))
    }

    /// Move to the next sentence, wrapping to the first after the last.
    pub fn advance(&mut self) -> Advance {
        let wrapped = self.current_index + 1 >= self.pool.len();
        let index = if wrapped { 0 } else { self.current_index + 1 };
        if wrapped {
            self.rounds_completed += 1;
        }
        self.go_to(index);
        Advance { index, wrapped }
    }

    /// Move to the previous sentence, wrapping to the last from the first.
    pub fn retreat(&mut self) -> Advance {
        let wrapped = self.current_index == 0;
        let index = if wrapped {
            self.pool.len() - 1
        } else {
            self.current_index - 1
        };
        self.go_to(index);
        Advance { index, wrapped }
    }

    fn go_to(&mut self, index: usize) {
        self.current_index = index;
        self.mask = None;
        self.answers.clear();
        self.attempt = None;
        self.phase = Phase::AwaitingMask;
    }

    /// Fresh gaps for the same sentence
    pub fn regenerate(&mut self) -> &ClozeMask {
        self.new_mask();
        self.mask.get_or_insert_with(ClozeMask::default)
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
        self.regenerate();
    }

    /// Swap in another pool, e.g. after a topic change. An empty pool is
    /// rejected and the current one kept.
    pub fn replace_pool(&mut self, pool: Vec<Sentence>) -> Result<(), SessionError> {
        if pool.is_empty() {
            return Err(SessionError::EmptyPool);
        }
        self.pool = pool;
        self.rounds_completed = 0;
        self.go_to(0);
        Ok(())
    }
}
