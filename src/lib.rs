// Library surface for headless/integration tests and reuse.
// Terminal drawing and argument parsing stay in the binary.
pub mod app_dirs;
pub mod cloze;
pub mod config;
pub mod curriculum;
pub mod error;
pub mod logging;
pub mod quiz;
pub mod runtime;
pub mod sentence;
pub mod session;
pub mod speech;

pub use cloze::{normalize, score, select_masked_positions, Attempt, ClozeMask, Difficulty, MaskRatios};
pub use sentence::Sentence;
pub use session::{Phase, Session};

/// Interval between UI ticks
pub const TICK_RATE_MS: u64 = 100;
