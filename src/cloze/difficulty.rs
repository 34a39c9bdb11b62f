use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::ClozeError;

/// How much of a sentence gets blanked out
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Low,
    #[default]
    Normal,
    High,
}

impl Difficulty {
    /// Cycle Low -> Normal -> High -> Low
    pub fn next(self) -> Self {
        match self {
            Difficulty::Low => Difficulty::Normal,
            Difficulty::Normal => Difficulty::High,
            Difficulty::High => Difficulty::Low,
        }
    }
}

/// Target fraction of eligible words to hide, per difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaskRatios {
    pub low: f64,
    pub normal: f64,
    pub high: f64,
}

impl Default for MaskRatios {
    fn default() -> Self {
        Self {
            low: 0.2,
            normal: 0.3,
            high: 0.6,
        }
    }
}

impl MaskRatios {
    pub fn fraction(&self, difficulty: Difficulty) -> f64 {
        match difficulty {
            Difficulty::Low => self.low,
            Difficulty::Normal => self.normal,
            Difficulty::High => self.high,
        }
    }

    /// Every ratio must lie in (0, 1] and must not shrink as difficulty grows.
    pub fn validate(&self) -> Result<(), ClozeError> {
        for difficulty in [Difficulty::Low, Difficulty::Normal, Difficulty::High] {
            let value = self.fraction(difficulty);
            if !(value > 0.0 && value <= 1.0) {
                return Err(ClozeError::InvalidRatio {
                    difficulty: difficulty.to_string(),
                    value,
                });
            }
        }
        if self.low > self.normal || self.normal > self.high {
            return Err(ClozeError::UnorderedRatios {
                low: self.low,
                normal: self.normal,
                high: self.high,
            });
        }
        Ok(())
    }
}
