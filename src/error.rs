use std::time::Duration;
use thiserror::Error;

/// Errors raised while validating cloze engine parameters.
#[derive(Debug, Error, PartialEq)]
pub enum ClozeError {
    #[error("mask ratio for {difficulty} must be in (0, 1], got {value}")]
    InvalidRatio { difficulty: String, value: f64 },

    #[error("mask ratios must not decrease with difficulty (low {low}, normal {normal}, high {high})")]
    UnorderedRatios { low: f64, normal: f64, high: f64 },
}

/// Errors raised by session state transitions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("no sentences available; relax the level/topic filters or point at another sentence file")]
    EmptyPool,

    #[error("the current sentence has no mask yet")]
    MaskNotReady,

    #[error("word {position} is not a gap in the current mask")]
    NotAGap { position: usize },
}

#[derive(Debug, Error)]
pub enum CurriculumError {
    #[error("curriculum file {name} is not valid UTF-8")]
    Encoding { name: String },

    #[error("unable to parse {name}: {source}")]
    Parse {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unable to read {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}")]
    Failed { program: String, status: String },

    #[error("{program} produced no audio")]
    Empty { program: String },

    #[error("speech synthesis timed out after {0:?}")]
    Timeout(Duration),
}
