use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::{Curriculum, Level};
use crate::error::CurriculumError;
use crate::sentence::Sentence;

/// Supplies practice sentences. Loading never fails from the caller's point
/// of view: problems are logged and an empty collection comes back.
pub trait SentenceSource {
    fn load(&self) -> Vec<Sentence>;

    /// Human-readable origin, for logs and the status line
    fn describe(&self) -> String;
}

impl<T: SentenceSource + ?Sized> SentenceSource for Box<T> {
    fn load(&self) -> Vec<Sentence> {
        (**self).load()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// The embedded curriculum, optionally narrowed to one level and topic
#[derive(Debug, Clone, Default)]
pub struct BuiltinSource {
    pub level: Option<String>,
    pub topic: Option<String>,
}

impl BuiltinSource {
    pub fn new(level: Option<String>, topic: Option<String>) -> Self {
        Self { level, topic }
    }
}

impl SentenceSource for BuiltinSource {
    fn load(&self) -> Vec<Sentence> {
        match Curriculum::builtin() {
            Ok(curriculum) => curriculum.select(self.level.as_deref(), self.topic.as_deref()),
            Err(e) => {
                warn!("built-in curriculum unavailable: {e}");
                Vec::new()
            }
        }
    }

    fn describe(&self) -> String {
        match (&self.level, &self.topic) {
            (Some(level), Some(topic)) => format!("{level} / {topic}"),
            (Some(level), None) => level.clone(),
            (None, Some(topic)) => format!("all levels / {topic}"),
            (None, None) => "all levels".to_string(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SentenceFile {
    Sentences(Vec<Sentence>),
    Level(Level),
}

/// Sentences from a JSON file holding either a plain array of sentences or a
/// single curriculum level.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn read(&self) -> Result<Vec<Sentence>, CurriculumError> {
        let name = self.path.display().to_string();
        let json = fs::read_to_string(&self.path).map_err(|source| CurriculumError::Io {
            name: name.clone(),
            source,
        })?;
        let parsed: SentenceFile =
            serde_json::from_str(&json).map_err(|source| CurriculumError::Parse { name, source })?;
        Ok(match parsed {
            SentenceFile::Sentences(sentences) => sentences,
            SentenceFile::Level(mut level) => {
                level.stamp_sentences();
                level
                    .topics
                    .into_iter()
                    .flat_map(|t| t.sentences)
                    .collect()
            }
        })
    }
}

impl SentenceSource for JsonFileSource {
    fn load(&self) -> Vec<Sentence> {
        match self.read() {
            Ok(sentences) => {
                let sentences: Vec<Sentence> = sentences
                    .into_iter()
                    .filter(|s| !s.text.trim().is_empty())
                    .collect();
                info!(path = %self.path.display(), count = sentences.len(), "loaded sentence file");
                sentences
            }
            Err(e) => {
                warn!("{e}");
                Vec::new()
            }
        }
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Uses `primary` unless it comes back empty, then `secondary`
#[derive(Debug, Clone)]
pub struct FallbackSource<P, S> {
    primary: P,
    secondary: S,
}

impl<P: SentenceSource, S: SentenceSource> FallbackSource<P, S> {
    pub fn new(primary: P, secondary: S) -> Self {
        Self { primary, secondary }
    }
}

impl<P: SentenceSource, S: SentenceSource> SentenceSource for FallbackSource<P, S> {
    fn load(&self) -> Vec<Sentence> {
        let sentences = self.primary.load();
        if !sentences.is_empty() {
            return sentences;
        }
        warn!(
            "{} yielded no sentences, falling back to {}",
            self.primary.describe(),
            self.secondary.describe()
        );
        self.secondary.load()
    }

    fn describe(&self) -> String {
        format!("{} (fallback: {})", self.primary.describe(), self.secondary.describe())
    }
}
