use serde::{Deserialize, Serialize};

use crate::cloze::normalize;

/// A curated practice sentence. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentence {
    /// English sentence as written, punctuation included
    #[serde(alias = "en", alias = "sentence")]
    pub text: String,
    /// Translation shown to the learner
    #[serde(alias = "zh", alias = "chinese", default)]
    pub translation: String,
    /// Grammar point being drilled
    #[serde(alias = "tags", alias = "tag", default)]
    pub focus: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
    /// Synthesized or sampled audio, owned by whoever attached it
    #[serde(skip)]
    pub audio: Option<Vec<u8>>,
}

impl Sentence {
    pub fn new(text: impl Into<String>, translation: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            translation: translation.into(),
            focus: None,
            level: None,
            audio: None,
        }
    }

    pub fn with_focus(mut self, focus: impl Into<String>) -> Self {
        self.focus = Some(focus.into());
        self
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = Some(level.into());
        self
    }

    /// Whitespace tokenization of the sentence text
    pub fn words(&self) -> Vec<&str> {
        self.text.split_whitespace().collect()
    }

    pub fn word(&self, position: usize) -> Option<Word<'_>> {
        self.text.split_whitespace().nth(position).map(Word::new)
    }
}

/// A single whitespace-delimited token of a sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Word<'a> {
    raw: &'a str,
}

impl<'a> Word<'a> {
    pub fn new(raw: &'a str) -> Self {
        Self { raw }
    }

    pub fn raw(&self) -> &'a str {
        self.raw
    }

    pub fn normalized(&self) -> String {
        normalize(self.raw)
    }
}
