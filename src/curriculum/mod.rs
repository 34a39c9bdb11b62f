pub mod source;

use include_dir::{include_dir, Dir};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::from_str;

use crate::error::CurriculumError;
use crate::sentence::Sentence;

pub use source::{BuiltinSource, FallbackSource, JsonFileSource, SentenceSource};

static CURRICULUM_DIR: Dir = include_dir!("src/curriculum/data");

/// Sentences drilling one grammar point family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    pub name: String,
    pub sentences: Vec<Sentence>,
}

/// An exam or school level, e.g. "CET-4/6"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub name: String,
    #[serde(default)]
    pub title: String,
    pub topics: Vec<Topic>,
}

impl Level {
    pub fn from_json(name: &str, json: &str) -> Result<Self, CurriculumError> {
        let mut level: Level = from_str(json).map_err(|source| CurriculumError::Parse {
            name: name.to_string(),
            source,
        })?;
        level.stamp_sentences();
        Ok(level)
    }

    /// Sentences without an explicit level inherit this one's name
    fn stamp_sentences(&mut self) {
        for sentence in self.topics.iter_mut().flat_map(|t| t.sentences.iter_mut()) {
            if sentence.level.is_none() {
                sentence.level = Some(self.name.clone());
            }
        }
    }

    pub fn matches(&self, query: &str) -> bool {
        self.name.eq_ignore_ascii_case(query) || self.title == query
    }

    pub fn topic_index(&self, name: &str) -> Option<usize> {
        self.topics.iter().position(|t| t.name.eq_ignore_ascii_case(name))
    }

    pub fn display_name(&self) -> String {
        if self.title.is_empty() {
            self.name.clone()
        } else {
            format!("{} ({})", self.title, self.name)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Curriculum {
    pub levels: Vec<Level>,
}

impl Curriculum {
    /// The curated levels compiled into the binary, in file-name order
    pub fn builtin() -> Result<Self, CurriculumError> {
        let levels = CURRICULUM_DIR
            .files()
            .filter(|f| f.path().extension().is_some_and(|ext| ext == "json"))
            .sorted_by(|a, b| a.path().cmp(b.path()))
            .map(|f| {
                let name = f.path().display().to_string();
                let json = f
                    .contents_utf8()
                    .ok_or_else(|| CurriculumError::Encoding { name: name.clone() })?;
                Level::from_json(&name, json)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { levels })
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    pub fn level_index(&self, query: &str) -> Option<usize> {
        self.levels.iter().position(|l| l.matches(query))
    }

    /// Sentences under the given level and topic. `None` matches everything;
    /// an unknown name matches nothing.
    pub fn select(&self, level: Option<&str>, topic: Option<&str>) -> Vec<Sentence> {
        self.levels
            .iter()
            .filter(|l| level.map_or(true, |q| l.matches(q)))
            .flat_map(|l| l.topics.iter())
            .filter(|t| topic.map_or(true, |q| t.name.eq_ignore_ascii_case(q)))
            .flat_map(|t| t.sentences.iter().cloned())
            .collect()
    }
}

/// Cursor over a curriculum for switching level and topic mid-session
#[derive(Debug, Clone)]
pub struct Browser {
    curriculum: Curriculum,
    level: usize,
    /// `None` means every topic of the level
    topic: Option<usize>,
}

impl Browser {
    /// Starts at the given level and topic. An unknown or missing level
    /// starts at the first one; an unknown topic means all topics.
    pub fn new(curriculum: Curriculum, level: Option<&str>, topic: Option<&str>) -> Option<Self> {
        if curriculum.levels.is_empty() {
            return None;
        }
        let level = level.and_then(|q| curriculum.level_index(q)).unwrap_or(0);
        let topic = topic.and_then(|q| curriculum.levels[level].topic_index(q));
        Some(Self {
            curriculum,
            level,
            topic,
        })
    }

    pub fn level(&self) -> &Level {
        &self.curriculum.levels[self.level]
    }

    pub fn topic(&self) -> Option<&Topic> {
        self.topic.map(|i| &self.level().topics[i])
    }

    pub fn sentences(&self) -> Vec<Sentence> {
        match self.topic() {
            Some(topic) => topic.sentences.clone(),
            None => self.curriculum.select(Some(&self.level().name), None),
        }
    }

    /// Move to the next level, all topics
    pub fn next_level(&mut self) -> Vec<Sentence> {
        self.level = (self.level + 1) % self.curriculum.levels.len();
        self.topic = None;
        self.sentences()
    }

    /// Step through the level's topics, then back to all of them
    pub fn next_topic(&mut self) -> Vec<Sentence> {
        let topics = self.level().topics.len();
        self.topic = match self.topic {
            None if topics > 0 => Some(0),
            Some(i) if i + 1 < topics => Some(i + 1),
            _ => None,
        };
        self.sentences()
    }

    pub fn describe(&self) -> String {
        let topic = self.topic().map_or("all topics", |t| t.name.as_str());
        format!("{} / {}", self.level().display_name(), topic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_curriculum_loads_all_levels_in_order() {
        let c = Curriculum::builtin().unwrap();
        let names: Vec<&str> = c.levels().iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Primary/Junior", "CET-4/6", "IELTS/TOEFL"]);
        assert!(c.levels().iter().all(|l| !l.topics.is_empty()));
    }

    #[test]
    fn builtin_sentences_are_complete() {
        let c = Curriculum::builtin().unwrap();
        let all = c.select(None, None);
        assert_eq!(all.len(), 14);
        for s in &all {
            assert!(!s.words().is_empty());
            assert!(!s.translation.is_empty());
            assert!(s.focus.is_some());
            assert!(s.level.is_some());
        }
    }

    #[test]
    fn level_lookup_accepts_name_or_title() {
        let c = Curriculum::builtin().unwrap();
        assert_eq!(c.level_index("cet-4/6"), Some(1));
        assert_eq!(c.level_index("出国留学"), Some(2));
        assert!(c.level_index("GRE").is_none());
    }

    #[test]
    fn select_filters_by_level_and_topic() {
        let c = Curriculum::builtin().unwrap();
        let level_only = c.select(Some("CET-4/6"), None);
        assert_eq!(level_only.len(), 5);
        assert!(level_only
            .iter()
            .all(|s| s.level.as_deref() == Some("CET-4/6")));

        let topic = c.select(Some("CET-4/6"), Some("虚拟语气"));
        assert_eq!(topic.len(), 3);
        assert_eq!(topic[0].text, "If I were you, I would not accept the offer.");

        assert!(c.select(Some("CET-4/6"), Some("被动语态")).is_empty());
        assert!(c.select(Some("nope"), None).is_empty());
    }

    #[test]
    fn topic_lookup() {
        let c = Curriculum::builtin().unwrap();
        assert_eq!(c.levels()[0].topic_index("被动语态"), Some(1));
        assert!(c.levels()[0].topic_index("虚拟语气").is_none());
    }

    #[test]
    fn browser_starts_at_requested_level_and_topic() {
        let b = Browser::new(Curriculum::builtin().unwrap(), Some("大学英语"), Some("虚拟语气")).unwrap();
        assert_eq!(b.level().name, "CET-4/6");
        assert_eq!(b.sentences().len(), 3);
        assert_eq!(b.describe(), "大学英语 (CET-4/6) / 虚拟语气");

        let b = Browser::new(Curriculum::builtin().unwrap(), Some("GRE"), Some("nope")).unwrap();
        assert_eq!(b.level().name, "Primary/Junior");
        assert!(b.topic().is_none());
        assert_eq!(b.sentences().len(), 4);

        assert!(Browser::new(Curriculum::default(), None, None).is_none());
    }

    #[test]
    fn browser_cycles_topics_then_levels() {
        let mut b = Browser::new(Curriculum::builtin().unwrap(), Some("CET-4/6"), None).unwrap();
        assert_eq!(b.sentences().len(), 5);

        assert_eq!(b.next_topic().len(), 3);
        assert_eq!(b.topic().map(|t| t.name.as_str()), Some("虚拟语气"));
        assert_eq!(b.next_topic().len(), 2);
        assert_eq!(b.topic().map(|t| t.name.as_str()), Some("定语从句"));
        assert_eq!(b.next_topic().len(), 5);
        assert!(b.topic().is_none());

        b.next_topic();
        let ielts = b.next_level();
        assert_eq!(b.level().name, "IELTS/TOEFL");
        assert!(b.topic().is_none());
        assert!(ielts.iter().all(|s| s.level.as_deref() == Some("IELTS/TOEFL")));

        b.next_level();
        assert_eq!(b.level().name, "Primary/Junior");
    }

    #[test]
    fn level_from_json_keeps_explicit_sentence_level() {
        let json = r#"{
            "name": "custom",
            "topics": [{"name": "mixed", "sentences": [
                {"en": "One two three.", "zh": "一二三"},
                {"en": "Four five six.", "zh": "四五六", "level": "A2"}
            ]}]
        }"#;
        let level = Level::from_json("custom.json", json).unwrap();
        let s = &level.topics[0].sentences;
        assert_eq!(s[0].level.as_deref(), Some("custom"));
        assert_eq!(s[1].level.as_deref(), Some("A2"));
        assert_eq!(level.display_name(), "custom");
    }

    #[test]
    fn level_from_json_reports_the_file_name() {
        let err = Level::from_json("broken.json", "{").unwrap_err();
        assert!(err.to_string().contains("broken.json"));
    }
}
