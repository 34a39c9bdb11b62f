use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::app_dirs::AppDirs;
use crate::cloze::{Difficulty, MaskRatios};

pub const DEFAULT_LOG_FILTER: &str = "gapfill=info";

/// External programs used to read sentences aloud
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SpeechConfig {
    /// TTS program and arguments; audio is read from its stdout
    pub synth_command: Vec<String>,
    /// Player program and arguments; audio is written to its stdin
    pub player_command: Vec<String>,
    pub timeout_ms: u64,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            synth_command: Vec::new(),
            player_command: Vec::new(),
            timeout_ms: 5_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub difficulty: Difficulty,
    pub level: Option<String>,
    pub topic: Option<String>,
    pub sentence_file: Option<PathBuf>,
    pub ratios: MaskRatios,
    pub speech: SpeechConfig,
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Normal,
            level: None,
            topic: None,
            sentence_file: None,
            ratios: MaskRatios::default(),
            speech: SpeechConfig::default(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Config {
    /// Replace anything unusable with its default
    fn sanitized(mut self) -> Self {
        if let Err(e) = self.ratios.validate() {
            warn!("ignoring configured mask ratios: {e}");
            self.ratios = MaskRatios::default();
        }
        self
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("gapfill_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(_) => return Config::default(),
        };
        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => cfg.sanitized(),
            Err(e) => {
                warn!(path = %self.path.display(), "ignoring unreadable config: {e}");
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}
