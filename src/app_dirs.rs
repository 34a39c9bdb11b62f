use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    fn project() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", "gapfill")
    }

    pub fn config_path() -> Option<PathBuf> {
        Self::project().map(|pd| pd.config_dir().join("config.json"))
    }

    /// Log file location. The terminal belongs to the TUI, so logs go here.
    pub fn log_path() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            let state_dir = PathBuf::from(home)
                .join(".local")
                .join("state")
                .join("gapfill");
            Some(state_dir.join("gapfill.log"))
        } else {
            Self::project().map(|pd| pd.data_local_dir().join("gapfill.log"))
        }
    }
}
