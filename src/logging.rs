use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::app_dirs::AppDirs;

/// `RUST_LOG` wins over the configured filter
fn filter(configured: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(configured))
        .unwrap_or_else(|_| EnvFilter::new(crate::config::DEFAULT_LOG_FILTER))
}

/// Send tracing output to `path`, appending. Returns `None` if the file
/// cannot be opened or a subscriber is already installed; the app runs
/// unlogged in that case.
pub fn init_at(path: &Path, configured_filter: &str) -> Option<PathBuf> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).ok()?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path).ok()?;

    tracing_subscriber::registry()
        .with(filter(configured_filter))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .try_init()
        .ok()?;

    Some(path.to_path_buf())
}

/// Log to the default location under the user's state directory
pub fn init(configured_filter: &str) -> Option<PathBuf> {
    let path = AppDirs::log_path()?;
    init_at(&path, configured_filter)
}
