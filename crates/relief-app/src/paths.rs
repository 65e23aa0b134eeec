//! Where the app keeps its config and logs.

use std::path::{Path, PathBuf};

const APP_NAME: &str = "relief";

/// Config and log locations for one run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppDirs {
    /// Holds `config.ron`.
    pub config_dir: PathBuf,
    /// Holds `relief.log` when file logging is on.
    pub log_dir: PathBuf,
}

impl AppDirs {
    /// Use `config_override` when given, otherwise the platform config
    /// directory. Falls back to `./.relief` if the OS exposes none.
    pub fn resolve(config_override: Option<&Path>) -> Self {
        let config_dir = match config_override {
            Some(dir) => dir.to_path_buf(),
            None => dirs::config_dir()
                .map(|base| base.join(APP_NAME))
                .unwrap_or_else(|| PathBuf::from(".relief")),
        };
        Self::rooted_at(config_dir)
    }

    fn rooted_at(config_dir: PathBuf) -> Self {
        Self {
            log_dir: config_dir.join("logs"),
            config_dir,
        }
    }
}
