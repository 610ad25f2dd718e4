use directories::ProjectDirs;
use std::path::PathBuf;

const APP_NAME: &str = "keyrace";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// Persisted record: settings, character metrics and race history
    pub fn record_path() -> PathBuf {
        ProjectDirs::from("", "", APP_NAME)
            .map(|pd| pd.config_dir().join("record.json"))
            .unwrap_or_else(|| PathBuf::from("keyrace_record.json"))
    }

    /// Log file, kept off the terminal the UI draws on
    pub fn log_path() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            let state_dir = PathBuf::from(home)
                .join(".local")
                .join("state")
                .join(APP_NAME);
            Some(state_dir.join("keyrace.log"))
        } else {
            ProjectDirs::from("", "", APP_NAME)
                .map(|proj_dirs| proj_dirs.data_local_dir().join("keyrace.log"))
        }
    }
}
