use directories::ProjectDirs;
use std::path::PathBuf;

const APP_NAME: &str = "term-type";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// `$XDG_DATA_HOME/term-type`, falling back to `~/.local/share/term-type`
    pub fn data_dir() -> Option<PathBuf> {
        if let Some(dir) = non_empty_env("XDG_DATA_HOME") {
            return Some(PathBuf::from(dir).join(APP_NAME));
        }
        if let Some(home) = non_empty_env("HOME") {
            return Some(PathBuf::from(home).join(".local").join("share").join(APP_NAME));
        }
        ProjectDirs::from("", "", APP_NAME).map(|pd| pd.data_local_dir().to_path_buf())
    }

    /// `$XDG_STATE_HOME/term-type`, falling back to `~/.local/state/term-type`
    pub fn state_dir() -> Option<PathBuf> {
        if let Some(dir) = non_empty_env("XDG_STATE_HOME") {
            return Some(PathBuf::from(dir).join(APP_NAME));
        }
        if let Some(home) = non_empty_env("HOME") {
            return Some(PathBuf::from(home).join(".local").join("state").join(APP_NAME));
        }
        ProjectDirs::from("", "", APP_NAME).map(|pd| pd.data_local_dir().to_path_buf())
    }

    pub fn history_path() -> Option<PathBuf> {
        Self::data_dir().map(|dir| dir.join("history.json"))
    }

    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", APP_NAME).map(|pd| pd.config_dir().join("config.json"))
    }

    pub fn log_dir() -> Option<PathBuf> {
        Self::state_dir()
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_path_file_name() {
        if let Some(path) = AppDirs::history_path() {
            assert!(path.ends_with("term-type/history.json"));
        }
    }

    #[test]
    fn test_config_path_file_name() {
        if let Some(path) = AppDirs::config_path() {
            assert_eq!(path.file_name().unwrap(), "config.json");
        }
    }
}
