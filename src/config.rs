use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

use crate::app_dirs::AppDirs;
use crate::countdown::DEFAULT_COUNTDOWN_INTERVAL_MS;
use crate::sampler::DEFAULT_SAMPLE_INTERVAL_MS;
use crate::session::{Mode, MAX_TIMED_SECS, MAX_WORD_COUNT};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub number_of_words: usize,
    pub number_of_secs: Option<u64>,
    pub sample_interval_ms: u64,
    pub countdown_interval_ms: u64,
    pub tick_rate_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            number_of_words: 25,
            number_of_secs: None,
            sample_interval_ms: DEFAULT_SAMPLE_INTERVAL_MS,
            countdown_interval_ms: DEFAULT_COUNTDOWN_INTERVAL_MS,
            tick_rate_ms: 250,
        }
    }
}

impl Config {
    /// Mode of the last test the user picked, clamped to the supported limits
    pub fn mode(&self) -> Mode {
        match self.number_of_secs {
            Some(secs) if secs > 0 => Mode::Timed(secs.min(MAX_TIMED_SECS)),
            _ => Mode::WordCount(self.number_of_words.clamp(1, MAX_WORD_COUNT)),
        }
    }

    pub fn remember_mode(&mut self, mode: Mode) {
        match mode {
            Mode::WordCount(n) => {
                self.number_of_words = n;
                self.number_of_secs = None;
            }
            Mode::Timed(secs) => self.number_of_secs = Some(secs),
            Mode::FreeText => {}
        }
    }

    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms.max(1))
    }

    pub fn countdown_interval(&self) -> Duration {
        Duration::from_millis(self.countdown_interval_ms.max(1))
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms.max(1))
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
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("term_type_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        let Ok(bytes) = fs::read(&self.path) else {
            return Config::default();
        };
        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => cfg,
            Err(err) => {
                warn!(path = %self.path.display(), %err, "ignoring unreadable config");
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
