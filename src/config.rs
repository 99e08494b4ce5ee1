use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::miner::{MinerConfig, DEFAULT_MAX_WORDS, DEFAULT_MIN_WORDS};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub min_repeats: usize,
    pub min_words: usize,
    pub max_words: usize,
    pub source_lang: String,
    pub target_lang: String,
    pub translate: bool,
    pub translate_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_repeats: 5,
            min_words: DEFAULT_MIN_WORDS,
            max_words: DEFAULT_MAX_WORDS,
            source_lang: "ro".to_string(),
            target_lang: "uk".to_string(),
            translate: true,
            translate_timeout_secs: 10,
        }
    }
}

impl Config {
    pub fn miner_config(&self) -> MinerConfig {
        MinerConfig::new(self.min_repeats).with_lengths(self.min_words, self.max_words)
    }

    pub fn translate_timeout(&self) -> Duration {
        Duration::from_secs(self.translate_timeout_secs.max(1))
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
        let path = if let Some(pd) = ProjectDirs::from("", "", "lacuna") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("lacuna_config.json")
        };
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
    /// Missing or unreadable files fall back to defaults
    fn load(&self) -> Config {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(_) => return Config::default(),
        };
        serde_json::from_slice::<Config>(&bytes).unwrap_or_else(|e| {
            log::warn!("ignoring malformed config {}: {e}", self.path.display());
            Config::default()
        })
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("config.json"));
        let cfg = Config::default();
        store.save(&cfg).unwrap();
        assert_eq!(store.load(), cfg);
    }

    #[test]
    fn save_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("lacuna").join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config {
            min_repeats: 2,
            target_lang: "en".into(),
            translate: false,
            ..Config::default()
        };
        store.save(&cfg).unwrap();

        assert!(path.exists());
        assert_eq!(store.load(), cfg);
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("absent.json"));
        assert_eq!(store.load(), Config::default());
    }

    #[test]
    fn malformed_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, b"{ not json").unwrap();
        assert_eq!(FileConfigStore::with_path(&path).load(), Config::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, br#"{ "min_repeats": 3 }"#).unwrap();

        let cfg = FileConfigStore::with_path(&path).load();
        assert_eq!(cfg.min_repeats, 3);
        assert_eq!(cfg.source_lang, "ro");
        assert_eq!(cfg.max_words, 5);
    }

    #[test]
    fn miner_config_follows_settings() {
        let cfg = Config {
            min_repeats: 4,
            min_words: 2,
            max_words: 6,
            ..Config::default()
        };
        assert_eq!(cfg.miner_config(), MinerConfig::new(4).with_lengths(2, 6));
        assert_eq!(
            Config {
                translate_timeout_secs: 0,
                ..Config::default()
            }
            .translate_timeout(),
            Duration::from_secs(1)
        );
    }
}
