use crate::bank::Difficulty;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Values remembered between runs to prefill the login screen.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub name: String,
    pub group: String,
    pub difficulty: Difficulty,
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
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "kviz") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("kviz_config.json")
        };
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
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(cfg) = serde_json::from_slice::<Config>(&bytes) {
                return cfg;
            }
        }
        Config::default()
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
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config::default();
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn save_and_load_custom_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config {
            name: "Ada".into(),
            group: "KN-21".into(),
            difficulty: Difficulty::Hard,
        };
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"name": "Ada"}"#).unwrap();
        let loaded = FileConfigStore::with_path(&path).load();
        assert_eq!(loaded.name, "Ada");
        assert_eq!(loaded.difficulty, Difficulty::Easy);
    }

    #[test]
    fn stale_bank_dir_is_dropped_on_save() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let gone = dir.path().join("removed-bank");
        let old = format!(
            r#"{{"name": "Ada", "group": "KN-21", "difficulty": "medium", "bank_dir": {:?}}}"#,
            gone.display().to_string()
        );
        fs::write(&path, old).unwrap();

        let store = FileConfigStore::with_path(&path);
        let loaded = store.load();
        assert_eq!(loaded.name, "Ada");
        assert_eq!(loaded.difficulty, Difficulty::Medium);

        store.save(&loaded).unwrap();
        let written = fs::read_to_string(&path).unwrap();
        assert!(!written.contains("bank_dir"), "{written}");
    }

    #[test]
    fn unreadable_config_is_default() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("missing.json"));
        assert_eq!(store.load(), Config::default());
    }
}
