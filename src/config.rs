use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::store::json_store::default_data_dir;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_deck_dir")]
    pub deck_dir: String,
    #[serde(default = "default_levels")]
    pub levels: Vec<String>,
    #[serde(default = "default_clear_input_on_mismatch")]
    pub clear_input_on_mismatch: bool,
    #[serde(default)]
    pub last_deck: Option<String>,
}

fn default_theme() -> String {
    "catppuccin-mocha".to_string()
}
fn default_deck_dir() -> String {
    default_data_dir()
        .join("decks")
        .to_string_lossy()
        .to_string()
}
fn default_levels() -> Vec<String> {
    ["N5", "N4", "N3", "N2", "N1"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_clear_input_on_mismatch() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            deck_dir: default_deck_dir(),
            levels: default_levels(),
            clear_input_on_mismatch: default_clear_input_on_mismatch(),
            last_deck: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.validate();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("flashdeck")
            .join("config.toml")
    }

    pub fn deck_dir(&self) -> PathBuf {
        PathBuf::from(&self.deck_dir)
    }

    /// Trim levels, drop blanks and duplicates. An empty result falls back
    /// to the default JLPT levels.
    pub fn validate(&mut self) {
        let mut levels: Vec<String> = Vec::new();
        for level in &self.levels {
            let level = level.trim();
            if !level.is_empty() && !levels.iter().any(|l| l == level) {
                levels.push(level.to_string());
            }
        }
        self.levels = if levels.is_empty() {
            default_levels()
        } else {
            levels
        };
        if self.deck_dir.trim().is_empty() {
            self.deck_dir = default_deck_dir();
        }
        if self
            .last_deck
            .as_deref()
            .is_some_and(|k| k.trim().is_empty())
        {
            self.last_deck = None;
        }
    }
}
