use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

pub const LOCALES: &[&str] = &["zh-CN", "en"];
pub const DRILLS: &[&str] = &["root", "split"];

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_locale")]
    pub locale: String,
    #[serde(default = "default_drill")]
    pub default_drill: String,
    #[serde(default = "default_dictionary_dir")]
    pub dictionary_dir: String,
    /// Base URL the split dictionaries are fetched from when missing
    /// locally. Empty disables downloads.
    #[serde(default)]
    pub dictionary_base_url: String,
    #[serde(default = "default_storage_dir")]
    pub storage_dir: String,
    #[serde(default = "default_show_root_chart")]
    pub show_root_chart: bool,
}

fn default_theme() -> String {
    "catppuccin-mocha".to_string()
}
fn default_locale() -> String {
    "zh-CN".to_string()
}
fn default_drill() -> String {
    "root".to_string()
}
fn data_subdir(name: &str) -> String {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("shouyou")
        .join(name)
        .to_string_lossy()
        .to_string()
}
fn default_dictionary_dir() -> String {
    data_subdir("dictionaries")
}
fn default_storage_dir() -> String {
    data_subdir("practice")
}
fn default_show_root_chart() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            locale: default_locale(),
            default_drill: default_drill(),
            dictionary_dir: default_dictionary_dir(),
            dictionary_base_url: String::new(),
            storage_dir: default_storage_dir(),
            show_root_chart: default_show_root_chart(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("shouyou")
            .join("config.toml")
    }

    /// Reset values a hand-edited or stale file may carry to their defaults.
    pub fn validate(&mut self, themes: &[String]) {
        if !themes.iter().any(|t| *t == self.theme) {
            self.theme = default_theme();
        }
        if !LOCALES.contains(&self.locale.as_str()) {
            self.locale = default_locale();
        }
        self.default_drill = self.default_drill.to_lowercase();
        if !DRILLS.contains(&self.default_drill.as_str()) {
            self.default_drill = default_drill();
        }
    }
}
