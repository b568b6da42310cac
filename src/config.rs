use crate::ranking::RankCriterion;
use crate::search::{DEFAULT_CONTEXT_LINES, DEFAULT_MAX_FILE_SIZE};
use crate::walker::WalkOptions;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub search: SearchConfig,
    pub walk: WalkOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub case_sensitive: bool,
    pub context_lines: usize,
    /// Bytes; `None` scans files of any size.
    pub max_file_size: Option<u64>,
    pub threads: Option<usize>,
    pub default_extensions: Vec<String>,
    pub sort: RankCriterion,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            case_sensitive: false,
            context_lines: DEFAULT_CONTEXT_LINES,
            max_file_size: Some(DEFAULT_MAX_FILE_SIZE),
            threads: None,
            default_extensions: vec!["txt".to_string(), "md".to_string()],
            sort: RankCriterion::Relevance,
        }
    }
}

impl Config {
    /// Load the first config file found, or the defaults if there is none.
    pub fn load() -> Result<Self> {
        match Self::find_config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    fn find_config_path() -> Option<PathBuf> {
        if let Some(xdg_config) = dirs::config_dir() {
            let xdg_path = xdg_config.join("findora/config.toml");
            if xdg_path.exists() {
                return Some(xdg_path);
            }
        }

        if let Some(home) = dirs::home_dir() {
            let home_path = home.join(".findora.toml");
            if home_path.exists() {
                return Some(home_path);
            }
        }

        let current_path = Path::new(".findora.toml");
        if current_path.exists() {
            return Some(current_path.to_path_buf());
        }

        None
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }
}
