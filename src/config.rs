//! Study configuration
//!
//! Read from `{config_dir}/deckstudy/config.toml`:
//! ```toml
//! data_dir = "/home/me/flashcards"
//! max_new_cards = 15
//! ```
//! A missing file means defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::flashcards::storage::DeckStorage;
use crate::flashcards::DEFAULT_MAX_NEW_CARDS;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config directory not found")]
    ConfigDirNotFound,

    #[error("Data directory not found")]
    DataDirNotFound,
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudyConfig {
    /// Where decks and stats live (default: platform data dir)
    pub data_dir: Option<PathBuf>,
    /// New cards introduced per session
    pub max_new_cards: usize,
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            max_new_cards: DEFAULT_MAX_NEW_CARDS,
        }
    }
}

impl StudyConfig {
    /// Default config file location
    pub fn default_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join("deckstudy").join("config.toml"))
            .ok_or(ConfigError::ConfigDirNotFound)
    }

    /// Load from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path()?)
    }

    /// Load from `path`, falling back to defaults when it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: StudyConfig = toml::from_str(&content)?;
        log::debug!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Configured data directory, or the platform default
    pub fn resolve_data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => DeckStorage::default_data_dir().map_err(|_| ConfigError::DataDirNotFound),
        }
    }
}
