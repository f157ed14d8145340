use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use deckstudy_lib::config::StudyConfig;
use deckstudy_lib::flashcards::DeckStorage;
use deckstudy_lib::stats::StatsStorage;

/// Shared application state for CLI commands
pub struct App {
    pub config: StudyConfig,
    pub data_dir: PathBuf,
    pub decks: DeckStorage,
    pub stats: StatsStorage,
}

impl App {
    /// Initialize from the config file, with an optional data directory
    /// override
    pub fn new(config_path: Option<&Path>, data_dir: Option<PathBuf>) -> Result<Self> {
        let config = match config_path {
            Some(path) => StudyConfig::load_from(path),
            None => StudyConfig::load(),
        }
        .context("Failed to load config")?;

        let data_dir = match data_dir {
            Some(dir) => dir,
            None => config
                .resolve_data_dir()
                .context("Failed to get data directory")?,
        };

        let decks = DeckStorage::new(data_dir.clone());
        decks.init().context("Failed to initialize deck storage")?;
        let stats = StatsStorage::new(data_dir.clone());

        Ok(Self {
            config,
            data_dir,
            decks,
            stats,
        })
    }

    /// New-card cap for a session: flag, then config
    pub fn max_new(&self, flag: Option<usize>) -> usize {
        flag.unwrap_or(self.config.max_new_cards)
    }

    /// Find a deck by name (case-insensitive prefix match)
    pub fn find_deck(&self, name: &str) -> Result<String> {
        let decks = self.decks.list_decks().context("Failed to list decks")?;
        let name_lower = name.to_lowercase();

        // Exact match first
        if let Some(deck) = decks.iter().find(|d| d.to_lowercase() == name_lower) {
            return Ok(deck.clone());
        }

        // Prefix match
        let matches: Vec<&String> = decks
            .iter()
            .filter(|d| d.to_lowercase().starts_with(&name_lower))
            .collect();

        match matches.len() {
            0 => bail!(
                "No deck matching '{}'. Available decks:\n{}",
                name,
                decks.iter().map(|d| format!("  - {}", d)).collect::<Vec<_>>().join("\n")
            ),
            1 => Ok(matches[0].clone()),
            _ => bail!(
                "Ambiguous deck name '{}'. Matches:\n{}",
                name,
                matches.iter().map(|d| format!("  - {}", d)).collect::<Vec<_>>().join("\n")
            ),
        }
    }
}
