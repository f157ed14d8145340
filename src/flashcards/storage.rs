//! Storage operations for decks
//!
//! Directory structure:
//! ```text
//! {data_dir}/
//! └── decks/
//!     └── {deck-name}.json   # One file per deck, cards in deck order
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use super::models::*;

#[derive(Error, Debug)]
pub enum DeckStorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Deck is not valid JSON: {0}")]
    Deserialization(#[from] serde_json::Error),

    #[error("Deck not found: {0}")]
    DeckNotFound(String),

    #[error("Deck already exists: {0}")]
    DeckExists(String),

    #[error("Deck '{deck}' has no card {index}")]
    CardNotFound { deck: String, index: usize },

    #[error("Invalid deck name: {0:?}")]
    InvalidDeckName(String),

    #[error("Data directory not found")]
    DataDirNotFound,
}

pub type Result<T> = std::result::Result<T, DeckStorageError>;

/// Load/save boundary used by study sessions
pub trait DeckStore {
    /// Load a deck with every card stamped with the deck's name
    fn load_deck(&self, name: &str) -> Result<Deck>;

    /// Persist the whole deck
    fn save_deck(&self, deck: &Deck) -> Result<()>;
}

/// Card counts shown in deck listings
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckSummary {
    pub name: String,
    pub total_cards: usize,
    pub new_cards: usize,
    pub due_cards: usize,
}

/// JSON file storage for decks
pub struct DeckStorage {
    data_dir: PathBuf,
}

impl DeckStorage {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    /// Get the default data directory
    pub fn default_data_dir() -> Result<PathBuf> {
        dirs::data_local_dir()
            .map(|p| p.join("deckstudy"))
            .ok_or(DeckStorageError::DataDirNotFound)
    }

    fn decks_dir(&self) -> PathBuf {
        self.data_dir.join("decks")
    }

    fn deck_path(&self, name: &str) -> PathBuf {
        self.decks_dir().join(format!("{}.json", name))
    }

    /// Initialize the decks directory
    pub fn init(&self) -> Result<()> {
        fs::create_dir_all(self.decks_dir())?;
        Ok(())
    }

    /// List deck names, sorted
    pub fn list_decks(&self) -> Result<Vec<String>> {
        let decks_dir = self.decks_dir();
        if !decks_dir.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&decks_dir)? {
            let path = entry?.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                match path.file_stem().and_then(|s| s.to_str()) {
                    Some(stem) if validate_deck_name(stem).is_ok() => names.push(stem.to_string()),
                    _ => log::warn!("Skipping deck file with unusable name: {:?}", path),
                }
            }
        }

        names.sort();
        Ok(names)
    }

    /// Create an empty deck
    pub fn create_deck(&self, name: &str) -> Result<Deck> {
        validate_deck_name(name)?;
        self.init()?;

        if self.deck_path(name).exists() {
            return Err(DeckStorageError::DeckExists(name.to_string()));
        }

        let deck = Deck::new(name);
        self.write_deck(&deck)?;
        log::info!("Created deck '{}'", name);
        Ok(deck)
    }

    /// Append a new card to a deck
    pub fn add_card(&self, deck_name: &str, front: String, back: String) -> Result<Card> {
        let mut deck = self.read_deck(deck_name)?;
        let mut card = Card::new(front, back);
        card.deck_name = Some(deck.name.clone());
        deck.cards.push(card.clone());
        self.write_deck(&deck)?;
        Ok(card)
    }

    /// Replace the text of the card at `index`, keeping its schedule
    pub fn update_card(&self, deck_name: &str, index: usize, front: String, back: String) -> Result<Card> {
        let mut deck = self.read_deck(deck_name)?;
        let card = deck
            .cards
            .get_mut(index)
            .ok_or_else(|| DeckStorageError::CardNotFound {
                deck: deck_name.to_string(),
                index,
            })?;
        card.front = front;
        card.back = back;
        let updated = card.clone();

        self.write_deck(&deck)?;
        log::info!("Updated card {} in '{}'", index, deck_name);
        Ok(updated)
    }

    /// Remove the card at `index`; later cards shift down
    pub fn remove_card(&self, deck_name: &str, index: usize) -> Result<Card> {
        let mut deck = self.read_deck(deck_name)?;
        if index >= deck.len() {
            return Err(DeckStorageError::CardNotFound {
                deck: deck_name.to_string(),
                index,
            });
        }
        let removed = deck.cards.remove(index);

        self.write_deck(&deck)?;
        log::info!("Removed card {} from '{}'", index, deck_name);
        Ok(removed)
    }

    /// Delete a deck and all its cards
    pub fn delete_deck(&self, name: &str) -> Result<()> {
        validate_deck_name(name)?;
        let path = self.deck_path(name);
        if !path.exists() {
            return Err(DeckStorageError::DeckNotFound(name.to_string()));
        }

        fs::remove_file(&path)?;
        log::info!("Deleted deck '{}'", name);
        Ok(())
    }

    /// Copy an external deck file into the decks directory.
    ///
    /// The file must parse as a deck. It is stored under its file stem,
    /// which becomes the deck name. Returns that name.
    pub fn import_deck(&self, source: &Path) -> Result<String> {
        let name = source
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| DeckStorageError::InvalidDeckName(source.display().to_string()))?
            .to_string();
        validate_deck_name(&name)?;

        let content = fs::read_to_string(source)?;
        let mut deck: Deck = serde_json::from_str(&content)?;

        self.init()?;
        if self.deck_path(&name).exists() {
            return Err(DeckStorageError::DeckExists(name));
        }

        deck.name = name.clone();
        deck.claim_cards();
        self.write_deck(&deck)?;

        log::info!("Imported {} cards from {:?} as deck '{}'", deck.len(), source, name);
        Ok(name)
    }

    /// Every card of every deck, deck by deck
    pub fn list_all_cards(&self) -> Result<Vec<Card>> {
        let mut cards = Vec::new();
        for name in self.list_decks()? {
            cards.extend(self.read_deck(&name)?.cards);
        }
        Ok(cards)
    }

    /// Card counts for a deck at `now`
    pub fn deck_summary(&self, name: &str, now: DateTime<Utc>) -> Result<DeckSummary> {
        let deck = self.read_deck(name)?;
        Ok(DeckSummary {
            name: deck.name.clone(),
            total_cards: deck.len(),
            new_cards: deck.cards.iter().filter(|c| c.is_new).count(),
            due_cards: deck
                .cards
                .iter()
                .filter(|c| !c.is_new && c.is_due(now))
                .count(),
        })
    }

    fn read_deck(&self, name: &str) -> Result<Deck> {
        validate_deck_name(name)?;
        let path = self.deck_path(name);
        if !path.exists() {
            return Err(DeckStorageError::DeckNotFound(name.to_string()));
        }

        let content = fs::read_to_string(&path)?;
        let mut deck: Deck = serde_json::from_str(&content)?;

        // The file name is the deck's identity
        deck.name = name.to_string();
        deck.claim_cards();
        Ok(deck)
    }

    fn write_deck(&self, deck: &Deck) -> Result<()> {
        validate_deck_name(&deck.name)?;
        self.init()?;
        let path = self.deck_path(&deck.name);
        fs::write(&path, serde_json::to_string_pretty(deck)?)?;
        log::debug!("Deck saved to {:?}", path);
        Ok(())
    }
}

impl DeckStore for DeckStorage {
    fn load_deck(&self, name: &str) -> Result<Deck> {
        self.read_deck(name)
    }

    fn save_deck(&self, deck: &Deck) -> Result<()> {
        self.write_deck(deck)
    }
}

/// Deck names double as file names
fn validate_deck_name(name: &str) -> Result<()> {
    let trimmed = name.trim();
    if trimmed.is_empty()
        || trimmed != name
        || name.contains(['/', '\\'])
        || name.contains("..")
    {
        return Err(DeckStorageError::InvalidDeckName(name.to_string()));
    }
    Ok(())
}
