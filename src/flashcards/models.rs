//! Data models for the flashcard system

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A deck is a named, ordered collection of flashcards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deck {
    #[serde(default, alias = "Name")]
    pub name: String,
    #[serde(default, alias = "Cards")]
    pub cards: Vec<Card>,
}

impl Deck {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cards: Vec::new(),
        }
    }

    /// Append a card, stamping it with this deck's name
    pub fn push(&mut self, mut card: Card) {
        card.deck_name = Some(self.name.clone());
        self.cards.push(card);
    }

    /// Stamp every card with the owning deck's name
    pub fn claim_cards(&mut self) {
        for card in &mut self.cards {
            card.deck_name = Some(self.name.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// A flashcard with question (front) and answer (back) plus its
/// spaced repetition state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    #[serde(alias = "Front")]
    pub front: String,
    #[serde(alias = "Back")]
    pub back: String,
    /// Name of the deck the card was loaded from
    #[serde(default, alias = "DeckName", skip_serializing_if = "Option::is_none")]
    pub deck_name: Option<String>,
    /// Never graded
    #[serde(default = "default_is_new", alias = "IsNew")]
    pub is_new: bool,
    /// Whole days between reviews, unset until the first passing grade
    #[serde(default, alias = "Interval", alias = "interval")]
    pub interval_days: Option<i32>,
    /// Interval growth multiplier, unset until the first passing grade
    #[serde(default, alias = "EaseFactor")]
    pub ease_factor: Option<f64>,
    #[serde(
        default = "Utc::now",
        alias = "NextReview",
        deserialize_with = "review_time::deserialize"
    )]
    pub next_review: DateTime<Utc>,
}

fn default_is_new() -> bool {
    true
}

impl Card {
    pub fn new(front: impl Into<String>, back: impl Into<String>) -> Self {
        Self {
            front: front.into(),
            back: back.into(),
            deck_name: None,
            is_new: true,
            interval_days: None,
            ease_factor: None,
            next_review: Utc::now(),
        }
    }

    /// Check if the card is due for review at `now`
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review <= now
    }

    /// Front and back together identify a card
    pub fn same_card(&self, other: &Card) -> bool {
        self.front == other.front && self.back == other.back
    }
}

/// Timestamps are written as RFC 3339. Decks exported by the old desktop
/// tool carry naive local timestamps; those are read as UTC.
mod review_time {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{de, Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(|e| de::Error::custom(format!("invalid review time '{}': {}", raw, e)))
    }
}

/// User-supplied recall quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grade {
    Again,
    Hard,
    Good,
    Easy,
}

impl Grade {
    pub const ALL: [Grade; 4] = [Grade::Again, Grade::Hard, Grade::Good, Grade::Easy];

    /// Map a button rating (1-4: Again, Hard, Good, Easy) to a grade
    pub fn from_rating(rating: i32) -> Option<Self> {
        match rating {
            1 => Some(Self::Again),
            2 => Some(Self::Hard),
            3 => Some(Self::Good),
            4 => Some(Self::Easy),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Again => "Again",
            Self::Hard => "Hard",
            Self::Good => "Good",
            Self::Easy => "Easy",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown grade: {0:?}")]
pub struct ParseGradeError(pub String);

impl FromStr for Grade {
    type Err = ParseGradeError;

    /// Only the exact tokens are accepted
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Again" => Ok(Self::Again),
            "Hard" => Ok(Self::Hard),
            "Good" => Ok(Self::Good),
            "Easy" => Ok(Self::Easy),
            other => Err(ParseGradeError(other.to_string())),
        }
    }
}
