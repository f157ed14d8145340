//! Daily stats storage
//!
//! A single `daily_stats.json` holds the current day's totals. A file from
//! an earlier day is replaced by fresh totals on the next update.

use std::fs;
use std::path::PathBuf;

use chrono::{Duration, Local, NaiveDate};
use thiserror::Error;

use super::models::DailyStats;

const STATS_FILENAME: &str = "daily_stats.json";

#[derive(Error, Debug)]
pub enum StatsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StatsError>;

/// Receives study-time signals from a session
pub trait StatsRecorder {
    fn record(&self, cards_reviewed: u32, elapsed: Duration) -> Result<()>;
}

/// JSON file storage for daily stats
pub struct StatsStorage {
    stats_path: PathBuf,
}

impl StatsStorage {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            stats_path: data_dir.join(STATS_FILENAME),
        }
    }

    /// Stats for `today`; fresh totals if the stored file is for another
    /// day, missing, or unreadable
    pub fn load_today(&self, today: NaiveDate) -> DailyStats {
        if self.stats_path.exists() {
            match self.read() {
                Ok(stats) if stats.date == today => {
                    log::debug!(
                        "Loaded today's stats: {} cards, {}s study time",
                        stats.total_cards,
                        stats.total_study_time().num_seconds()
                    );
                    return stats;
                }
                Ok(_) => {}
                Err(e) => log::warn!("Error loading stats from {:?}: {}", self.stats_path, e),
            }
        }

        DailyStats::new(today)
    }

    fn read(&self) -> Result<DailyStats> {
        let content = fs::read_to_string(&self.stats_path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, stats: &DailyStats) -> Result<()> {
        if let Some(parent) = self.stats_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.stats_path, serde_json::to_string_pretty(stats)?)?;
        log::debug!("Stats saved: {} cards reviewed", stats.total_cards);
        Ok(())
    }

    /// Add progress to `today`'s totals
    pub fn update(&self, cards_reviewed: u32, elapsed: Duration, today: NaiveDate) -> Result<DailyStats> {
        let mut stats = self.load_today(today);
        stats.add(cards_reviewed, elapsed);
        self.save(&stats)?;
        Ok(stats)
    }
}

impl StatsRecorder for StatsStorage {
    fn record(&self, cards_reviewed: u32, elapsed: Duration) -> Result<()> {
        self.update(cards_reviewed, elapsed, Local::now().date_naive())?;
        Ok(())
    }
}
