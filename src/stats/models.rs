//! Daily study statistics data models

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Study totals for one calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStats {
    /// Day the totals belong to (YYYY-MM-DD)
    pub date: NaiveDate,
    /// Stored as raw seconds so the file stays readable
    #[serde(default)]
    pub total_study_time_seconds: f64,
    /// Cards graded this day
    #[serde(default)]
    pub total_cards: u32,
}

impl DailyStats {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            total_study_time_seconds: 0.0,
            total_cards: 0,
        }
    }

    pub fn total_study_time(&self) -> Duration {
        Duration::milliseconds((self.total_study_time_seconds * 1000.0).round() as i64)
    }

    pub fn average_time_per_card(&self) -> Duration {
        if self.total_cards == 0 {
            return Duration::zero();
        }
        let seconds = self.total_study_time_seconds / self.total_cards as f64;
        Duration::milliseconds((seconds * 1000.0).round() as i64)
    }

    /// Add a batch of reviewed cards and the time spent on them
    pub fn add(&mut self, cards_reviewed: u32, elapsed: Duration) {
        self.total_cards += cards_reviewed;
        // Clock skew can yield a negative delta; it adds nothing
        let millis = elapsed.num_milliseconds().max(0);
        self.total_study_time_seconds += millis as f64 / 1000.0;
    }
}
