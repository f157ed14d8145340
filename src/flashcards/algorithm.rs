//! SM-2 style spaced repetition policy
//!
//! Two regimes, selected by whether the card has been graded before:
//!
//! - New cards get fixed first steps (1 minute, 10 minutes, 1 day, 4 days)
//!   and only Good/Easy seed an interval and ease factor.
//! - Seen cards grow their interval by the ease factor. Again resets the
//!   interval to zero and brings the card back after 10 minutes.
//!
//! Intervals are whole days and truncate. The ease factor never drops
//! below [`MIN_EASE_FACTOR`].

use chrono::{DateTime, Duration, Utc};

use super::models::{Card, Grade};

// New card scheduling
pub const AGAIN_NEW_CARD_MINUTES: i64 = 1;
pub const HARD_NEW_CARD_MINUTES: i64 = 10;
pub const GOOD_INITIAL_INTERVAL: i32 = 1;
pub const EASY_INITIAL_INTERVAL: i32 = 4;

// Review card scheduling
pub const AGAIN_REVIEW_MINUTES: i64 = 10;
pub const HARD_INTERVAL_MULTIPLIER: f64 = 1.2;

// Ease factors
pub const DEFAULT_EASE_FACTOR: f64 = 2.5;
pub const MIN_EASE_FACTOR: f64 = 1.3;
pub const EASY_INITIAL_EASE_FACTOR: f64 = 2.6;
pub const EASY_EASE_BONUS: f64 = 0.15;
pub const HARD_EASE_PENALTY: f64 = 0.15;
pub const AGAIN_EASE_PENALTY: f64 = 0.2;

/// Cards landing within this window of the grading time are studied again
/// in the same session
pub const LEARNING_HORIZON_HOURS: i64 = 24;

/// Scheduling fields produced by grading a card
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduleResult {
    pub next_review: DateTime<Utc>,
    pub interval_days: Option<i32>,
    pub ease_factor: Option<f64>,
    pub is_new: bool,
}

/// Calculate the next review for `card` graded `grade` at `now`
pub fn schedule(card: &Card, grade: Grade, now: DateTime<Utc>) -> ScheduleResult {
    if card.is_new {
        schedule_new(card, grade, now)
    } else {
        schedule_review(card, grade, now)
    }
}

fn schedule_new(card: &Card, grade: Grade, now: DateTime<Utc>) -> ScheduleResult {
    let (next_review, interval_days, ease_factor) = match grade {
        Grade::Again => (
            now + Duration::minutes(AGAIN_NEW_CARD_MINUTES),
            card.interval_days,
            card.ease_factor,
        ),
        Grade::Hard => (
            now + Duration::minutes(HARD_NEW_CARD_MINUTES),
            card.interval_days,
            card.ease_factor,
        ),
        Grade::Good => (
            now + Duration::days(GOOD_INITIAL_INTERVAL as i64),
            Some(GOOD_INITIAL_INTERVAL),
            Some(DEFAULT_EASE_FACTOR),
        ),
        Grade::Easy => (
            now + Duration::days(EASY_INITIAL_INTERVAL as i64),
            Some(EASY_INITIAL_INTERVAL),
            Some(EASY_INITIAL_EASE_FACTOR),
        ),
    };

    ScheduleResult {
        next_review,
        interval_days,
        ease_factor,
        is_new: false,
    }
}

fn schedule_review(card: &Card, grade: Grade, now: DateTime<Utc>) -> ScheduleResult {
    let ef = card.ease_factor.unwrap_or(DEFAULT_EASE_FACTOR);
    let iv = card.interval_days.unwrap_or(GOOD_INITIAL_INTERVAL);

    let (interval, ease_factor) = match grade {
        Grade::Again => {
            return ScheduleResult {
                next_review: now + Duration::minutes(AGAIN_REVIEW_MINUTES),
                interval_days: Some(0),
                ease_factor: Some((ef - AGAIN_EASE_PENALTY).max(MIN_EASE_FACTOR)),
                is_new: false,
            };
        }
        Grade::Hard => (
            grow(iv, HARD_INTERVAL_MULTIPLIER, GOOD_INITIAL_INTERVAL),
            (ef - HARD_EASE_PENALTY).max(MIN_EASE_FACTOR),
        ),
        Grade::Good => (grow(iv, ef, GOOD_INITIAL_INTERVAL), ef),
        Grade::Easy => (grow(iv, ef, EASY_INITIAL_INTERVAL), ef + EASY_EASE_BONUS),
    };

    ScheduleResult {
        next_review: now + Duration::days(interval as i64),
        interval_days: Some(interval),
        // A stored factor below the floor (hand-edited deck) is lifted on
        // the next grade.
        ease_factor: Some(ease_factor.max(MIN_EASE_FACTOR)),
        is_new: false,
    }
}

/// Multiply an interval, truncating to whole days. A zero interval (the
/// card was just failed) restarts at `bootstrap` instead.
fn grow(interval: i32, multiplier: f64, bootstrap: i32) -> i32 {
    if interval == 0 {
        bootstrap
    } else {
        (interval as f64 * multiplier).floor() as i32
    }
}

/// Write a schedule result back onto the card
pub fn apply(card: &mut Card, result: &ScheduleResult) {
    card.next_review = result.next_review;
    card.interval_days = result.interval_days;
    card.ease_factor = result.ease_factor;
    card.is_new = result.is_new;
}

/// Whether a card due at `next_review` should be re-studied this session
pub fn within_learning_horizon(next_review: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    next_review - now < Duration::hours(LEARNING_HORIZON_HOURS)
}

/// Delay each grade would produce, in Again, Hard, Good, Easy order.
/// Used to label the answer buttons.
pub fn preview_delays(card: &Card, now: DateTime<Utc>) -> [Duration; 4] {
    Grade::ALL.map(|grade| schedule(card, grade, now).next_review - now)
}

/// Format a delay to a short human-readable string
pub fn format_delay(delay: Duration) -> String {
    let minutes = delay.num_minutes();
    let days = delay.num_days();

    if minutes < 1 {
        "now".to_string()
    } else if minutes < 60 {
        format!("{}m", minutes)
    } else if days < 1 {
        format!("{}h", delay.num_hours())
    } else if days < 7 {
        format!("{}d", days)
    } else if days < 30 {
        format!("{}w", days / 7)
    } else if days < 365 {
        format!("{}mo", days / 30)
    } else {
        format!("{}y", days / 365)
    }
}
