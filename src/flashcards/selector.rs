//! Picks the next card to present

use chrono::{DateTime, Utc};

use super::queue::SessionQueues;

/// Dequeue the next card, in priority order:
///
/// 1. a learning card that is due at `now`
/// 2. the front of the review queue
/// 3. the front of the new queue
/// 4. the earliest learning card even if not yet due, so a pending
///    re-study is shown early rather than skipped
///
/// Returns `None` once every queue is empty, and keeps returning `None`.
pub fn next_card(queues: &mut SessionQueues, now: DateTime<Utc>) -> Option<usize> {
    if let Some(card) = queues.learning.pop_due(now) {
        return Some(card);
    }
    if let Some(card) = queues.review.pop_front() {
        return Some(card);
    }
    if let Some(card) = queues.new.pop_front() {
        return Some(card);
    }
    queues.learning.pop()
}
