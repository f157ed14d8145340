//! Session queues
//!
//! A session partitions a deck into three queues. Each queue holds indices
//! into the deck's card list, so cards are graded in place.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};

use chrono::{DateTime, Utc};

use super::models::Deck;

/// Default cap on new cards introduced per session
pub const DEFAULT_MAX_NEW_CARDS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct LearningEntry {
    due: DateTime<Utc>,
    seq: u64,
    card: usize,
}

/// Cards re-studied within the session, earliest due first. Cards with the
/// same due time come out in the order they went in.
#[derive(Debug, Clone, Default)]
pub struct LearningQueue {
    heap: BinaryHeap<Reverse<LearningEntry>>,
    next_seq: u64,
}

impl LearningQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, card: usize, due: DateTime<Utc>) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(LearningEntry { due, seq, card }));
    }

    /// Due time of the earliest entry
    pub fn next_due(&self) -> Option<DateTime<Utc>> {
        self.heap.peek().map(|Reverse(entry)| entry.due)
    }

    /// Remove the earliest entry, whether or not it is due
    pub fn pop(&mut self) -> Option<usize> {
        self.heap.pop().map(|Reverse(entry)| entry.card)
    }

    /// Remove the earliest entry only if it is due at `now`
    pub fn pop_due(&mut self, now: DateTime<Utc>) -> Option<usize> {
        match self.next_due() {
            Some(due) if due <= now => self.pop(),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

/// The three queues of a study session
#[derive(Debug, Clone, Default)]
pub struct SessionQueues {
    pub new: VecDeque<usize>,
    pub review: VecDeque<usize>,
    pub learning: LearningQueue,
}

/// Queue sizes, for progress display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueueCounts {
    pub new: usize,
    pub review: usize,
    pub learning: usize,
}

impl QueueCounts {
    pub fn total(&self) -> usize {
        self.new + self.review + self.learning
    }
}

impl SessionQueues {
    pub fn counts(&self) -> QueueCounts {
        QueueCounts {
            new: self.new.len(),
            review: self.review.len(),
            learning: self.learning.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.new.is_empty() && self.review.is_empty() && self.learning.is_empty()
    }
}

/// Partition a deck into session queues.
///
/// Seen cards due at `now` go to review, and the first `max_new` unseen
/// cards go to new, both in deck order. Everything else sits this session
/// out. The learning queue starts empty.
pub fn build_queues(deck: &Deck, now: DateTime<Utc>, max_new: usize) -> SessionQueues {
    let mut queues = SessionQueues::default();

    for (index, card) in deck.cards.iter().enumerate() {
        if card.is_new {
            if queues.new.len() < max_new {
                queues.new.push_back(index);
            }
        } else if card.is_due(now) {
            queues.review.push_back(index);
        }
    }

    log::debug!(
        "Built queues for deck '{}': {} new, {} review",
        deck.name,
        queues.new.len(),
        queues.review.len()
    );

    queues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flashcards::models::Card;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 1, 9, 0, 0).unwrap()
    }

    fn new_card(name: &str) -> Card {
        let mut card = Card::new(name, "back");
        card.next_review = now();
        card
    }

    fn seen_card(name: &str, next_review: DateTime<Utc>) -> Card {
        let mut card = new_card(name);
        card.is_new = false;
        card.interval_days = Some(3);
        card.ease_factor = Some(2.5);
        card.next_review = next_review;
        card
    }

    #[test]
    fn test_empty_deck() {
        let queues = build_queues(&Deck::new("Empty"), now(), DEFAULT_MAX_NEW_CARDS);
        assert!(queues.is_empty());
        assert_eq!(queues.counts().total(), 0);
    }

    #[test]
    fn test_partition_preserves_deck_order() {
        let mut deck = Deck::new("Mixed");
        deck.push(seen_card("due-1", now() - Duration::days(1)));
        deck.push(new_card("new-1"));
        deck.push(seen_card("later", now() + Duration::days(2)));
        deck.push(seen_card("due-2", now()));
        deck.push(new_card("new-2"));

        let queues = build_queues(&deck, now(), DEFAULT_MAX_NEW_CARDS);
        assert_eq!(queues.review, VecDeque::from(vec![0, 3]));
        assert_eq!(queues.new, VecDeque::from(vec![1, 4]));
        assert!(queues.learning.is_empty());
    }

    #[test]
    fn test_new_cards_capped() {
        let mut deck = Deck::new("Many");
        for i in 0..15 {
            deck.push(new_card(&format!("card-{}", i)));
        }

        let queues = build_queues(&deck, now(), DEFAULT_MAX_NEW_CARDS);
        assert_eq!(queues.new.len(), 10);
        assert_eq!(queues.new.front(), Some(&0));
        assert_eq!(queues.new.back(), Some(&9));

        let queues = build_queues(&deck, now(), 0);
        assert!(queues.new.is_empty());
    }

    #[test]
    fn test_learning_queue_orders_by_due_time() {
        let mut learning = LearningQueue::new();
        learning.push(0, now() + Duration::minutes(10));
        learning.push(1, now() + Duration::minutes(1));
        learning.push(2, now() + Duration::days(1));

        assert_eq!(learning.next_due(), Some(now() + Duration::minutes(1)));
        assert_eq!(learning.pop(), Some(1));
        assert_eq!(learning.pop(), Some(0));
        assert_eq!(learning.pop(), Some(2));
        assert_eq!(learning.pop(), None);
    }

    #[test]
    fn test_learning_queue_ties_keep_insertion_order() {
        let mut learning = LearningQueue::new();
        let due = now() + Duration::minutes(10);
        learning.push(7, due);
        learning.push(3, due);
        learning.push(5, due);

        assert_eq!(learning.pop(), Some(7));
        assert_eq!(learning.pop(), Some(3));
        assert_eq!(learning.pop(), Some(5));
    }

    #[test]
    fn test_learning_pop_due() {
        let mut learning = LearningQueue::new();
        learning.push(4, now() + Duration::minutes(10));

        assert_eq!(learning.pop_due(now()), None);
        assert_eq!(learning.len(), 1);
        assert_eq!(learning.pop_due(now() + Duration::minutes(10)), Some(4));
        assert!(learning.is_empty());
    }
}
