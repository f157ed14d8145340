//! Study session
//!
//! A session owns a deck for its duration. Each grade reschedules the
//! current card in place, re-queues it for same-session study when it comes
//! back within the learning horizon, saves the whole deck, and moves on to
//! the next card.

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::algorithm::{self, ScheduleResult};
use super::models::{Card, Deck, Grade, ParseGradeError};
use super::queue::{build_queues, QueueCounts, SessionQueues};
use super::selector::next_card;
use super::storage::{DeckStorageError, DeckStore};
use crate::stats::StatsRecorder;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Deck unavailable: {0}")]
    DeckUnavailable(#[source] DeckStorageError),

    #[error("No current card to grade")]
    NoCurrentCard,

    #[error("Unknown grade: {0:?}")]
    UnknownGrade(String),

    /// The grade was applied in memory; only the save failed
    #[error("Failed to save deck: {0}")]
    Persistence(#[source] DeckStorageError),
}

impl From<ParseGradeError> for SessionError {
    fn from(err: ParseGradeError) -> Self {
        Self::UnknownGrade(err.0)
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;

/// Whether a session still has a card to show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Active,
    Finished,
}

/// What grading the current card did
#[derive(Debug, Clone)]
pub struct GradeOutcome {
    pub grade: Grade,
    pub result: ScheduleResult,
    /// Card comes back later in this session
    pub requeued: bool,
}

pub struct StudySession<'a> {
    deck: Deck,
    queues: SessionQueues,
    current: Option<usize>,
    store: &'a dyn DeckStore,
    stats: Option<&'a dyn StatsRecorder>,
    started_at: DateTime<Utc>,
    last_graded_at: DateTime<Utc>,
    cards_reviewed: u32,
}

impl<'a> StudySession<'a> {
    /// Start a session over an already loaded deck
    pub fn start(deck: Deck, store: &'a dyn DeckStore, now: DateTime<Utc>, max_new: usize) -> Self {
        let mut queues = build_queues(&deck, now, max_new);
        let counts = queues.counts();
        log::info!(
            "Started session for deck '{}': {} new, {} review",
            deck.name,
            counts.new,
            counts.review
        );

        let current = next_card(&mut queues, now);
        if current.is_none() {
            log::info!("Nothing to study in deck '{}'", deck.name);
        }

        Self {
            deck,
            queues,
            current,
            store,
            stats: None,
            started_at: now,
            last_graded_at: now,
            cards_reviewed: 0,
        }
    }

    /// Load a deck through `store` and start a session over it
    pub fn open(store: &'a dyn DeckStore, name: &str, now: DateTime<Utc>, max_new: usize) -> Result<Self> {
        let deck = store.load_deck(name).map_err(SessionError::DeckUnavailable)?;
        Ok(Self::start(deck, store, now, max_new))
    }

    /// Report study time to `recorder` after every grade
    pub fn with_stats(mut self, recorder: &'a dyn StatsRecorder) -> Self {
        self.stats = Some(recorder);
        self
    }

    pub fn state(&self) -> SessionState {
        if self.current.is_some() {
            SessionState::Active
        } else {
            SessionState::Finished
        }
    }

    pub fn is_finished(&self) -> bool {
        self.state() == SessionState::Finished
    }

    /// The card awaiting a grade
    pub fn current_card(&self) -> Option<&Card> {
        self.current.map(|index| &self.deck.cards[index])
    }

    /// Cards still queued, not counting the current card
    pub fn remaining(&self) -> QueueCounts {
        self.queues.counts()
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn into_deck(self) -> Deck {
        self.deck
    }

    pub fn cards_reviewed(&self) -> u32 {
        self.cards_reviewed
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Grade the current card from a literal token (`Again`, `Hard`,
    /// `Good`, `Easy`). An unknown token changes nothing.
    pub fn grade_token(&mut self, token: &str, now: DateTime<Utc>) -> Result<GradeOutcome> {
        let grade: Grade = token.parse()?;
        self.grade(grade, now)
    }

    /// Grade the current card and advance.
    ///
    /// On `SessionError::Persistence` the new schedule is kept in memory
    /// and the session has already moved to the next card.
    pub fn grade(&mut self, grade: Grade, now: DateTime<Utc>) -> Result<GradeOutcome> {
        let index = self.current.ok_or(SessionError::NoCurrentCard)?;

        let card = &mut self.deck.cards[index];
        let result = algorithm::schedule(card, grade, now);
        algorithm::apply(card, &result);

        let requeued = algorithm::within_learning_horizon(result.next_review, now);
        if requeued {
            self.queues.learning.push(index, result.next_review);
        }

        log::debug!(
            "Graded '{}' {}: interval {:?}, ease {:?}, next review {}{}",
            card.front,
            grade,
            result.interval_days,
            result.ease_factor,
            result.next_review,
            if requeued { " (requeued)" } else { "" }
        );

        let saved = self.store.save_deck(&self.deck);
        self.record_stats(now);

        self.current = next_card(&mut self.queues, now);
        if self.current.is_none() {
            log::info!(
                "Finished session for deck '{}': {} cards reviewed",
                self.deck.name,
                self.cards_reviewed
            );
        }

        saved.map_err(SessionError::Persistence)?;

        Ok(GradeOutcome {
            grade,
            result,
            requeued,
        })
    }

    fn record_stats(&mut self, now: DateTime<Utc>) {
        self.cards_reviewed += 1;
        let elapsed = now - self.last_graded_at;
        self.last_graded_at = now;

        if let Some(stats) = self.stats {
            if let Err(e) = stats.record(1, elapsed) {
                log::warn!("Failed to record study stats: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::StatsError;
    use chrono::{Duration, TimeZone};
    use std::cell::RefCell;

    #[derive(Default)]
    struct MemoryStore {
        decks: Vec<Deck>,
        saved: RefCell<Vec<Deck>>,
        fail_saves: bool,
    }

    impl DeckStore for MemoryStore {
        fn load_deck(&self, name: &str) -> std::result::Result<Deck, DeckStorageError> {
            self.decks
                .iter()
                .find(|d| d.name == name)
                .cloned()
                .ok_or_else(|| DeckStorageError::DeckNotFound(name.to_string()))
        }

        fn save_deck(&self, deck: &Deck) -> std::result::Result<(), DeckStorageError> {
            if self.fail_saves {
                return Err(DeckStorageError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "disk full",
                )));
            }
            self.saved.borrow_mut().push(deck.clone());
            Ok(())
        }
    }

    #[derive(Default)]
    struct MemoryStats {
        records: RefCell<Vec<(u32, Duration)>>,
        fail: bool,
    }

    impl StatsRecorder for MemoryStats {
        fn record(&self, cards_reviewed: u32, elapsed: Duration) -> std::result::Result<(), StatsError> {
            if self.fail {
                return Err(StatsError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "read-only",
                )));
            }
            self.records.borrow_mut().push((cards_reviewed, elapsed));
            Ok(())
        }
    }

    fn t() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 1, 9, 0, 0).unwrap()
    }

    fn new_card(front: &str) -> Card {
        let mut card = Card::new(front, "back");
        card.next_review = t();
        card
    }

    fn review_card(front: &str, interval: i32, ease: f64) -> Card {
        let mut card = new_card(front);
        card.is_new = false;
        card.interval_days = Some(interval);
        card.ease_factor = Some(ease);
        card.next_review = t() - Duration::hours(1);
        card
    }

    fn deck_of(cards: Vec<Card>) -> Deck {
        let mut deck = Deck::new("Test");
        for card in cards {
            deck.push(card);
        }
        deck
    }

    fn current_front<'s>(session: &'s StudySession<'_>) -> Option<&'s str> {
        session.current_card().map(|c| c.front.as_str())
    }

    #[test]
    fn test_new_card_good() {
        let store = MemoryStore::default();
        let mut session = StudySession::start(deck_of(vec![new_card("only")]), &store, t(), 10);
        assert_eq!(session.state(), SessionState::Active);

        let outcome = session.grade(Grade::Good, t()).unwrap();

        let card = &session.deck().cards[0];
        assert_eq!(card.interval_days, Some(1));
        assert_eq!(card.ease_factor, Some(2.5));
        assert_eq!(card.next_review, t() + Duration::hours(24));
        assert!(!card.is_new);
        // Due tomorrow: the card leaves the session
        assert!(!outcome.requeued);
        assert!(session.is_finished());
        assert_eq!(store.saved.borrow().len(), 1);
    }

    #[test]
    fn test_new_card_good_is_not_regraded_same_session() {
        let store = MemoryStore::default();
        let deck = deck_of(vec![new_card("q"), new_card("r")]);
        let mut session = StudySession::start(deck, &store, t(), 10);

        session.grade(Grade::Good, t()).unwrap();
        assert_eq!(current_front(&session), Some("r"));
        session.grade(Grade::Good, t() + Duration::seconds(5)).unwrap();

        assert!(session.is_finished());
        assert_eq!(session.deck().cards[0].interval_days, Some(1));
    }

    #[test]
    fn test_repeated_hard_on_one_day_card_finishes() {
        let store = MemoryStore::default();
        let mut session = StudySession::start(deck_of(vec![review_card("short", 1, 2.5)]), &store, t(), 10);

        // floor(1 * 1.2) keeps the interval at one day
        let outcome = session.grade(Grade::Hard, t()).unwrap();
        assert_eq!(outcome.result.interval_days, Some(1));
        assert!(!outcome.requeued);
        assert!(session.is_finished());
        assert!(matches!(session.grade(Grade::Hard, t()), Err(SessionError::NoCurrentCard)));
    }

    #[test]
    fn test_good_with_low_ease_on_one_day_card_finishes() {
        let store = MemoryStore::default();
        let mut session = StudySession::start(deck_of(vec![review_card("low", 1, 1.5)]), &store, t(), 10);

        let outcome = session.grade(Grade::Good, t()).unwrap();
        assert_eq!(outcome.result.interval_days, Some(1));
        assert!(session.is_finished());
    }

    #[test]
    fn test_review_again_requeues_into_learning() {
        let store = MemoryStore::default();
        let deck = deck_of(vec![review_card("lapsed", 10, 2.0), review_card("other", 3, 2.5)]);
        let mut session = StudySession::start(deck, &store, t(), 10);
        assert_eq!(current_front(&session), Some("lapsed"));

        let outcome = session.grade(Grade::Again, t()).unwrap();
        assert!(outcome.requeued);

        let card = &session.deck().cards[0];
        assert_eq!(card.interval_days, Some(0));
        assert!((card.ease_factor.unwrap() - 1.8).abs() < 1e-9);
        assert_eq!(card.next_review, t() + Duration::minutes(10));

        assert_eq!(current_front(&session), Some("other"));
        assert_eq!(session.remaining().learning, 1);
    }

    #[test]
    fn test_all_easy_finishes_session() {
        let store = MemoryStore::default();
        let deck = deck_of(vec![new_card("a"), new_card("b"), new_card("c")]);
        let mut session = StudySession::start(deck, &store, t(), 10);

        for _ in 0..3 {
            let outcome = session.grade(Grade::Easy, t()).unwrap();
            assert!(!outcome.requeued);
        }

        assert!(session.is_finished());
        assert_eq!(session.remaining(), QueueCounts::default());
        assert_eq!(session.cards_reviewed(), 3);
        assert_eq!(store.saved.borrow().len(), 3);
        assert!(session.deck().cards.iter().all(|c| c.interval_days == Some(4)));
    }

    #[test]
    fn test_empty_deck_finishes_immediately() {
        let store = MemoryStore::default();
        let mut session = StudySession::start(Deck::new("Empty"), &store, t(), 10);
        assert!(session.is_finished());
        assert!(session.current_card().is_none());

        let result = session.grade(Grade::Good, t());
        assert!(matches!(result, Err(SessionError::NoCurrentCard)));
        assert!(store.saved.borrow().is_empty());
    }

    #[test]
    fn test_grade_after_finish_is_rejected() {
        let store = MemoryStore::default();
        let mut session = StudySession::start(deck_of(vec![new_card("a")]), &store, t(), 10);
        session.grade(Grade::Easy, t()).unwrap();
        assert!(session.is_finished());

        let before = session.deck().clone();
        assert!(matches!(session.grade(Grade::Again, t()), Err(SessionError::NoCurrentCard)));
        assert!(matches!(session.grade(Grade::Again, t()), Err(SessionError::NoCurrentCard)));
        assert_eq!(session.deck(), &before);
        assert_eq!(store.saved.borrow().len(), 1);
    }

    #[test]
    fn test_unknown_grade_leaves_session_untouched() {
        let store = MemoryStore::default();
        let mut session = StudySession::start(deck_of(vec![new_card("a"), new_card("b")]), &store, t(), 10);
        let before = session.deck().clone();

        let result = session.grade_token("Meh", t());
        assert!(matches!(result, Err(SessionError::UnknownGrade(ref token)) if token == "Meh"));
        assert_eq!(current_front(&session), Some("a"));
        assert_eq!(session.deck(), &before);
        assert!(store.saved.borrow().is_empty());

        session.grade_token("Hard", t()).unwrap();
        assert_eq!(current_front(&session), Some("b"));
    }

    #[test]
    fn test_save_failure_keeps_progress() {
        let store = MemoryStore {
            fail_saves: true,
            ..Default::default()
        };
        let mut session = StudySession::start(deck_of(vec![new_card("a"), new_card("b")]), &store, t(), 10);

        let result = session.grade(Grade::Easy, t());
        assert!(matches!(result, Err(SessionError::Persistence(_))));

        // In-memory schedule kept and the session moved on
        assert_eq!(session.deck().cards[0].interval_days, Some(4));
        assert!(!session.deck().cards[0].is_new);
        assert_eq!(current_front(&session), Some("b"));
        assert_eq!(session.cards_reviewed(), 1);
    }

    #[test]
    fn test_open_missing_deck() {
        let store = MemoryStore::default();
        let result = StudySession::open(&store, "Nope", t(), 10);
        assert!(matches!(
            result,
            Err(SessionError::DeckUnavailable(DeckStorageError::DeckNotFound(_)))
        ));
    }

    #[test]
    fn test_open_loads_from_store() {
        let store = MemoryStore {
            decks: vec![deck_of(vec![new_card("x")])],
            ..Default::default()
        };
        let session = StudySession::open(&store, "Test", t(), 10).unwrap();
        assert_eq!(current_front(&session), Some("x"));
    }

    #[test]
    fn test_excludes_cards_not_due_and_over_cap() {
        let store = MemoryStore::default();
        let mut later = review_card("later", 5, 2.5);
        later.next_review = t() + Duration::days(2);
        let deck = deck_of(vec![later, new_card("n1"), new_card("n2"), new_card("n3")]);

        let mut session = StudySession::start(deck, &store, t(), 2);
        let mut seen = Vec::new();
        while let Some(card) = session.current_card() {
            seen.push(card.front.clone());
            session.grade(Grade::Easy, t()).unwrap();
        }
        assert_eq!(seen, vec!["n1", "n2"]);
        assert!(session.deck().cards[3].is_new);
    }

    #[test]
    fn test_due_learning_card_preempts_new_cards() {
        let store = MemoryStore::default();
        let deck = deck_of(vec![new_card("a"), new_card("b"), new_card("c")]);
        let mut session = StudySession::start(deck, &store, t(), 10);

        // "a" comes back in one minute
        session.grade(Grade::Again, t()).unwrap();
        assert_eq!(current_front(&session), Some("b"));

        session.grade(Grade::Easy, t() + Duration::minutes(2)).unwrap();
        assert_eq!(current_front(&session), Some("a"));

        session.grade(Grade::Easy, t() + Duration::minutes(3)).unwrap();
        assert_eq!(current_front(&session), Some("c"));
    }

    #[test]
    fn test_pending_learning_shown_before_finishing() {
        let store = MemoryStore::default();
        let mut session = StudySession::start(deck_of(vec![new_card("a")]), &store, t(), 10);

        session.grade(Grade::Hard, t()).unwrap();
        // Not due for ten minutes, but nothing else is left
        assert_eq!(current_front(&session), Some("a"));

        let outcome = session.grade(Grade::Easy, t() + Duration::minutes(1)).unwrap();
        // Seen card with no interval yet: iv 1, ef 2.5
        assert_eq!(outcome.result.interval_days, Some(2));
        assert!(session.is_finished());
    }

    #[test]
    fn test_is_new_transitions_once() {
        let store = MemoryStore::default();
        let mut session = StudySession::start(deck_of(vec![new_card("a")]), &store, t(), 10);

        session.grade(Grade::Again, t()).unwrap();
        assert!(!session.deck().cards[0].is_new);
        assert_eq!(session.deck().cards[0].interval_days, None);
        assert_eq!(session.deck().cards[0].ease_factor, None);

        session.grade(Grade::Again, t()).unwrap();
        assert!(!session.deck().cards[0].is_new);
        // Second grade uses the review regime
        assert_eq!(session.deck().cards[0].interval_days, Some(0));
    }

    #[test]
    fn test_stats_receive_elapsed_time() {
        let store = MemoryStore::default();
        let stats = MemoryStats::default();
        let deck = deck_of(vec![new_card("a"), new_card("b")]);
        let mut session = StudySession::start(deck, &store, t(), 10).with_stats(&stats);

        session.grade(Grade::Easy, t() + Duration::seconds(8)).unwrap();
        session.grade(Grade::Easy, t() + Duration::seconds(20)).unwrap();

        assert_eq!(
            *stats.records.borrow(),
            vec![(1, Duration::seconds(8)), (1, Duration::seconds(12))]
        );
    }

    #[test]
    fn test_stats_failure_does_not_stop_session() {
        let store = MemoryStore::default();
        let stats = MemoryStats {
            fail: true,
            ..Default::default()
        };
        let deck = deck_of(vec![new_card("a"), new_card("b")]);
        let mut session = StudySession::start(deck, &store, t(), 10).with_stats(&stats);

        session.grade(Grade::Easy, t()).unwrap();
        assert_eq!(current_front(&session), Some("b"));
    }
}
