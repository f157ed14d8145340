//! Flashcard and spaced repetition system
//!
//! This module provides:
//! - Card and deck models
//! - SM-2 style scheduling policy
//! - Session queues (new, review, learning) and next-card selection
//! - Study sessions that grade, re-queue and save
//! - JSON deck storage

pub mod algorithm;
pub mod models;
pub mod queue;
pub mod selector;
pub mod session;
pub mod storage;

pub use models::*;
pub use queue::{QueueCounts, DEFAULT_MAX_NEW_CARDS};
pub use session::{GradeOutcome, SessionError, SessionState, StudySession};
pub use storage::{DeckStorage, DeckStorageError, DeckStore, DeckSummary};
