pub mod cards;
pub mod deck;
pub mod decks;
pub mod stats;
pub mod study;
