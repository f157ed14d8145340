//! Daily study statistics

pub mod models;
pub mod storage;

pub use models::*;
pub use storage::{StatsError, StatsRecorder, StatsStorage};
