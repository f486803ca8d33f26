//! Generation history — append-only, capped, JSON-persisted.

pub mod store;

pub use store::{HistoryError, HistoryRecord, HistoryStore, DEFAULT_MAX_ENTRIES};
