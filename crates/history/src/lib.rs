//! History query engine.
//!
//! Read-only, filtered views over the append-only check-in audit trail.
//! Filters compile into record-store conditions; the engine imposes no
//! ordering of its own (callers sort for display).

pub mod query;

pub use query::{HistoryError, HistoryFilter, HistoryQuery};
