//! `traindesk-store` — generic record store adapter.
//!
//! The backing data store is an external collaborator; this crate pins down
//! the contract the rest of the system relies on: named collections of JSON
//! rows, filter predicates (equality, range), and async
//! `select`/`insert`/`update` operations. An in-memory implementation is
//! provided for tests/dev; real backends implement [`RecordStore`].

pub mod adapter;
pub mod filter;
pub mod in_memory;
pub mod record;

pub use adapter::{bounded, RecordStore, StoreError};
pub use filter::{Condition, Op};
pub use in_memory::InMemoryRecordStore;
pub use record::{collections, StoredRecord};
