//! Client directory module.
//!
//! Holds the point-in-time snapshot of clients, trainers and session types,
//! client creation with validation, and the snapshot-only lookups (search,
//! display-name resolution) the rest of the system reads from.

pub mod directory;
pub mod records;

pub use directory::{ClientDirectory, DirectoryError, DirectorySnapshot};
pub use records::{Client, NewClient, SessionType, Trainer};
