//! Check-in ledger module.
//!
//! Decides whether a check-in is admissible, performs the paired writes
//! (audit insert, then balance decrement) under a per-client serialization
//! lock, and reports the partial-write inconsistency distinctly instead of
//! swallowing it.

pub mod event;
pub mod ledger;
pub mod locks;

pub use event::{CheckInEvent, CheckInRequest};
pub use ledger::{CheckInError, CheckInLedger};
pub use locks::ClientLocks;
