//! Strongly-typed identifiers used across the domain.
//!
//! The record store assigns opaque string identifiers, so ids are
//! string-backed rather than parsed UUIDs. Newly minted ids use UUIDv7
//! (time-ordered) rendered as strings.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(String);

/// Identifier of a trainer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrainerId(String);

/// Identifier of a session type (reference data).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionTypeId(String);

/// Identifier of a check-in event (assigned by the store).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CheckInId(String);

macro_rules! impl_id_newtype {
    ($t:ty) => {
        impl $t {
            /// Mint a new identifier.
            ///
            /// Uses UUIDv7 (time-ordered). Prefer passing ids explicitly in
            /// tests for determinism.
            pub fn new() -> Self {
                Self(Uuid::now_v7().to_string())
            }

            /// Wrap a raw identifier as handed out by the record store.
            pub fn from_raw(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Whether the identifier is blank (empty or whitespace-only).
            ///
            /// Raw selections arrive as strings from the presentation layer;
            /// a blank selection is never a valid reference.
            pub fn is_blank(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<String> for $t {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $t {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<$t> for String {
            fn from(value: $t) -> Self {
                value.0
            }
        }
    };
}

impl_id_newtype!(ClientId);
impl_id_newtype!(TrainerId);
impl_id_newtype!(SessionTypeId);
impl_id_newtype!(CheckInId);
