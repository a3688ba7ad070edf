//! Rows and collection names.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Collection names known to the system.
pub mod collections {
    pub const CLIENTS: &str = "clients";
    pub const TRAINERS: &str = "trainers";
    pub const SESSION_TYPES: &str = "session_types";
    pub const CHECK_INS: &str = "check_ins";
}

/// A row persisted in a collection.
///
/// `fields` is always a JSON object and always contains the `id` field; the
/// store assigns `id` during insert. Typed record structs deserialize
/// directly from `fields` via serde.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: String,
    pub fields: JsonValue,
}

impl StoredRecord {
    /// Look up a single field by name.
    pub fn field(&self, name: &str) -> Option<&JsonValue> {
        self.fields.get(name)
    }

    /// Deserialize the row into a typed record.
    pub fn decode<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.fields.clone())
    }
}
