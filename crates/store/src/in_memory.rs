//! In-memory record store.
//!
//! Intended for tests/dev. Not optimized for performance.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::adapter::{RecordStore, StoreError};
use crate::filter::{matches_all, Condition};
use crate::record::StoredRecord;

/// In-memory record store backed by one row vector per collection.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    collections: RwLock<HashMap<String, Vec<StoredRecord>>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows currently held in a collection (test helper).
    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .map(|map| map.get(collection).map(Vec::len).unwrap_or(0))
            .unwrap_or(0)
    }

    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn select(
        &self,
        collection: &str,
        conditions: &[Condition],
    ) -> Result<Vec<StoredRecord>, StoreError> {
        let map = self
            .collections
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;

        Ok(map
            .get(collection)
            .map(|rows| {
                rows.iter()
                    .filter(|r| matches_all(conditions, &r.fields))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn insert(
        &self,
        collection: &str,
        mut fields: JsonValue,
    ) -> Result<StoredRecord, StoreError> {
        let Some(object) = fields.as_object_mut() else {
            return Err(StoreError::Rejected("record must be a JSON object".to_string()));
        };

        // Honor a caller-supplied id (seeded fixtures); mint one otherwise.
        let id = match object.get("id").and_then(JsonValue::as_str) {
            Some(existing) if !existing.trim().is_empty() => existing.to_string(),
            _ => {
                let minted = Uuid::now_v7().to_string();
                object.insert("id".to_string(), JsonValue::String(minted.clone()));
                minted
            }
        };

        let record = StoredRecord { id, fields };

        let mut map = self
            .collections
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;
        map.entry(collection.to_string()).or_default().push(record.clone());

        tracing::trace!(collection, id = %record.id, "record inserted");
        Ok(record)
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: JsonValue,
    ) -> Result<StoredRecord, StoreError> {
        let Some(patch_object) = patch.as_object() else {
            return Err(StoreError::Rejected("patch must be a JSON object".to_string()));
        };

        let mut map = self
            .collections
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;

        let rows = map.get_mut(collection).ok_or_else(|| StoreError::NotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        })?;

        let record = rows
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;

        if let Some(fields) = record.fields.as_object_mut() {
            for (key, value) in patch_object {
                fields.insert(key.clone(), value.clone());
            }
        }

        Ok(record.clone())
    }
}
