//! The record store contract.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::filter::Condition;
use crate::record::StoredRecord;

/// Record store operation error.
///
/// These are **infrastructure errors** (transport, timeouts, rejected
/// writes) as opposed to domain errors (validation, admissibility).
#[derive(Debug, Error)]
pub enum StoreError {
    /// Transport failure or timed-out call. Retryable, with backoff at the
    /// caller's discretion.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The store refused a write (insert or update).
    #[error("write rejected: {0}")]
    Rejected(String),

    /// `update` targeted a record that does not exist.
    #[error("record not found: {collection}/{id}")]
    NotFound { collection: String, id: String },
}

/// Async adapter over the backing record store.
///
/// Three collections are in play (see [`crate::record::collections`]):
/// clients (mutable balances), trainers and session types (read-only
/// reference data), check-ins (append-only audit trail).
///
/// Implementations must:
/// - treat `select` as read-only (no visible side effects)
/// - assign an `id` to inserted rows and return the stored row
/// - apply `update` patches to a single row addressed by `id`
///
/// Calls are asynchronous and may suspend; callers must not assume
/// intermediate state is visible to other concurrent actors.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch rows from a collection matching all conditions (AND).
    async fn select(
        &self,
        collection: &str,
        conditions: &[Condition],
    ) -> Result<Vec<StoredRecord>, StoreError>;

    /// Persist a new row; the store assigns its `id`.
    async fn insert(
        &self,
        collection: &str,
        fields: JsonValue,
    ) -> Result<StoredRecord, StoreError>;

    /// Patch an existing row by `id` (shallow field merge).
    async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: JsonValue,
    ) -> Result<StoredRecord, StoreError>;
}

#[async_trait]
impl<S> RecordStore for Arc<S>
where
    S: RecordStore + ?Sized,
{
    async fn select(
        &self,
        collection: &str,
        conditions: &[Condition],
    ) -> Result<Vec<StoredRecord>, StoreError> {
        (**self).select(collection, conditions).await
    }

    async fn insert(
        &self,
        collection: &str,
        fields: JsonValue,
    ) -> Result<StoredRecord, StoreError> {
        (**self).insert(collection, fields).await
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: JsonValue,
    ) -> Result<StoredRecord, StoreError> {
        (**self).update(collection, id, patch).await
    }
}

/// Bound a store call with a deadline.
///
/// An elapsed deadline surfaces as the retryable [`StoreError::Unavailable`];
/// no store call in this system runs unbounded.
pub async fn bounded<T, F>(limit: Duration, call: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Unavailable(format!(
            "store call exceeded {}ms",
            limit.as_millis()
        ))),
    }
}
