use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use thiserror::Error;

use traindesk_core::ClientId;
use traindesk_directory::ClientDirectory;
use traindesk_store::{bounded, collections, RecordStore, StoreError};

use crate::event::{CheckInEvent, CheckInRequest};
use crate::locks::ClientLocks;

/// Default deadline applied to every ledger store call.
const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Check-in failure taxonomy.
///
/// Every variant is scoped to a single operation; none is fatal to the
/// process. The presentation layer decides user-visible messaging.
#[derive(Debug, Error)]
pub enum CheckInError {
    /// One of the three selections was blank. Nothing mutated.
    #[error("client, trainer and session type must all be selected")]
    MissingSelection,

    /// The selected client is not in the directory. Nothing mutated.
    #[error("unknown client: {0}")]
    UnknownClient(ClientId),

    /// The client's balance is already zero. Nothing mutated.
    #[error("client {0} has no sessions remaining")]
    NoSessionsRemaining(ClientId),

    /// The store rejected the audit insert. Nothing mutated; retryable.
    #[error("audit write failed")]
    AuditWriteFailed(#[source] StoreError),

    /// The audit event was recorded but the balance decrement failed.
    ///
    /// Not a success and not a clean failure: the embedded event exists in
    /// the store while the balance is stale. Surfaced distinctly so an
    /// operator can reconcile.
    #[error("check-in recorded but balance not decremented for client {client_id}")]
    PartialCheckIn {
        client_id: ClientId,
        /// The audit record that was persisted.
        event: CheckInEvent,
        #[source]
        source: StoreError,
    },

    /// Transport failure or timed-out store call. Retryable with backoff.
    #[error("record store unavailable")]
    StoreUnavailable(#[source] StoreError),
}

/// The check-in ledger.
///
/// Owns the only write path that decrements a client's session balance, and
/// guarantees each decrement is paired with exactly one audit record.
#[derive(Debug)]
pub struct CheckInLedger<S> {
    store: S,
    directory: Arc<ClientDirectory<S>>,
    locks: ClientLocks,
    store_timeout: Duration,
}

impl<S> CheckInLedger<S>
where
    S: RecordStore,
{
    pub fn new(store: S, directory: Arc<ClientDirectory<S>>) -> Self {
        Self::with_timeout(store, directory, DEFAULT_STORE_TIMEOUT)
    }

    pub fn with_timeout(
        store: S,
        directory: Arc<ClientDirectory<S>>,
        store_timeout: Duration,
    ) -> Self {
        Self {
            store,
            directory,
            locks: ClientLocks::new(),
            store_timeout,
        }
    }

    /// Validate and execute a check-in.
    ///
    /// Validation order: blank selections, client existence (snapshot),
    /// then the balance — re-read from the store inside the client's
    /// serialization lock, never taken from the snapshot. Execution order:
    /// audit insert first, decrement second, so a balance never changes
    /// without its audit record.
    ///
    /// On success the caller is expected to refresh the directory snapshot
    /// so subsequent admissibility checks see the updated balance.
    pub async fn check_in(&self, request: CheckInRequest) -> Result<CheckInEvent, CheckInError> {
        if request.has_blank_selection() {
            return Err(CheckInError::MissingSelection);
        }

        if self.directory.client(&request.client_id).is_none() {
            return Err(CheckInError::UnknownClient(request.client_id));
        }

        // Two concurrent check-ins for one client must not both observe the
        // same pre-decrement balance (lost update). Serialize here.
        let lock = self.locks.acquire(&request.client_id);
        let _guard = lock.lock().await;

        let remaining = self.current_balance(&request.client_id).await?;
        if remaining <= 0 {
            return Err(CheckInError::NoSessionsRemaining(request.client_id));
        }

        let event = self.record_event(&request).await?;

        match bounded(
            self.store_timeout,
            self.store.update(
                collections::CLIENTS,
                request.client_id.as_str(),
                json!({ "remaining_sessions": remaining - 1 }),
            ),
        )
        .await
        {
            Ok(_) => {
                tracing::info!(
                    client_id = %event.client_id,
                    trainer_id = %event.trainer_id,
                    session_type = %event.session_type,
                    remaining = remaining - 1,
                    "check-in recorded"
                );
                Ok(event)
            }
            Err(source) => {
                tracing::warn!(
                    client_id = %event.client_id,
                    check_in_id = %event.id,
                    error = %source,
                    "check-in recorded but balance not decremented"
                );
                Err(CheckInError::PartialCheckIn {
                    client_id: event.client_id.clone(),
                    event,
                    source,
                })
            }
        }
    }

    /// Authoritative balance, read from the store under the client lock.
    async fn current_balance(&self, client_id: &ClientId) -> Result<i64, CheckInError> {
        let rows = bounded(
            self.store_timeout,
            self.store.select(
                collections::CLIENTS,
                &[traindesk_store::Condition::eq("id", client_id.as_str())],
            ),
        )
        .await
        .map_err(CheckInError::StoreUnavailable)?;

        let Some(row) = rows.first() else {
            return Err(CheckInError::UnknownClient(client_id.clone()));
        };

        row.field("remaining_sessions")
            .and_then(serde_json::Value::as_i64)
            .ok_or_else(|| {
                CheckInError::StoreUnavailable(StoreError::Unavailable(format!(
                    "clients row {client_id} has no integer remaining_sessions"
                )))
            })
    }

    async fn record_event(&self, request: &CheckInRequest) -> Result<CheckInEvent, CheckInError> {
        let row = json!({
            "client_id": request.client_id,
            "trainer_id": request.trainer_id,
            "session_type": request.session_type,
            "timestamp": chrono::Utc::now(),
        });

        let stored = bounded(
            self.store_timeout,
            self.store.insert(collections::CHECK_INS, row),
        )
        .await
        .map_err(|e| match e {
            StoreError::Unavailable(_) => CheckInError::StoreUnavailable(e),
            other => CheckInError::AuditWriteFailed(other),
        })?;

        stored.decode().map_err(|e| {
            CheckInError::StoreUnavailable(StoreError::Unavailable(format!(
                "stored check_ins row did not decode: {e}"
            )))
        })
    }
}
