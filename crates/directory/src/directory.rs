use std::sync::RwLock;
use std::time::Duration;

use chrono::Utc;
use thiserror::Error;

use traindesk_core::{ClientId, DomainError, TrainerId};
use traindesk_store::{bounded, collections, RecordStore, StoreError, StoredRecord};

use crate::records::{Client, NewClient, SessionType, Trainer};

/// Default deadline applied to every directory store call.
const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Directory operation error.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Malformed input to client creation; recoverable, surfaced to the
    /// caller for correction.
    #[error(transparent)]
    Validation(#[from] DomainError),

    /// The record store failed or timed out.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A stored row did not decode into its typed record.
    #[error("malformed {collection} record: {message}")]
    Malformed { collection: String, message: String },
}

/// Point-in-time view of the directory collections.
///
/// Pure data; all lookups on it are side-effect free. It is a cache, not a
/// source of truth — concurrent decisions (the ledger's balance check) must
/// re-read the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirectorySnapshot {
    pub clients: Vec<Client>,
    pub trainers: Vec<Trainer>,
    pub session_types: Vec<SessionType>,
}

impl DirectorySnapshot {
    /// Case-insensitive substring match on client name.
    ///
    /// The empty query matches every client.
    pub fn search(&self, query: &str) -> Vec<Client> {
        let needle = query.to_lowercase();
        self.clients
            .iter()
            .filter(|c| c.name.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    pub fn client(&self, id: &ClientId) -> Option<&Client> {
        self.clients.iter().find(|c| &c.id == id)
    }

    pub fn trainer(&self, id: &TrainerId) -> Option<&Trainer> {
        self.trainers.iter().find(|t| &t.id == id)
    }

    /// Resolve a client id to its display name, falling back to the raw id.
    ///
    /// The fallback is cosmetic degradation, never an error.
    pub fn client_name(&self, id: &ClientId) -> String {
        self.client(id)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    /// Resolve a trainer id to its display name, falling back to the raw id.
    pub fn trainer_name(&self, id: &TrainerId) -> String {
        self.trainer(id)
            .map(|t| t.name.clone())
            .unwrap_or_else(|| id.to_string())
    }
}

/// The client directory: snapshot reads plus client creation.
///
/// The snapshot is loaded once at startup and replaced only by explicit
/// [`ClientDirectory::refresh`]; callers refresh after a successful check-in
/// so subsequent admissibility checks see the updated balance.
#[derive(Debug)]
pub struct ClientDirectory<S> {
    store: S,
    store_timeout: Duration,
    snapshot: RwLock<DirectorySnapshot>,
}

impl<S> ClientDirectory<S>
where
    S: RecordStore,
{
    /// Wrap a store without loading anything; the snapshot starts empty.
    pub fn new(store: S) -> Self {
        Self::with_timeout(store, DEFAULT_STORE_TIMEOUT)
    }

    pub fn with_timeout(store: S, store_timeout: Duration) -> Self {
        Self {
            store,
            store_timeout,
            snapshot: RwLock::new(DirectorySnapshot::default()),
        }
    }

    /// Construct and load the initial snapshot in one step.
    pub async fn load(store: S) -> Result<Self, DirectoryError> {
        let directory = Self::new(store);
        directory.refresh().await?;
        Ok(directory)
    }

    /// Reload clients, trainers and session types from the store and swap
    /// the snapshot.
    pub async fn refresh(&self) -> Result<(), DirectoryError> {
        let clients = self.fetch_all::<Client>(collections::CLIENTS).await?;
        let trainers = self.fetch_all::<Trainer>(collections::TRAINERS).await?;
        let session_types = self
            .fetch_all::<SessionType>(collections::SESSION_TYPES)
            .await?;

        tracing::info!(
            clients = clients.len(),
            trainers = trainers.len(),
            session_types = session_types.len(),
            "directory snapshot refreshed"
        );

        let mut snapshot = self.snapshot.write().unwrap_or_else(|e| e.into_inner());
        *snapshot = DirectorySnapshot {
            clients,
            trainers,
            session_types,
        };
        Ok(())
    }

    /// All known clients, in the order the store returned them.
    pub fn list_clients(&self) -> Vec<Client> {
        self.read_snapshot().clients
    }

    /// Case-insensitive substring search against the snapshot.
    pub fn search(&self, query: &str) -> Vec<Client> {
        self.read_snapshot().search(query)
    }

    pub fn client(&self, id: &ClientId) -> Option<Client> {
        self.read_snapshot().client(id).cloned()
    }

    pub fn trainers(&self) -> Vec<Trainer> {
        self.read_snapshot().trainers
    }

    pub fn session_types(&self) -> Vec<SessionType> {
        self.read_snapshot().session_types
    }

    pub fn client_name(&self, id: &ClientId) -> String {
        self.read_snapshot().client_name(id)
    }

    pub fn trainer_name(&self, id: &TrainerId) -> String {
        self.read_snapshot().trainer_name(id)
    }

    /// A clone of the current snapshot (point-in-time view).
    pub fn snapshot(&self) -> DirectorySnapshot {
        self.read_snapshot()
    }

    /// Validate and persist a new client.
    ///
    /// The store assigns the id; `created_at` is set here. The snapshot is
    /// not touched — it changes only through [`refresh`](Self::refresh).
    pub async fn create_client(&self, new_client: NewClient) -> Result<Client, DirectoryError> {
        new_client.validate()?;

        let row = serde_json::json!({
            "name": new_client.name,
            "remaining_sessions": new_client.remaining_sessions,
            "session_type": new_client.session_type,
            "partner_name": new_client.partner_name,
            "created_at": Utc::now(),
        });

        let stored = bounded(
            self.store_timeout,
            self.store.insert(collections::CLIENTS, row),
        )
        .await?;

        let client = decode::<Client>(collections::CLIENTS, &stored)?;
        tracing::debug!(client_id = %client.id, "client created");
        Ok(client)
    }

    async fn fetch_all<T: serde::de::DeserializeOwned>(
        &self,
        collection: &str,
    ) -> Result<Vec<T>, DirectoryError> {
        let rows = bounded(self.store_timeout, self.store.select(collection, &[])).await?;
        rows.iter().map(|r| decode::<T>(collection, r)).collect()
    }

    fn read_snapshot(&self) -> DirectorySnapshot {
        self.snapshot
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

fn decode<T: serde::de::DeserializeOwned>(
    collection: &str,
    record: &StoredRecord,
) -> Result<T, DirectoryError> {
    record.decode().map_err(|e| DirectoryError::Malformed {
        collection: collection.to_string(),
        message: e.to_string(),
    })
}
