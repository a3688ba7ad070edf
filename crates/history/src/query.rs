use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use traindesk_core::{ClientId, TrainerId};
use traindesk_ledger::CheckInEvent;
use traindesk_store::{bounded, collections, Condition, RecordStore, StoreError};

/// Default deadline applied to every history store call.
const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Filter criteria for history queries.
///
/// Each present field narrows the result set; absent fields impose no
/// constraint. All supplied constraints combine with logical AND, so the
/// empty filter returns the full audit trail.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryFilter {
    /// Exact match on the client reference (optional).
    pub client_id: Option<ClientId>,
    /// Exact match on the trainer reference (optional).
    pub trainer_id: Option<TrainerId>,
    /// Event timestamp >= start, inclusive (optional).
    pub start: Option<DateTime<Utc>>,
    /// Event timestamp <= end, inclusive (optional).
    pub end: Option<DateTime<Utc>>,
}

impl HistoryFilter {
    /// Compile the filter into store conditions.
    pub fn to_conditions(&self) -> Vec<Condition> {
        let mut conditions = Vec::new();
        if let Some(client_id) = &self.client_id {
            conditions.push(Condition::eq("client_id", client_id.as_str()));
        }
        if let Some(trainer_id) = &self.trainer_id {
            conditions.push(Condition::eq("trainer_id", trainer_id.as_str()));
        }
        if let Some(start) = &self.start {
            conditions.push(Condition::gte("timestamp", serde_json::json!(start)));
        }
        if let Some(end) = &self.end {
            conditions.push(Condition::lte("timestamp", serde_json::json!(end)));
        }
        conditions
    }
}

/// History query error.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A stored audit row did not decode into a [`CheckInEvent`].
    #[error("malformed check_ins record: {0}")]
    Malformed(String),
}

/// Read-only query engine over the audit trail.
#[derive(Debug)]
pub struct HistoryQuery<S> {
    store: S,
    store_timeout: Duration,
}

impl<S> HistoryQuery<S>
where
    S: RecordStore,
{
    pub fn new(store: S) -> Self {
        Self::with_timeout(store, DEFAULT_STORE_TIMEOUT)
    }

    pub fn with_timeout(store: S, store_timeout: Duration) -> Self {
        Self {
            store,
            store_timeout,
        }
    }

    /// Fetch the check-in events matching the filter.
    ///
    /// Result order is whatever the store returned; no implicit ordering
    /// guarantee is made here.
    pub async fn query(&self, filter: &HistoryFilter) -> Result<Vec<CheckInEvent>, HistoryError> {
        let conditions = filter.to_conditions();
        let rows = bounded(
            self.store_timeout,
            self.store.select(collections::CHECK_INS, &conditions),
        )
        .await?;

        tracing::debug!(
            conditions = conditions.len(),
            hits = rows.len(),
            "history query executed"
        );

        rows.iter()
            .map(|row| row.decode().map_err(|e| HistoryError::Malformed(e.to_string())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use traindesk_store::InMemoryRecordStore;

    async fn seeded_store() -> Arc<InMemoryRecordStore> {
        let store = Arc::new(InMemoryRecordStore::new());
        let rows = [
            ("e1", "c1", "t1", "1on1", "2026-03-01T10:00:00Z"),
            ("e2", "c1", "t2", "partner", "2026-03-05T18:30:00Z"),
            ("e3", "c2", "t1", "1on1", "2026-03-10T09:15:00Z"),
            ("e4", "c2", "t2", "3plus", "2026-04-01T07:45:00Z"),
        ];
        for (id, client, trainer, session_type, timestamp) in rows {
            store
                .insert(
                    collections::CHECK_INS,
                    json!({
                        "id": id,
                        "client_id": client,
                        "trainer_id": trainer,
                        "session_type": session_type,
                        "timestamp": timestamp,
                    }),
                )
                .await
                .unwrap();
        }
        store
    }

    fn ids(events: &[CheckInEvent]) -> Vec<&str> {
        events.iter().map(|e| e.id.as_str()).collect()
    }

    #[tokio::test]
    async fn empty_filter_returns_the_full_trail() {
        let history = HistoryQuery::new(seeded_store().await);
        let events = history.query(&HistoryFilter::default()).await.unwrap();
        assert_eq!(events.len(), 4);
    }

    #[tokio::test]
    async fn client_filter_returns_only_that_clients_events() {
        let history = HistoryQuery::new(seeded_store().await);
        let events = history
            .query(&HistoryFilter {
                client_id: Some(ClientId::from_raw("c1")),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(ids(&events), vec!["e1", "e2"]);
        assert!(events.iter().all(|e| e.client_id == ClientId::from_raw("c1")));
    }

    #[tokio::test]
    async fn trainer_filter_matches_exactly() {
        let history = HistoryQuery::new(seeded_store().await);
        let events = history
            .query(&HistoryFilter {
                trainer_id: Some(TrainerId::from_raw("t2")),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(ids(&events), vec!["e2", "e4"]);
    }

    #[tokio::test]
    async fn date_bounds_are_inclusive_on_both_ends() {
        let history = HistoryQuery::new(seeded_store().await);
        let events = history
            .query(&HistoryFilter {
                start: Some("2026-03-05T18:30:00Z".parse().unwrap()),
                end: Some("2026-03-10T09:15:00Z".parse().unwrap()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(ids(&events), vec!["e2", "e3"]);
    }

    #[tokio::test]
    async fn all_constraints_combine_with_and() {
        let history = HistoryQuery::new(seeded_store().await);
        let events = history
            .query(&HistoryFilter {
                client_id: Some(ClientId::from_raw("c2")),
                trainer_id: Some(TrainerId::from_raw("t1")),
                start: Some("2026-03-01T00:00:00Z".parse().unwrap()),
                end: Some("2026-03-31T23:59:59Z".parse().unwrap()),
            })
            .await
            .unwrap();
        assert_eq!(ids(&events), vec!["e3"]);
    }

    #[tokio::test]
    async fn no_matches_is_an_empty_result_not_an_error() {
        let history = HistoryQuery::new(seeded_store().await);
        let events = history
            .query(&HistoryFilter {
                client_id: Some(ClientId::from_raw("ghost")),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(events.is_empty());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;
        use traindesk_store::filter::matches_all;

        fn event_row(client: u8, trainer: u8, day: u8) -> serde_json::Value {
            json!({
                "id": format!("e-{client}-{trainer}-{day}"),
                "client_id": format!("c{client}"),
                "trainer_id": format!("t{trainer}"),
                "session_type": "1on1",
                "timestamp": format!("2026-03-{:02}T12:00:00Z", day),
            })
        }

        proptest! {
            /// A client constraint only ever narrows the result set, and
            /// every surviving row carries that client reference.
            #[test]
            fn client_filter_selects_a_subset(
                rows in prop::collection::vec((0u8..4, 0u8..3, 1u8..28), 0..30),
                wanted in 0u8..4,
            ) {
                let rows: Vec<_> = rows
                    .iter()
                    .map(|(c, t, d)| event_row(*c, *t, *d))
                    .collect();

                let filter = HistoryFilter {
                    client_id: Some(ClientId::from_raw(format!("c{wanted}"))),
                    ..Default::default()
                };
                let conditions = filter.to_conditions();

                let hits: Vec<_> = rows.iter().filter(|r| matches_all(&conditions, r)).collect();
                prop_assert!(hits.len() <= rows.len());
                for hit in hits {
                    prop_assert_eq!(&hit["client_id"], &json!(format!("c{wanted}")));
                }
            }

            /// Date bounds keep exactly the rows inside the window.
            #[test]
            fn date_window_is_inclusive(
                days in prop::collection::vec(1u8..28, 0..30),
                lo in 1u8..28,
                hi in 1u8..28,
            ) {
                let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
                let rows: Vec<_> = days.iter().map(|d| event_row(0, 0, *d)).collect();

                let filter = HistoryFilter {
                    start: Some(format!("2026-03-{lo:02}T12:00:00Z").parse().unwrap()),
                    end: Some(format!("2026-03-{hi:02}T12:00:00Z").parse().unwrap()),
                    ..Default::default()
                };
                let conditions = filter.to_conditions();

                let expected = days.iter().filter(|d| **d >= lo && **d <= hi).count();
                let hits = rows.iter().filter(|r| matches_all(&conditions, r)).count();
                prop_assert_eq!(hits, expected);
            }
        }
    }

    mod pipeline {
        use super::*;
        use std::sync::Arc;
        use traindesk_directory::ClientDirectory;
        use traindesk_ledger::{CheckInLedger, CheckInRequest};

        #[tokio::test]
        async fn ledger_writes_are_visible_through_the_history_engine() {
            let store = Arc::new(InMemoryRecordStore::new());
            store
                .insert(
                    collections::CLIENTS,
                    json!({
                        "id": "c1",
                        "name": "Ana Smith",
                        "remaining_sessions": 2,
                        "session_type": "1on1",
                        "partner_name": null,
                        "created_at": "2026-01-05T09:00:00Z",
                    }),
                )
                .await
                .unwrap();

            let directory = Arc::new(ClientDirectory::load(store.clone()).await.unwrap());
            let ledger = CheckInLedger::new(store.clone(), directory.clone());
            let history = HistoryQuery::new(store.clone());

            let first = ledger
                .check_in(CheckInRequest::new("c1", "t1", "1on1"))
                .await
                .unwrap();
            directory.refresh().await.unwrap();
            let second = ledger
                .check_in(CheckInRequest::new("c1", "t2", "1on1"))
                .await
                .unwrap();

            let all = history.query(&HistoryFilter::default()).await.unwrap();
            assert_eq!(all.len(), 2);

            let by_trainer = history
                .query(&HistoryFilter {
                    trainer_id: Some(TrainerId::from_raw("t2")),
                    ..Default::default()
                })
                .await
                .unwrap();
            assert_eq!(by_trainer, vec![second.clone()]);

            // Name resolution degrades to the raw id for unknown trainers.
            assert_eq!(directory.trainer_name(&first.trainer_id), "t1");
        }
    }
}
