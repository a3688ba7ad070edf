use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use traindesk_core::{CheckInId, ClientId, TrainerId};

/// An immutable audit record of one redeemed session.
///
/// Field names mirror the `check_ins` collection; rows are append-only and
/// never mutated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckInEvent {
    /// Assigned by the store on insert.
    pub id: CheckInId,
    pub client_id: ClientId,
    pub trainer_id: TrainerId,
    /// Display label of the session type at check-in time.
    pub session_type: String,
    /// Creation time; immutable.
    pub timestamp: DateTime<Utc>,
}

/// The three selections a check-in needs, passed explicitly rather than
/// read from ambient UI state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckInRequest {
    pub client_id: ClientId,
    pub trainer_id: TrainerId,
    pub session_type: String,
}

impl CheckInRequest {
    pub fn new(
        client_id: impl Into<ClientId>,
        trainer_id: impl Into<TrainerId>,
        session_type: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            trainer_id: trainer_id.into(),
            session_type: session_type.into(),
        }
    }

    /// Whether any of the three selections is blank.
    pub fn has_blank_selection(&self) -> bool {
        self.client_id.is_blank()
            || self.trainer_id.is_blank()
            || self.session_type.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_detection_covers_each_selection() {
        assert!(CheckInRequest::new("", "t1", "1on1").has_blank_selection());
        assert!(CheckInRequest::new("c1", " ", "1on1").has_blank_selection());
        assert!(CheckInRequest::new("c1", "t1", "").has_blank_selection());
        assert!(!CheckInRequest::new("c1", "t1", "1on1").has_blank_selection());
    }

    #[test]
    fn event_row_round_trips_through_serde() {
        let event = CheckInEvent {
            id: CheckInId::from_raw("e1"),
            client_id: ClientId::from_raw("c1"),
            trainer_id: TrainerId::from_raw("t1"),
            session_type: "partner".to_string(),
            timestamp: Utc::now(),
        };
        let row = serde_json::to_value(&event).unwrap();
        assert_eq!(row["client_id"], serde_json::json!("c1"));
        let back: CheckInEvent = serde_json::from_value(row).unwrap();
        assert_eq!(back, event);
    }
}
