use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use traindesk_core::{ClientId, DomainError, DomainResult, SessionTypeId, TrainerId};

/// A client and their current session balance.
///
/// Field names mirror the `clients` collection exactly; the struct
/// round-trips through the record store via serde.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    pub name: String,
    /// Sessions left to redeem. Never negative; mutated only by the
    /// check-in ledger (decrement) and client creation (initial value).
    pub remaining_sessions: i64,
    pub session_type: String,
    #[serde(default)]
    pub partner_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Client {
    /// Invariant helper: whether this client may redeem a session.
    pub fn has_sessions_remaining(&self) -> bool {
        self.remaining_sessions > 0
    }
}

/// A trainer. Read-only reference data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trainer {
    pub id: TrainerId,
    pub name: String,
}

/// A session type label. Read-only reference data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionType {
    pub id: SessionTypeId,
    pub name: String,
}

/// Input for client creation (id and creation time are assigned on persist).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewClient {
    pub name: String,
    pub session_type: String,
    pub remaining_sessions: i64,
    pub partner_name: Option<String>,
}

impl NewClient {
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if self.session_type.trim().is_empty() {
            return Err(DomainError::validation("session type cannot be empty"));
        }
        if self.remaining_sessions < 0 {
            return Err(DomainError::validation(
                "remaining sessions cannot be negative",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_new_client() -> NewClient {
        NewClient {
            name: "Ana Smith".to_string(),
            session_type: "1on1".to_string(),
            remaining_sessions: 5,
            partner_name: None,
        }
    }

    #[test]
    fn validate_accepts_well_formed_input() {
        assert!(valid_new_client().validate().is_ok());
    }

    #[test]
    fn validate_rejects_blank_name() {
        let mut new_client = valid_new_client();
        new_client.name = "   ".to_string();
        match new_client.validate().unwrap_err() {
            DomainError::Validation(_) => {}
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn validate_rejects_blank_session_type() {
        let mut new_client = valid_new_client();
        new_client.session_type = String::new();
        assert!(matches!(
            new_client.validate(),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn validate_rejects_negative_session_count() {
        let mut new_client = valid_new_client();
        new_client.remaining_sessions = -1;
        assert!(matches!(
            new_client.validate(),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn zero_sessions_is_a_valid_initial_balance() {
        let mut new_client = valid_new_client();
        new_client.remaining_sessions = 0;
        assert!(new_client.validate().is_ok());
    }

    #[test]
    fn client_row_round_trips_through_serde() {
        let client = Client {
            id: ClientId::from_raw("c1"),
            name: "Ana Smith".to_string(),
            remaining_sessions: 3,
            session_type: "partner".to_string(),
            partner_name: Some("Ben Smith".to_string()),
            created_at: Utc::now(),
        };
        let row = serde_json::to_value(&client).unwrap();
        assert_eq!(row["id"], serde_json::json!("c1"));
        assert_eq!(row["remaining_sessions"], serde_json::json!(3));
        let back: Client = serde_json::from_value(row).unwrap();
        assert_eq!(back, client);
    }
}
