use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

/// Proof that a voter's ballot for an election reached the ledger.
///
/// At most one exists per `(voter_id, election_id)`; the store enforces this
/// with a unique index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub voter_id: String,
    pub election_id: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub recorded_at: DateTime<Utc>,
}

impl VoteRecord {
    pub fn new(voter_id: &str, election_id: &str) -> Self {
        Self {
            voter_id: voter_id.to_string(),
            election_id: election_id.to_string(),
            recorded_at: Utc::now(),
        }
    }
}
