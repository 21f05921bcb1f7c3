use serde::{Deserialize, Serialize};

use crate::model::gateway::Receipt;

/// A voter's choice in an election.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub election_id: String,
    pub candidate_index: u32,
}

/// Acknowledgement of a cast vote, carrying the ledger's receipt verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteReceipt {
    pub ok: bool,
    pub receipt: Receipt,
}

/// Request to bind a human-readable name to the voter's wallet.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityRequest {
    pub ens_name: String,
}
