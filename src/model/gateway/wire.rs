use rocket::serde::json::Value;
use serde::{Deserialize, Serialize};

/// An opaque ledger receipt, passed to the caller uninterpreted.
pub type Receipt = Value;

/// An opaque decrypted tally, passed to the caller uninterpreted.
pub type Tally = Value;

/// Identity verification status of a wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityStatus {
    pub is_verified: bool,
    #[serde(default)]
    pub ens_name: String,
    #[serde(default)]
    pub registration_time: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedVote {
    pub encrypted_vote: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedResults {
    pub encrypted_results: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct EncryptVoteRequest<'a> {
    pub candidate_index: u32,
    pub election_id: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SubmitVoteRequest<'a> {
    pub election_id: &'a str,
    pub encrypted_vote: &'a str,
    pub wallet_address: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RegisterIdentityRequest<'a> {
    pub ens_name: &'a str,
    pub private_key: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct DecryptResultsRequest<'a> {
    pub encrypted_results: &'a [String],
}
