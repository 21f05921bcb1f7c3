//! Typed clients for the remote identity, encryption, ledger and results
//! services.
//!
//! Each call either yields its typed response or a [`GatewayError`]; callers
//! decide whether a failure blocks (fail closed) or is tolerated (fail open).

mod http;
#[cfg(test)]
mod scripted;
#[cfg(test)]
mod stub;
mod wire;

pub use http::{HttpServices, ServiceUrls};
#[cfg(test)]
pub use scripted::{Call, ScriptedServices};
#[cfg(test)]
pub use stub::{Reply, StubService};
pub use wire::{EncryptedResults, EncryptedVote, IdentityStatus, Receipt, Tally};

use thiserror::Error;

/// Why a remote call produced no usable response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("request timed out")]
    Timeout,
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("service responded with status {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            Self::Status(status.as_u16())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl GatewayError {
    /// A description safe to show to callers: no hosts, URLs or driver text.
    pub fn summary(&self) -> String {
        match self {
            Self::Timeout => "service timed out".to_string(),
            Self::Transport(_) => "service unreachable".to_string(),
            Self::Status(code) => format!("service responded with status {code}"),
            Self::Decode(_) => "service returned a malformed response".to_string(),
        }
    }
}

pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

/// The remote services the gateway orchestrates.
#[rocket::async_trait]
pub trait ElectionServices: Send + Sync {
    /// Look up whether a wallet's on-chain identity is verified.
    async fn verify_identity(&self, wallet_address: &str) -> GatewayResult<IdentityStatus>;

    /// Encrypt a ballot for the given election.
    async fn encrypt_vote(
        &self,
        candidate_index: u32,
        election_id: &str,
    ) -> GatewayResult<EncryptedVote>;

    /// Submit an encrypted ballot to the ledger, from the given wallet.
    async fn submit_vote(
        &self,
        wallet_address: &str,
        encrypted_vote: &str,
        election_id: &str,
    ) -> GatewayResult<Receipt>;

    /// Bind a human-readable name to the wallet owning `private_key_hex`.
    async fn register_identity_with_key(
        &self,
        name: &str,
        private_key_hex: &str,
    ) -> GatewayResult<Receipt>;

    /// Fetch the encrypted tally components from the ledger.
    async fn fetch_encrypted_results(&self) -> GatewayResult<EncryptedResults>;

    /// Decrypt and tally the given components.
    async fn decrypt_results(&self, encrypted_results: &[String]) -> GatewayResult<Tally>;
}
