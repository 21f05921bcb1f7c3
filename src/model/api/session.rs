use serde::{Deserialize, Serialize};

use crate::model::{db::Voter, gateway::IdentityStatus};

/// Public view of a voter's wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletView {
    pub address: String,
}

/// Public view of a voter. Contains no credential or key material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterView {
    pub id: String,
    pub email: String,
    pub wallet: WalletView,
}

impl From<&Voter> for VoterView {
    fn from(voter: &Voter) -> Self {
        Self {
            id: voter.id.clone(),
            email: voter.id.clone(),
            wallet: WalletView {
                address: voter.wallet_address.clone(),
            },
        }
    }
}

/// Response to a successful registration or login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub voter: VoterView,
    pub token: String,
}

/// The authenticated voter plus their on-chain identity status, when it
/// could be fetched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelfView {
    pub voter: VoterView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<IdentityStatus>,
}
