use std::sync::{Arc, Mutex};
use std::time::Duration;

use rocket::serde::json::serde_json::json;

use super::{
    ElectionServices, EncryptedResults, EncryptedVote, GatewayError, GatewayResult,
    IdentityStatus, Receipt, Tally,
};

/// A call received by [`ScriptedServices`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    VerifyIdentity(String),
    EncryptVote(u32, String),
    SubmitVote {
        wallet_address: String,
        encrypted_vote: String,
        election_id: String,
    },
    RegisterIdentity {
        name: String,
        private_key_hex: String,
    },
    FetchEncryptedResults,
    DecryptResults(Vec<String>),
}

struct Script {
    identity: GatewayResult<IdentityStatus>,
    identity_delay: Duration,
    encryption: GatewayResult<()>,
    submission: GatewayResult<Receipt>,
    submission_delay: Duration,
    registration: GatewayResult<Receipt>,
    encrypted_results: GatewayResult<EncryptedResults>,
    tally: GatewayResult<Tally>,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            identity: Ok(IdentityStatus {
                is_verified: true,
                ens_name: "alice.eth".to_string(),
                registration_time: 1_700_000_000,
            }),
            identity_delay: Duration::ZERO,
            encryption: Ok(()),
            submission: Ok(json!({ "txHash": "0xfeed", "blockNumber": 7 })),
            submission_delay: Duration::ZERO,
            registration: Ok(json!({ "ok": true, "ensName": "alice.eth" })),
            encrypted_results: Ok(EncryptedResults {
                encrypted_results: vec!["ct-a".to_string(), "ct-b".to_string()],
            }),
            tally: Ok(json!({ "decryptedResults": [523, 412, 312], "success": true })),
        }
    }
}

/// Stand-in for the remote services: answers from a script and records
/// every call. Clones share the script and the call log.
#[derive(Clone, Default)]
pub struct ScriptedServices {
    script: Arc<Mutex<Script>>,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl ScriptedServices {
    pub fn set_identity(&self, result: GatewayResult<IdentityStatus>) {
        self.script.lock().unwrap().identity = result;
    }

    pub fn delay_identity(&self, delay: Duration) {
        self.script.lock().unwrap().identity_delay = delay;
    }

    pub fn fail_encryption(&self, err: GatewayError) {
        self.script.lock().unwrap().encryption = Err(err);
    }

    pub fn set_submission(&self, result: GatewayResult<Receipt>) {
        self.script.lock().unwrap().submission = result;
    }

    pub fn delay_submission(&self, delay: Duration) {
        self.script.lock().unwrap().submission_delay = delay;
    }

    pub fn set_registration(&self, result: GatewayResult<Receipt>) {
        self.script.lock().unwrap().registration = result;
    }

    pub fn set_encrypted_results(&self, result: GatewayResult<EncryptedResults>) {
        self.script.lock().unwrap().encrypted_results = result;
    }

    pub fn set_tally(&self, result: GatewayResult<Tally>) {
        self.script.lock().unwrap().tally = result;
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of ledger submissions received so far.
    pub fn submissions(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::SubmitVote { .. }))
            .count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[rocket::async_trait]
impl ElectionServices for ScriptedServices {
    async fn verify_identity(&self, wallet_address: &str) -> GatewayResult<IdentityStatus> {
        self.record(Call::VerifyIdentity(wallet_address.to_string()));
        let (result, delay) = {
            let script = self.script.lock().unwrap();
            (script.identity.clone(), script.identity_delay)
        };
        rocket::tokio::time::sleep(delay).await;
        result
    }

    async fn encrypt_vote(
        &self,
        candidate_index: u32,
        election_id: &str,
    ) -> GatewayResult<EncryptedVote> {
        self.record(Call::EncryptVote(candidate_index, election_id.to_string()));
        let result = self.script.lock().unwrap().encryption.clone();
        result.map(|_| EncryptedVote {
            encrypted_vote: format!("fhe_{election_id}_{candidate_index}"),
        })
    }

    async fn submit_vote(
        &self,
        wallet_address: &str,
        encrypted_vote: &str,
        election_id: &str,
    ) -> GatewayResult<Receipt> {
        self.record(Call::SubmitVote {
            wallet_address: wallet_address.to_string(),
            encrypted_vote: encrypted_vote.to_string(),
            election_id: election_id.to_string(),
        });
        let (result, delay) = {
            let script = self.script.lock().unwrap();
            (script.submission.clone(), script.submission_delay)
        };
        rocket::tokio::time::sleep(delay).await;
        result
    }

    async fn register_identity_with_key(
        &self,
        name: &str,
        private_key_hex: &str,
    ) -> GatewayResult<Receipt> {
        self.record(Call::RegisterIdentity {
            name: name.to_string(),
            private_key_hex: private_key_hex.to_string(),
        });
        self.script.lock().unwrap().registration.clone()
    }

    async fn fetch_encrypted_results(&self) -> GatewayResult<EncryptedResults> {
        self.record(Call::FetchEncryptedResults);
        self.script.lock().unwrap().encrypted_results.clone()
    }

    async fn decrypt_results(&self, encrypted_results: &[String]) -> GatewayResult<Tally> {
        self.record(Call::DecryptResults(encrypted_results.to_vec()));
        self.script.lock().unwrap().tally.clone()
    }
}
