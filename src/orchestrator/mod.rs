//! Sequencing of the inbound operations over storage, key custody and the
//! remote services.
//!
//! Casting a vote walks these stages in order, aborting at the first failure:
//!
//! ```text
//! Start -> VoterResolved -> DedupChecked -> IdentityChecked
//!       -> VoteEncrypted -> Submitted -> Committed
//! ```
//!
//! Nothing is persisted before `Submitted`. Once the ledger has accepted the
//! ballot the vote counts, even if recording it locally then fails.

mod locks;

pub use locks::VoteLocks;

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warn};
use rocket::tokio::time::timeout;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::model::{
    api::{Credentials, SelfView, Session, VoteReceipt, VoterView},
    auth::TokenService,
    db::Voter,
    gateway::{ElectionServices, GatewayError, GatewayResult, IdentityStatus, Receipt, Tally},
    storage::{Commit, VoteLedger, VoterDirectory},
    wallet::{secret_hex, KeyCustody},
};

/// Default bound on each remote call.
pub const DEFAULT_SERVICE_TIMEOUT: Duration = Duration::from_secs(10);

/// What to do when the identity check reaches no verdict (the call failed,
/// timed out, or returned something unreadable).
///
/// An explicit "not verified" answer blocks the vote under either policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdentityCheckPolicy {
    /// Proceed as if verified.
    #[default]
    FailOpen,
    /// Abort with `IdentityNotVerified`.
    FailClosed,
}

/// Progress of a single vote submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    VoterResolved,
    DedupChecked,
    IdentityChecked,
    VoteEncrypted,
    Submitted,
    Committed,
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::VoterResolved => "voter resolved",
            Self::DedupChecked => "dedup checked",
            Self::IdentityChecked => "identity checked",
            Self::VoteEncrypted => "vote encrypted",
            Self::Submitted => "submitted",
            Self::Committed => "committed",
        };
        write!(f, "{name}")
    }
}

/// The gateway's use cases: registration, login, casting votes, binding
/// identities and fetching results.
pub struct VoteOrchestrator {
    voters: Arc<dyn VoterDirectory>,
    votes: Arc<dyn VoteLedger>,
    services: Arc<dyn ElectionServices>,
    custody: KeyCustody,
    tokens: TokenService,
    identity_check: IdentityCheckPolicy,
    service_timeout: Duration,
    locks: VoteLocks,
}

impl VoteOrchestrator {
    pub fn new(
        voters: Arc<dyn VoterDirectory>,
        votes: Arc<dyn VoteLedger>,
        services: Arc<dyn ElectionServices>,
        custody: KeyCustody,
        tokens: TokenService,
    ) -> Self {
        Self {
            voters,
            votes,
            services,
            custody,
            tokens,
            identity_check: IdentityCheckPolicy::default(),
            service_timeout: DEFAULT_SERVICE_TIMEOUT,
            locks: VoteLocks::default(),
        }
    }

    pub fn with_identity_check(mut self, policy: IdentityCheckPolicy) -> Self {
        self.identity_check = policy;
        self
    }

    pub fn with_service_timeout(mut self, service_timeout: Duration) -> Self {
        self.service_timeout = service_timeout;
        self
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Register a new voter with a fresh wallet, and open a session for them.
    pub async fn register(&self, credentials: &Credentials) -> Result<Session> {
        credentials.validate_for_registration()?;

        let voter = Voter::register(credentials.email.trim(), &credentials.password, &self.custody)?;
        self.voters.create(&voter).await?;
        info!("Registered voter with wallet {}", voter.wallet_address);

        self.open_session(&voter)
    }

    /// Check a voter's credentials and open a session for them.
    ///
    /// An unknown email and a wrong password are indistinguishable.
    pub async fn login(&self, credentials: &Credentials) -> Result<Session> {
        let voter = self
            .voters
            .find(credentials.email.trim())
            .await?
            .filter(|voter| voter.verify_password(&credentials.password))
            .ok_or_else(|| Error::unauthenticated("invalid credentials"))?;

        self.open_session(&voter)
    }

    fn open_session(&self, voter: &Voter) -> Result<Session> {
        Ok(Session {
            voter: VoterView::from(voter),
            token: self.tokens.issue(&voter.id)?,
        })
    }

    /// Cast the voter's ballot in the given election, at most once.
    pub async fn submit_vote(
        &self,
        voter_id: &str,
        election_id: &str,
        candidate_index: u32,
    ) -> Result<VoteReceipt> {
        if election_id.trim().is_empty() {
            return Err(Error::invalid_request("election ID is required"));
        }

        let voter = self.resolve(voter_id).await?;
        self.trace(voter_id, election_id, Stage::VoterResolved);

        // Held until the vote is committed, so concurrent submissions for the
        // same pair cannot both get past the dedup check.
        let _guard = self.locks.acquire(voter_id, election_id).await;

        if self.votes.has_voted(voter_id, election_id).await? {
            return Err(Error::AlreadyVoted(election_id.to_string()));
        }
        self.trace(voter_id, election_id, Stage::DedupChecked);

        self.check_identity(&voter).await?;
        self.trace(voter_id, election_id, Stage::IdentityChecked);

        let encrypted = self
            .call(self.services.encrypt_vote(candidate_index, election_id))
            .await
            .map_err(|e| {
                warn!("Vote encryption failed for election {election_id}: {e}");
                Error::EncryptionUnavailable(e.summary())
            })?;
        self.trace(voter_id, election_id, Stage::VoteEncrypted);

        let receipt = self
            .call(self.services.submit_vote(
                &voter.wallet_address,
                &encrypted.encrypted_vote,
                election_id,
            ))
            .await
            .map_err(|e| {
                warn!("Ledger submission failed for election {election_id}: {e}");
                Error::LedgerSubmissionFailed(e.summary())
            })?;
        self.trace(voter_id, election_id, Stage::Submitted);

        // The ledger is the system of record from here on: a failed commit is
        // logged, not reported, and a repeated one is harmless.
        match self.votes.mark_voted(voter_id, election_id).await {
            Ok(Commit::Recorded) => {
                info!("Vote cast by {} in election {election_id}", voter.wallet_address);
                self.trace(voter_id, election_id, Stage::Committed);
            }
            Ok(Commit::AlreadyRecorded) => warn!(
                "Vote by {} in election {election_id} was already recorded",
                voter.wallet_address
            ),
            Err(e) => error!(
                "Vote by {} in election {election_id} reached the ledger but was not recorded: {e}",
                voter.wallet_address
            ),
        }

        Ok(VoteReceipt { ok: true, receipt })
    }

    /// Bind `name` to the voter's wallet on the ledger.
    ///
    /// The wallet secret is unsealed only for the duration of the call.
    pub async fn register_identity(&self, voter_id: &str, name: &str) -> Result<Receipt> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::invalid_request("identity name is required"));
        }

        let voter = self.resolve(voter_id).await?;
        let private_key_hex = {
            let secret = self.custody.open(&voter.wallet_key_sealed).map_err(|e| {
                error!("Could not unseal wallet {}: {e}", voter.wallet_address);
                Error::WalletUnavailable(voter.wallet_address.clone())
            })?;
            secret_hex(&secret)
        };

        self.call(
            self.services
                .register_identity_with_key(name, &private_key_hex),
        )
        .await
        .map_err(|e| {
            warn!("Identity registration failed for {}: {e}", voter.wallet_address);
            Error::IdentityRegistrationFailed(e.summary())
        })
    }

    /// Fetch the encrypted tally components and have them decrypted.
    ///
    /// The decrypted tally is returned exactly as the results service sent it.
    pub async fn get_results(&self) -> Result<Tally> {
        let encrypted = self
            .call(self.services.fetch_encrypted_results())
            .await
            .map_err(|e| {
                warn!("Fetching encrypted results failed: {e}");
                Error::ResultsUnavailable(e.summary())
            })?;

        self.call(self.services.decrypt_results(&encrypted.encrypted_results))
            .await
            .map_err(|e| {
                warn!("Decrypting results failed: {e}");
                Error::ResultsUnavailable(e.summary())
            })
    }

    /// The voter plus their identity status. A failed status lookup omits it.
    pub async fn get_self(&self, voter_id: &str) -> Result<SelfView> {
        let voter = self.resolve(voter_id).await?;
        let identity = match self
            .call(self.services.verify_identity(&voter.wallet_address))
            .await
        {
            Ok(status) => Some(status),
            Err(e) => {
                debug!("Identity status unavailable for {}: {e}", voter.wallet_address);
                None
            }
        };

        Ok(SelfView {
            voter: VoterView::from(&voter),
            identity,
        })
    }

    async fn resolve(&self, voter_id: &str) -> Result<Voter> {
        self.voters
            .find(voter_id)
            .await?
            .ok_or_else(|| Error::UnknownVoter(voter_id.to_string()))
    }

    /// Only an explicit negative answer blocks, unless the policy is fail-closed.
    async fn check_identity(&self, voter: &Voter) -> Result<()> {
        let verdict = self
            .call(self.services.verify_identity(&voter.wallet_address))
            .await;
        match (verdict, self.identity_check) {
            (Ok(IdentityStatus { is_verified: true, .. }), _) => Ok(()),
            (Ok(_), _) => Err(Error::IdentityNotVerified),
            (Err(e), IdentityCheckPolicy::FailOpen) => {
                warn!(
                    "Identity check for {} reached no verdict ({e}), proceeding",
                    voter.wallet_address
                );
                Ok(())
            }
            (Err(e), IdentityCheckPolicy::FailClosed) => {
                warn!(
                    "Identity check for {} reached no verdict ({e}), blocking",
                    voter.wallet_address
                );
                Err(Error::IdentityNotVerified)
            }
        }
    }

    /// Bound a remote call by the service timeout.
    async fn call<T>(&self, request: impl Future<Output = GatewayResult<T>>) -> GatewayResult<T> {
        timeout(self.service_timeout, request)
            .await
            .unwrap_or(Err(GatewayError::Timeout))
    }

    fn trace(&self, voter_id: &str, election_id: &str, stage: Stage) {
        debug!("Vote {voter_id}/{election_id}: {stage}");
    }
}
