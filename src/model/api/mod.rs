//! API-compatible (e.g. de/serialisable) request and response bodies.

mod credentials;
pub use credentials::Credentials;

mod session;
pub use session::{SelfView, Session, VoterView, WalletView};

mod vote;
pub use vote::{IdentityRequest, VoteReceipt, VoteRequest};
