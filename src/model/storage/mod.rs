//! Storage seams for voters and cast votes.
//!
//! The orchestrator only depends on these traits; uniqueness of voter IDs and
//! of `(voter, election)` pairs is enforced by the implementation.

#[cfg(test)]
mod memory;
mod mongo;

#[cfg(test)]
pub use memory::{MemoryVoteLedger, MemoryVoterDirectory};
pub use mongo::{MongoVoteLedger, MongoVoterDirectory};

use crate::error::Result;
use crate::model::db::Voter;

/// Lookup and creation of voter records.
#[rocket::async_trait]
pub trait VoterDirectory: Send + Sync {
    /// Insert a new voter, failing with `VoterAlreadyRegistered` if the ID is taken.
    async fn create(&self, voter: &Voter) -> Result<()>;

    /// Find a voter by ID.
    async fn find(&self, voter_id: &str) -> Result<Option<Voter>>;
}

/// Outcome of recording a vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commit {
    /// The pair was newly recorded.
    Recorded,
    /// The pair already existed; nothing changed.
    AlreadyRecorded,
}

/// Durable record of which voters have voted in which elections.
#[rocket::async_trait]
pub trait VoteLedger: Send + Sync {
    async fn has_voted(&self, voter_id: &str, election_id: &str) -> Result<bool>;

    /// Record the pair. Idempotent: an existing pair is not an error.
    async fn mark_voted(&self, voter_id: &str, election_id: &str) -> Result<Commit>;
}
