use std::collections::{HashMap, HashSet};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};

use super::{Commit, VoteLedger, VoterDirectory};
use crate::error::{Error, Result};
use crate::model::db::Voter;

/// In-memory voter directory for tests. Clones share the same records.
#[derive(Clone, Default)]
pub struct MemoryVoterDirectory {
    voters: Arc<Mutex<HashMap<String, Voter>>>,
}

impl MemoryVoterDirectory {
    pub fn len(&self) -> usize {
        self.voters.lock().unwrap().len()
    }

    /// Overwrite a stored voter, bypassing uniqueness checks.
    pub fn replace(&self, voter: Voter) {
        self.voters.lock().unwrap().insert(voter.id.clone(), voter);
    }
}

#[rocket::async_trait]
impl VoterDirectory for MemoryVoterDirectory {
    async fn create(&self, voter: &Voter) -> Result<()> {
        let mut voters = self.voters.lock().unwrap();
        if voters.contains_key(&voter.id) {
            return Err(Error::VoterAlreadyRegistered(voter.id.clone()));
        }
        voters.insert(voter.id.clone(), voter.clone());
        Ok(())
    }

    async fn find(&self, voter_id: &str) -> Result<Option<Voter>> {
        Ok(self.voters.lock().unwrap().get(voter_id).cloned())
    }
}

/// In-memory vote ledger for tests. Clones share the same records.
///
/// Commits can be made to fail, to exercise the path where the ledger
/// submission succeeded but local bookkeeping did not.
#[derive(Clone, Default)]
pub struct MemoryVoteLedger {
    votes: Arc<Mutex<HashSet<(String, String)>>>,
    fail_commits: Arc<AtomicBool>,
}

impl MemoryVoteLedger {
    pub fn contains(&self, voter_id: &str, election_id: &str) -> bool {
        self.votes
            .lock()
            .unwrap()
            .contains(&(voter_id.to_string(), election_id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.votes.lock().unwrap().len()
    }

    pub fn fail_commits(&self, fail: bool) {
        self.fail_commits.store(fail, Ordering::SeqCst);
    }
}

#[rocket::async_trait]
impl VoteLedger for MemoryVoteLedger {
    async fn has_voted(&self, voter_id: &str, election_id: &str) -> Result<bool> {
        Ok(self.contains(voter_id, election_id))
    }

    async fn mark_voted(&self, voter_id: &str, election_id: &str) -> Result<Commit> {
        if self.fail_commits.load(Ordering::SeqCst) {
            let cause = std::io::Error::new(std::io::ErrorKind::Other, "simulated commit failure");
            return Err(Error::Db(cause.into()));
        }
        let inserted = self
            .votes
            .lock()
            .unwrap()
            .insert((voter_id.to_string(), election_id.to_string()));
        Ok(if inserted {
            Commit::Recorded
        } else {
            Commit::AlreadyRecorded
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::wallet::KeyCustody;

    #[rocket::async_test]
    async fn mark_voted_is_idempotent() {
        let ledger = MemoryVoteLedger::default();
        assert!(!ledger.has_voted("alice", "E1").await.unwrap());
        assert_eq!(
            ledger.mark_voted("alice", "E1").await.unwrap(),
            Commit::Recorded
        );
        assert_eq!(
            ledger.mark_voted("alice", "E1").await.unwrap(),
            Commit::AlreadyRecorded
        );
        assert!(ledger.has_voted("alice", "E1").await.unwrap());
        assert!(!ledger.has_voted("alice", "E2").await.unwrap());
        assert_eq!(ledger.len(), 1);
    }

    #[rocket::async_test]
    async fn voter_ids_are_unique() {
        let directory = MemoryVoterDirectory::default();
        let voter = Voter::example(&KeyCustody::example());
        directory.create(&voter).await.unwrap();
        assert!(matches!(
            directory.create(&voter).await,
            Err(Error::VoterAlreadyRegistered(_))
        ));
        assert_eq!(directory.find(&voter.id).await.unwrap(), Some(voter));
        assert_eq!(directory.find("bob@example.com").await.unwrap(), None);
    }
}
