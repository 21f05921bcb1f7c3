use mongodb::{
    bson::doc,
    error::{Error as DbError, ErrorKind, WriteFailure},
    Database,
};

use super::{Commit, VoteLedger, VoterDirectory};
use crate::error::{Error, Result};
use crate::model::{
    db::{VoteRecord, Voter},
    mongodb::Coll,
};

/// Server error code for a unique index violation.
const DUPLICATE_KEY: i32 = 11000;

fn is_duplicate_key(err: &DbError) -> bool {
    matches!(
        &*err.kind,
        ErrorKind::Write(WriteFailure::WriteError(e)) if e.code == DUPLICATE_KEY
    )
}

/// Voter directory backed by the `voters` collection.
#[derive(Clone)]
pub struct MongoVoterDirectory {
    voters: Coll<Voter>,
}

impl MongoVoterDirectory {
    pub fn from_db(db: &Database) -> Self {
        Self {
            voters: Coll::from_db(db),
        }
    }
}

#[rocket::async_trait]
impl VoterDirectory for MongoVoterDirectory {
    async fn create(&self, voter: &Voter) -> Result<()> {
        match self.voters.insert_one(voter, None).await {
            Ok(_) => Ok(()),
            Err(e) if is_duplicate_key(&e) => {
                Err(Error::VoterAlreadyRegistered(voter.id.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find(&self, voter_id: &str) -> Result<Option<Voter>> {
        Ok(self.voters.find_one(doc! { "_id": voter_id }, None).await?)
    }
}

/// Vote ledger backed by the `votes` collection and its unique
/// `(voter_id, election_id)` index.
#[derive(Clone)]
pub struct MongoVoteLedger {
    votes: Coll<VoteRecord>,
}

impl MongoVoteLedger {
    pub fn from_db(db: &Database) -> Self {
        Self {
            votes: Coll::from_db(db),
        }
    }
}

#[rocket::async_trait]
impl VoteLedger for MongoVoteLedger {
    async fn has_voted(&self, voter_id: &str, election_id: &str) -> Result<bool> {
        let filter = doc! {
            "voter_id": voter_id,
            "election_id": election_id,
        };
        Ok(self.votes.find_one(filter, None).await?.is_some())
    }

    async fn mark_voted(&self, voter_id: &str, election_id: &str) -> Result<Commit> {
        let record = VoteRecord::new(voter_id, election_id);
        match self.votes.insert_one(&record, None).await {
            Ok(_) => Ok(Commit::Recorded),
            Err(e) if is_duplicate_key(&e) => Ok(Commit::AlreadyRecorded),
            Err(e) => Err(e.into()),
        }
    }
}
