use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use rocket::tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type VoteKey = (String, String);

/// In-process mutual exclusion per `(voter, election)` pair.
///
/// Requests for different pairs never contend. Entries are held weakly and
/// pruned once nobody holds or awaits them.
#[derive(Default)]
pub struct VoteLocks {
    locks: Mutex<HashMap<VoteKey, Weak<AsyncMutex<()>>>>,
}

impl VoteLocks {
    /// Wait for exclusive access to the given pair.
    pub async fn acquire(&self, voter_id: &str, election_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            locks.retain(|_, lock| lock.strong_count() > 0);

            let key = (voter_id.to_string(), election_id.to_string());
            match locks.get(&key).and_then(Weak::upgrade) {
                Some(lock) => lock,
                None => {
                    let lock = Arc::new(AsyncMutex::new(()));
                    locks.insert(key, Arc::downgrade(&lock));
                    lock
                }
            }
        };
        lock.lock_owned().await
    }

    /// Number of pairs currently locked or awaited.
    pub fn active(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|lock| lock.strong_count() > 0)
            .count()
    }
}
