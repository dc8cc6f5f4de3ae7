use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};

use loyalty_primitives::job::ExternalId;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// One exclusive lock per job, created on demand.
#[derive(Clone, Debug, Default)]
pub struct BuildLocks {
    locks: Arc<StdMutex<HashMap<ExternalId, Arc<Mutex<()>>>>>,
}

impl BuildLocks {
    pub async fn acquire(&self, job: &ExternalId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);

            // only the map refers to these, nobody holds or waits on them
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);

            Arc::clone(locks.entry(job.clone()).or_default())
        };

        lock.lock_owned().await
    }

    /// Jobs with a build in progress or queued.
    #[must_use]
    pub fn active(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|lock| Arc::strong_count(lock) > 1)
            .count()
    }
}
