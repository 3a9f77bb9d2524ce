//! In-process mutual exclusion per sequence id.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Hands out one async lock per sequence so that at most one
/// `execute_next_step` runs for a given sequence at a time.
#[derive(Debug, Default)]
pub(crate) struct SequenceLocks {
    locks: Mutex<HashMap<u64, Arc<AsyncMutex<()>>>>,
}

impl SequenceLocks {
    /// Waits for exclusive access to `sequence_id`.
    pub(crate) async fn acquire(&self, sequence_id: u64) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            // Drop entries nobody holds or waits on
            locks.retain(|id, lock| *id == sequence_id || Arc::strong_count(lock) > 1);
            locks.entry(sequence_id).or_default().clone()
        };
        lock.lock_owned().await
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_same_sequence_is_serialised() {
        let locks = SequenceLocks::default();
        let guard = locks.acquire(1).await;

        let second = tokio::time::timeout(Duration::from_millis(50), locks.acquire(1)).await;
        assert!(second.is_err(), "second acquire should wait");

        drop(guard);
        let third = tokio::time::timeout(Duration::from_millis(50), locks.acquire(1)).await;
        assert!(third.is_ok());
    }

    #[tokio::test]
    async fn test_distinct_sequences_do_not_block() {
        let locks = SequenceLocks::default();
        let _one = locks.acquire(1).await;
        let two = tokio::time::timeout(Duration::from_millis(50), locks.acquire(2)).await;
        assert!(two.is_ok());
    }

    #[tokio::test]
    async fn test_released_entries_are_pruned() {
        let locks = SequenceLocks::default();
        drop(locks.acquire(1).await);
        drop(locks.acquire(2).await);
        drop(locks.acquire(3).await);
        assert_eq!(locks.len(), 1);
    }
}
