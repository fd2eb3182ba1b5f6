//! # Stock Locks
//!
//! Per-medicine exclusive locks guarding every stock mutation.
//!
//! SQLite has no `SELECT ... FOR UPDATE`. The process owns the database file,
//! so an async mutex per medicine id plays the role of the row lock.
//!
//! ## Ordering
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Sale A: [IBU, AMOX]        Sale B: [AMOX, IBU]                         │
//! │                                                                         │
//! │  Both lock in ascending id order:  AMOX → IBU                           │
//! │                                                                         │
//! │  A holds AMOX ──► B waits on AMOX (never holds IBU while waiting)       │
//! │  A takes IBU, commits, drops guards ──► B proceeds                      │
//! │                                                                         │
//! │  No cycle, so no deadlock. Disjoint sales never share a mutex.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};

/// Registry of per-medicine mutexes.
///
/// Entries are created on first use and kept for the life of the process;
/// the catalog is small enough that this never needs pruning.
#[derive(Debug, Default)]
pub struct StockLocks {
    entries: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

/// Guards held for the duration of one stock transaction.
///
/// Dropping the set releases every lock.
#[derive(Debug)]
pub struct StockGuards {
    _guards: Vec<OwnedMutexGuard<()>>,
}

impl StockLocks {
    pub fn new() -> Self {
        StockLocks::default()
    }

    fn entry(&self, medicine_id: &str) -> Arc<AsyncMutex<()>> {
        // The std mutex only guards the map and is never held across an await.
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        entries
            .entry(medicine_id.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    /// Locks every distinct id in ascending order.
    ///
    /// Each acquisition waits at most `timeout`. On timeout the locks already
    /// taken are released and [`DbError::Conflict`] is returned.
    pub async fn acquire<I, S>(&self, ids: I, timeout: Duration) -> DbResult<StockGuards>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let ordered: BTreeSet<String> = ids.into_iter().map(|id| id.as_ref().to_string()).collect();
        let mut guards = Vec::with_capacity(ordered.len());

        for id in &ordered {
            let mutex = self.entry(id);
            match tokio::time::timeout(timeout, mutex.lock_owned()).await {
                Ok(guard) => guards.push(guard),
                Err(_) => {
                    warn!(medicine_id = %id, timeout_ms = timeout.as_millis() as u64, "Stock lock wait timed out");
                    return Err(DbError::Conflict(format!(
                        "timed out waiting for stock lock on medicine {}",
                        id
                    )));
                }
            }
        }

        debug!(count = guards.len(), "Stock locks acquired");

        Ok(StockGuards { _guards: guards })
    }

    /// Number of medicines that have ever been locked.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .map(|entries| entries.len())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_acquire_dedupes_and_sorts() {
        let locks = StockLocks::new();
        let guards = locks
            .acquire(["b", "a", "b"], Duration::from_millis(100))
            .await
            .unwrap();
        assert_eq!(guards._guards.len(), 2);
        assert_eq!(locks.len(), 2);
    }

    #[tokio::test]
    async fn test_held_lock_times_out_as_conflict() {
        let locks = StockLocks::new();
        let _held = locks.acquire(["a"], Duration::from_millis(100)).await.unwrap();

        let err = locks
            .acquire(["b", "a"], Duration::from_millis(20))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Conflict(_)));

        // "b" was released when the failed acquisition returned.
        assert!(locks.acquire(["b"], Duration::from_millis(20)).await.is_ok());
    }

    #[tokio::test]
    async fn test_lock_released_on_drop() {
        let locks = StockLocks::new();
        {
            let _guards = locks.acquire(["a"], Duration::from_millis(50)).await.unwrap();
        }
        assert!(locks.acquire(["a"], Duration::from_millis(50)).await.is_ok());
    }

    #[tokio::test]
    async fn test_disjoint_sets_do_not_block() {
        let locks = StockLocks::new();
        let _first = locks.acquire(["a"], Duration::from_millis(50)).await.unwrap();
        assert!(locks.acquire(["b", "c"], Duration::from_millis(50)).await.is_ok());
    }
}
