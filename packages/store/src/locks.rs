//! Per-tourist mutual exclusion for score read-modify-write cycles.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

/// Hands out one async mutex per DTID. Holding the guard serializes every
/// score mutation for that tourist; different tourists never contend.
///
/// Entries are created on first use. Entries nobody holds or waits on are
/// pruned on the next call to [`TouristLocks::lock`].
#[derive(Debug, Default)]
pub struct TouristLocks {
    registry: Mutex<BTreeMap<String, Arc<Mutex<()>>>>,
}

impl TouristLocks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for and returns the guard for `dtid`.
    pub async fn lock(&self, dtid: &str) -> OwnedMutexGuard<()> {
        let entry = {
            let mut registry = self.registry.lock().await;
            registry.retain(|_, entry| Arc::strong_count(entry) > 1);
            Arc::clone(registry.entry(dtid.to_string()).or_default())
        };
        log::trace!("Acquiring score lock for {dtid}");
        entry.lock_owned().await
    }

    /// Number of DTIDs currently tracked by the registry.
    pub async fn len(&self) -> usize {
        self.registry.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.registry.lock().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn same_dtid_is_exclusive() {
        let locks = TouristLocks::new();
        let guard = locks.lock("DT-1").await;

        let entry = Arc::clone(&locks.registry.lock().await["DT-1"]);
        assert!(entry.try_lock().is_err(), "second holder must wait");

        drop(guard);
        assert!(entry.try_lock().is_ok());
    }

    #[tokio::test]
    async fn different_dtids_do_not_contend() {
        let locks = TouristLocks::new();
        assert!(locks.is_empty().await);

        let _a = locks.lock("DT-1").await;
        let _b = locks.lock("DT-2").await;
        assert_eq!(locks.len().await, 2);
    }

    #[tokio::test]
    async fn idle_entries_are_pruned() {
        let locks = TouristLocks::new();
        for i in 0..50 {
            drop(locks.lock(&format!("DT-{i}")).await);
        }
        let held = locks.lock("DT-held").await;
        assert_eq!(locks.len().await, 1);

        // A held entry survives pruning.
        drop(locks.lock("DT-other").await);
        assert_eq!(locks.len().await, 2);
        assert!(locks.registry.lock().await.contains_key("DT-held"));

        drop(held);
        drop(locks.lock("DT-last").await);
        assert_eq!(locks.len().await, 1);
    }
}
