//! Single-slot snapshot cache.

use crate::status::data::Snapshot;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Holds the most recent full snapshot until it is replaced or invalidated.
///
/// There is no expiry. Concurrent writers race and the last one wins; readers
/// always get a complete snapshot because only whole `Arc`s are swapped.
#[derive(Debug, Default)]
pub struct SnapshotCache {
    slot: RwLock<Option<Arc<Snapshot>>>,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached snapshot, if any.
    pub async fn get(&self) -> Option<Arc<Snapshot>> {
        self.slot.read().await.clone()
    }

    /// Replace the cached snapshot.
    pub async fn set(&self, snapshot: Arc<Snapshot>) {
        let previous = self.slot.write().await.replace(snapshot);
        debug!(replaced = previous.is_some(), "snapshot cache updated");
    }

    /// Drop the cached snapshot.
    pub async fn invalidate(&self) {
        self.slot.write().await.take();
    }
}
