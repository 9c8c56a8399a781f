use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

use crate::features::auth::model::Viewer;

/// Orders dashboard fetches per viewer so a slow, older fetch never replaces a newer one
#[derive(Default)]
pub struct FetchSequencer {
    next: AtomicU64,
    latest: RwLock<HashMap<Viewer, u64>>,
}

impl FetchSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next sequence number and make it the viewer's latest
    pub async fn issue(&self, viewer: &Viewer) -> u64 {
        let sequence = self.next.fetch_add(1, Ordering::SeqCst) + 1;
        self.latest.write().await.insert(viewer.clone(), sequence);
        sequence
    }

    /// Whether `sequence` is still the newest fetch issued for the viewer
    pub async fn is_current(&self, viewer: &Viewer, sequence: u64) -> bool {
        self.latest.read().await.get(viewer) == Some(&sequence)
    }

    pub async fn forget(&self, viewer: &Viewer) {
        self.latest.write().await.remove(viewer);
    }
}
