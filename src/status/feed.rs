use std::sync::Arc;

use tokio::sync::RwLock;

use crate::client::types::{FlaggedTransaction, StreamStatus};
use crate::status::history::RollingAlertHistory;

/// Live view of backend-reported status, shared between the poller task
/// (sole writer) and any number of readers. Mutation happens only through
/// `apply_snapshot` and `mark_disconnected`.
#[derive(Debug, Clone)]
pub struct StatusFeed {
    inner: Arc<RwLock<FeedState>>,
}

#[derive(Debug)]
struct FeedState {
    latest: Option<StreamStatus>,
    history: RollingAlertHistory,
    connected: bool,
    under_attack: bool,
}

impl StatusFeed {
    pub fn new(history_capacity: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(FeedState {
                latest: None,
                history: RollingAlertHistory::new(history_capacity),
                connected: false,
                under_attack: false,
            })),
        }
    }

    /// Apply a successfully fetched snapshot: replace the latest snapshot,
    /// merge its alerts into the rolling history, and derive the flags.
    /// Returns how many alerts the merge added.
    pub(crate) async fn apply_snapshot(&self, snapshot: StreamStatus) -> usize {
        let mut state = self.inner.write().await;
        let added = state.history.merge(&snapshot.recent_alerts);
        state.under_attack = snapshot.risk_level.is_elevated();
        state.connected = true;
        state.latest = Some(snapshot);
        added
    }

    /// Record a failed poll. Stale data stays in place; only connectivity
    /// changes.
    pub(crate) async fn mark_disconnected(&self) {
        self.inner.write().await.connected = false;
    }

    pub async fn latest_snapshot(&self) -> Option<StreamStatus> {
        self.inner.read().await.latest.clone()
    }

    pub async fn rolling_alerts(&self) -> Vec<FlaggedTransaction> {
        self.inner.read().await.history.entries().to_vec()
    }

    pub async fn is_connected(&self) -> bool {
        self.inner.read().await.connected
    }

    pub async fn is_under_attack(&self) -> bool {
        self.inner.read().await.under_attack
    }
}
