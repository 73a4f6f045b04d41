use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use crate::client::types::StreamStatus;
use crate::status::feed::StatusFeed;

/// Where status snapshots come from. The HTTP client is the production
/// implementation; tests script their own.
pub trait StatusSource {
    fn fetch_status(&self) -> impl Future<Output = eyre::Result<StreamStatus>> + Send;
}

/// Handle for triggering an immediate out-of-band poll, independent of the
/// timer. A refresh signalled while a fetch is in flight is latched and
/// served right after it completes.
#[derive(Debug, Clone)]
pub struct RefreshHandle {
    notify: Arc<Notify>,
}

impl RefreshHandle {
    pub fn new() -> Self {
        Self {
            notify: Arc::new(Notify::new()),
        }
    }

    pub fn refresh_now(&self) {
        self.notify.notify_one();
    }
}

impl Default for RefreshHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Main entry point for the status poller task.
///
/// Polls once immediately, then once per interval tick or refresh signal,
/// until the cancellation token fires. At most one fetch is in flight at a
/// time. Poll failures are absorbed into the feed's connectivity flag; the
/// next tick is the retry.
pub async fn run_status_poller<S: StatusSource>(
    source: S,
    feed: StatusFeed,
    interval: Duration,
    refresh: RefreshHandle,
    shutdown: CancellationToken,
) {
    tracing::info!(interval_ms = interval.as_millis() as u64, "Status poller starting");

    poll_once(&source, &feed, &shutdown).await;

    loop {
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = refresh.notify.notified() => {
                tracing::debug!("Out-of-band refresh requested");
            }
            _ = shutdown.cancelled() => break,
        }

        poll_once(&source, &feed, &shutdown).await;
    }

    tracing::info!("Status poller stopped");
}

/// One poll: fetch, then apply on success or mark disconnected on failure.
/// A fetch still in flight at cancellation is aborted and never applied.
async fn poll_once<S: StatusSource>(source: &S, feed: &StatusFeed, shutdown: &CancellationToken) {
    let result = tokio::select! {
        result = source.fetch_status() => result,
        _ = shutdown.cancelled() => return,
    };

    match result {
        Ok(snapshot) => {
            let added = feed.apply_snapshot(snapshot).await;
            if added > 0 {
                tracing::debug!(added, "Merged new alerts into rolling history");
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "Status poll failed");
            feed.mark_disconnected().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::types::{FlaggedTransaction, RiskLevel};
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct Script {
        responses: Mutex<VecDeque<eyre::Result<StreamStatus>>>,
        calls: AtomicUsize,
    }

    #[derive(Clone)]
    struct ScriptedSource(Arc<Script>);

    impl ScriptedSource {
        fn new(responses: Vec<eyre::Result<StreamStatus>>) -> (Self, Arc<Script>) {
            let script = Arc::new(Script {
                responses: Mutex::new(responses.into()),
                calls: AtomicUsize::new(0),
            });
            (Self(script.clone()), script)
        }
    }

    impl StatusSource for ScriptedSource {
        async fn fetch_status(&self) -> eyre::Result<StreamStatus> {
            self.0.calls.fetch_add(1, Ordering::SeqCst);
            self.0
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(eyre::eyre!("script exhausted")))
        }
    }

    fn snapshot(risk_level: RiskLevel, alerts: Vec<FlaggedTransaction>) -> StreamStatus {
        StreamStatus {
            active_threats: alerts.len() as u64,
            blocked_today: 0,
            transactions_per_second: 10.0,
            risk_level,
            recent_alerts: alerts,
            threat_timeline: Vec::new(),
            total_processed: 0,
        }
    }

    fn alert(account_id: &str, timestamp: &str) -> FlaggedTransaction {
        FlaggedTransaction {
            account_id: account_id.to_string(),
            amount: 100.0,
            timestamp: timestamp.to_string(),
            risk_score: 0.7,
            reason: "Velocity spike".to_string(),
            status: "FLAGGED".to_string(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_immediately_on_start() {
        let (source, script) = ScriptedSource::new(vec![Ok(snapshot(RiskLevel::Low, vec![]))]);
        let feed = StatusFeed::new(50);
        let shutdown = CancellationToken::new();
        let task = tokio::spawn(run_status_poller(
            source,
            feed.clone(),
            Duration::from_secs(3600),
            RefreshHandle::new(),
            shutdown.clone(),
        ));

        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(script.calls.load(Ordering::SeqCst), 1);
        assert!(feed.is_connected().await);
        assert!(feed.latest_snapshot().await.is_some());

        shutdown.cancel();
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_scheduled_tick_polls_again() {
        let (source, script) = ScriptedSource::new(vec![
            Ok(snapshot(RiskLevel::Low, vec![alert("A", "t1")])),
            Ok(snapshot(RiskLevel::High, vec![alert("B", "t2")])),
        ]);
        let feed = StatusFeed::new(50);
        let shutdown = CancellationToken::new();
        let task = tokio::spawn(run_status_poller(
            source,
            feed.clone(),
            Duration::from_secs(3),
            RefreshHandle::new(),
            shutdown.clone(),
        ));

        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(script.calls.load(Ordering::SeqCst), 1);
        assert!(!feed.is_under_attack().await);

        tokio::time::sleep(Duration::from_secs(4)).await;
        assert_eq!(script.calls.load(Ordering::SeqCst), 2);
        assert!(feed.is_under_attack().await);
        assert_eq!(feed.rolling_alerts().await.len(), 2);

        shutdown.cancel();
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_poll_only_flips_connectivity() {
        let (source, _script) = ScriptedSource::new(vec![
            Ok(snapshot(RiskLevel::High, vec![alert("A", "t1")])),
            Err(eyre::eyre!("connection refused")),
        ]);
        let feed = StatusFeed::new(50);
        let shutdown = CancellationToken::new();
        let task = tokio::spawn(run_status_poller(
            source,
            feed.clone(),
            Duration::from_secs(3),
            RefreshHandle::new(),
            shutdown.clone(),
        ));

        tokio::time::sleep(Duration::from_millis(5)).await;
        let before = feed.latest_snapshot().await.unwrap();

        tokio::time::sleep(Duration::from_secs(4)).await;
        assert!(!feed.is_connected().await);
        let after = feed.latest_snapshot().await.unwrap();
        assert_eq!(after.risk_level, before.risk_level);
        assert_eq!(feed.rolling_alerts().await.len(), 1);
        assert!(feed.is_under_attack().await);

        shutdown.cancel();
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_now_polls_out_of_band() {
        let (source, script) = ScriptedSource::new(vec![
            Ok(snapshot(RiskLevel::Low, vec![])),
            Ok(snapshot(RiskLevel::Medium, vec![alert("A", "t1")])),
        ]);
        let feed = StatusFeed::new(50);
        let refresh = RefreshHandle::new();
        let shutdown = CancellationToken::new();
        let task = tokio::spawn(run_status_poller(
            source,
            feed.clone(),
            Duration::from_secs(3600),
            refresh.clone(),
            shutdown.clone(),
        ));

        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(script.calls.load(Ordering::SeqCst), 1);

        refresh.refresh_now();
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(script.calls.load(Ordering::SeqCst), 2);
        assert_eq!(feed.rolling_alerts().await.len(), 1);

        shutdown.cancel();
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_stops_polling() {
        let (source, script) = ScriptedSource::new(vec![Ok(snapshot(RiskLevel::Low, vec![]))]);
        let feed = StatusFeed::new(50);
        let shutdown = CancellationToken::new();
        let task = tokio::spawn(run_status_poller(
            source,
            feed.clone(),
            Duration::from_secs(3),
            RefreshHandle::new(),
            shutdown.clone(),
        ));

        tokio::time::sleep(Duration::from_millis(5)).await;
        shutdown.cancel();
        task.await.unwrap();

        let calls = script.calls.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(script.calls.load(Ordering::SeqCst), calls);
    }
}
