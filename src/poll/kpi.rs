//! KPI polling.
//!
//! Unlike the status poller, KPI failures are surfaced to the operator:
//! persistent failure here while the KPI view is open means the server may
//! be unreachable, and the operator is actively looking at this data.
//!
//! The recurring timer is started exactly once at init and never pauses;
//! each tick checks whether the KPI view is the active one and skips the
//! query entirely when it is not (polling-with-gating rather than
//! pausing/resuming the timer per view switch).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::time::{self, Duration};
use tokio_util::sync::CancellationToken;

use crate::client::{AgentApi, KpiSnapshot};
use crate::ui::ViewId;
use super::{PollHandle, DEFAULT_KPI_POLL_INTERVAL};

/// Alert text shown when a KPI refresh fails.
pub const KPI_FAILURE_MESSAGE: &str =
    "Failed to load KPIs. Check that the server is running.";

/// Outcome of one KPI query, tagged with its request sequence number.
#[derive(Debug, Clone)]
pub enum KpiUpdate {
    /// The query succeeded; replace the displayed snapshot.
    Snapshot { seq: u64, kpis: KpiSnapshot },
    /// The query failed; raise a user-visible alert.
    Failed { seq: u64, message: String },
}

impl KpiUpdate {
    fn seq(&self) -> u64 {
        match self {
            KpiUpdate::Snapshot { seq, .. } | KpiUpdate::Failed { seq, .. } => *seq,
        }
    }
}

/// Recurring, view-gated poller for KPI aggregates.
pub struct KpiPoller {
    api: Arc<dyn AgentApi>,
    interval: Duration,
    active_view: watch::Receiver<ViewId>,
    tx: mpsc::Sender<KpiUpdate>,
    rx: mpsc::Receiver<KpiUpdate>,
    next_seq: Arc<AtomicU64>,
    last_applied: u64,
    handle: Option<PollHandle>,
}

impl KpiPoller {
    /// Create a poller with the default 30-second interval, gated on
    /// `active_view`.
    pub fn new(api: Arc<dyn AgentApi>, active_view: watch::Receiver<ViewId>) -> Self {
        let (tx, rx) = mpsc::channel(16);
        Self {
            api,
            interval: DEFAULT_KPI_POLL_INTERVAL,
            active_view,
            tx,
            rx,
            next_seq: Arc::new(AtomicU64::new(0)),
            last_applied: 0,
            handle: None,
        }
    }

    /// Override the polling interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Issue one KPI query immediately, regardless of the active view.
    ///
    /// Triggered when the KPI view is entered so it is never shown stale,
    /// and by the manual refresh key.
    pub fn refresh(&self) {
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);

        tokio::spawn(async move {
            fetch(api.as_ref(), &tx, seq).await;
        });
    }

    /// Begin the recurring, view-gated refresh. No-op when already started.
    pub fn start_auto_refresh(&mut self) {
        if self.handle.is_some() {
            tracing::debug!("kpi auto-refresh already started");
            return;
        }

        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        let next_seq = Arc::clone(&self.next_seq);
        let active_view = self.active_view.clone();
        let interval = self.interval;
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        // Anchor the schedule at the moment of start, not at whenever the
        // spawned task first runs.
        let mut ticker = time::interval(interval);

        let task = tokio::spawn(async move {
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        // Gate on view visibility: skipped ticks issue no
                        // query at all.
                        if *active_view.borrow() != ViewId::Kpis {
                            continue;
                        }
                        let seq = next_seq.fetch_add(1, Ordering::Relaxed);
                        fetch(api.as_ref(), &tx, seq).await;
                    }
                }
            }
        });

        self.handle = Some(PollHandle::new(cancel, task));
    }

    /// Whether the recurring timer is live.
    pub fn is_started(&self) -> bool {
        self.handle.is_some()
    }

    /// Drain the freshest pending update, discarding any that arrived out
    /// of order behind one already applied.
    pub fn poll(&mut self) -> Option<KpiUpdate> {
        let mut latest = None;
        while let Ok(update) = self.rx.try_recv() {
            if update.seq() < self.last_applied {
                tracing::debug!(seq = update.seq(), "discarding stale kpi response");
                continue;
            }
            self.last_applied = update.seq();
            latest = Some(update);
        }
        latest
    }
}

async fn fetch(api: &dyn AgentApi, tx: &mpsc::Sender<KpiUpdate>, seq: u64) {
    let update = match api.kpis().await {
        Ok(kpis) => KpiUpdate::Snapshot { seq, kpis },
        Err(error) => {
            tracing::warn!(%error, "kpi refresh failed");
            KpiUpdate::Failed {
                seq,
                message: KPI_FAILURE_MESSAGE.to_string(),
            }
        }
    };
    let _ = tx.send(update).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ApiError, MockAgentApi};
    use std::sync::atomic::AtomicUsize;

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    fn counting_api(calls: Arc<AtomicUsize>) -> Arc<dyn AgentApi> {
        let mut api = MockAgentApi::new();
        api.expect_kpis().returning(move || {
            calls.fetch_add(1, Ordering::Relaxed);
            Ok(KpiSnapshot {
                total_messages_sent: 10,
                total_replies: 4,
                response_rate: 40.0,
                total_qualified: 2,
                qualification_rate: 50.0,
            })
        });
        Arc::new(api)
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_replaces_the_snapshot_with_server_values() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut poller = KpiPoller::new(
            counting_api(Arc::clone(&calls)),
            watch::channel(ViewId::Control).1,
        );

        poller.refresh();
        settle().await;

        match poller.poll().unwrap() {
            KpiUpdate::Snapshot { kpis, .. } => {
                assert_eq!(kpis.total_messages_sent, 10);
                assert_eq!(kpis.response_rate, 40.0);
            }
            KpiUpdate::Failed { .. } => panic!("expected a snapshot"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_failure_yields_an_alertable_update() {
        let mut api = MockAgentApi::new();
        api.expect_kpis().returning(|| {
            Err(ApiError::Api {
                status: 500,
                detail: "db locked".into(),
            })
        });
        let mut poller = KpiPoller::new(Arc::new(api), watch::channel(ViewId::Kpis).1);

        poller.refresh();
        settle().await;

        match poller.poll().unwrap() {
            KpiUpdate::Failed { message, .. } => assert_eq!(message, KPI_FAILURE_MESSAGE),
            KpiUpdate::Snapshot { .. } => panic!("expected a failure"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn inactive_view_ticks_issue_no_queries() {
        let calls = Arc::new(AtomicUsize::new(0));
        let (_view_tx, view_rx) = watch::channel(ViewId::Control);
        let mut poller = KpiPoller::new(counting_api(Arc::clone(&calls)), view_rx);

        poller.start_auto_refresh();
        tokio::time::advance(DEFAULT_KPI_POLL_INTERVAL * 4).await;
        settle().await;

        assert_eq!(calls.load(Ordering::Relaxed), 0);
        assert!(poller.poll().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn tick_after_view_becomes_active_issues_exactly_one_query() {
        let calls = Arc::new(AtomicUsize::new(0));
        let (view_tx, view_rx) = watch::channel(ViewId::Control);
        let mut poller = KpiPoller::new(counting_api(Arc::clone(&calls)), view_rx);

        poller.start_auto_refresh();
        tokio::time::advance(DEFAULT_KPI_POLL_INTERVAL * 2).await;
        settle().await;
        assert_eq!(calls.load(Ordering::Relaxed), 0);

        view_tx.send(ViewId::Kpis).unwrap();
        tokio::time::advance(DEFAULT_KPI_POLL_INTERVAL).await;
        settle().await;
        assert_eq!(calls.load(Ordering::Relaxed), 1);
        assert!(matches!(
            poller.poll(),
            Some(KpiUpdate::Snapshot { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn auto_refresh_is_started_at_most_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let (_view_tx, view_rx) = watch::channel(ViewId::Kpis);
        let mut poller = KpiPoller::new(counting_api(Arc::clone(&calls)), view_rx);

        poller.start_auto_refresh();
        poller.start_auto_refresh();
        assert!(poller.is_started());

        tokio::time::advance(DEFAULT_KPI_POLL_INTERVAL).await;
        settle().await;
        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }
}
