//! Run-state polling.
//!
//! The status poller mirrors `/api/status` into the UI. Failures here are
//! logged and never alerted: the next 5-second tick is expected to
//! self-heal, and alarming the operator on every cycle would be noise.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::{self, Duration};
use tokio_util::sync::CancellationToken;

use crate::client::{AgentApi, AgentStatus};
use super::{PollHandle, DEFAULT_STATUS_POLL_INTERVAL};

/// A fetched run-state, tagged with its request sequence number.
#[derive(Debug, Clone, Copy)]
pub struct StatusUpdate {
    pub seq: u64,
    pub status: AgentStatus,
}

/// Recurring poller for the agent's run-state.
pub struct StatusPoller {
    api: Arc<dyn AgentApi>,
    interval: Duration,
    tx: mpsc::Sender<StatusUpdate>,
    rx: mpsc::Receiver<StatusUpdate>,
    next_seq: Arc<AtomicU64>,
    last_applied: u64,
    handle: Option<PollHandle>,
}

impl StatusPoller {
    /// Create a poller with the default 5-second interval.
    pub fn new(api: Arc<dyn AgentApi>) -> Self {
        let (tx, rx) = mpsc::channel(16);
        Self {
            api,
            interval: DEFAULT_STATUS_POLL_INTERVAL,
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

    /// Issue one status query outside the recurring schedule.
    ///
    /// Used for the immediate fetch after init and after start/stop, so
    /// the operator never waits a full interval for feedback.
    pub fn fetch_once(&self) {
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);

        tokio::spawn(async move {
            fetch(api.as_ref(), &tx, seq).await;
        });
    }

    /// Begin recurring polling. No-op when already started.
    pub fn start(&mut self) {
        if self.handle.is_some() {
            tracing::debug!("status poller already started");
            return;
        }

        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        let next_seq = Arc::clone(&self.next_seq);
        let interval = self.interval;
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        // Anchor the schedule at the moment of start, not at whenever the
        // spawned task first runs.
        let mut ticker = time::interval(interval);

        let task = tokio::spawn(async move {
            // The first tick of a tokio interval fires immediately; the
            // schedule starts one interval from now.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        let seq = next_seq.fetch_add(1, Ordering::Relaxed);
                        fetch(api.as_ref(), &tx, seq).await;
                    }
                }
            }
        });

        self.handle = Some(PollHandle::new(cancel, task));
    }

    /// Cancel recurring polling. No-op when not started.
    pub fn stop(&mut self) {
        self.handle.take();
    }

    /// Whether the recurring timer is live.
    pub fn is_started(&self) -> bool {
        self.handle.is_some()
    }

    /// Drain the freshest pending update, discarding any that arrived out
    /// of order behind one already applied.
    pub fn poll(&mut self) -> Option<StatusUpdate> {
        let mut latest = None;
        while let Ok(update) = self.rx.try_recv() {
            if update.seq < self.last_applied {
                tracing::debug!(seq = update.seq, "discarding stale status response");
                continue;
            }
            self.last_applied = update.seq;
            latest = Some(update);
        }
        latest
    }
}

async fn fetch(api: &dyn AgentApi, tx: &mpsc::Sender<StatusUpdate>, seq: u64) {
    match api.status().await {
        Ok(status) => {
            let _ = tx.send(StatusUpdate { seq, status }).await;
        }
        Err(error) => {
            // Previous displayed state stays untouched; this is the one
            // failure class that is never surfaced to the operator.
            tracing::warn!(%error, "status poll failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockAgentApi;
    use std::sync::atomic::AtomicUsize;

    /// Let spawned poll tasks run under the paused clock.
    async fn settle() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    fn counting_api(calls: Arc<AtomicUsize>, running: bool) -> Arc<dyn AgentApi> {
        let mut api = MockAgentApi::new();
        api.expect_status().returning(move || {
            calls.fetch_add(1, Ordering::Relaxed);
            Ok(AgentStatus { running })
        });
        Arc::new(api)
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_once_delivers_a_single_update() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut poller = StatusPoller::new(counting_api(Arc::clone(&calls), true));

        poller.fetch_once();
        settle().await;

        let update = poller.poll().unwrap();
        assert!(update.status.running);
        assert_eq!(calls.load(Ordering::Relaxed), 1);
        assert!(poller.poll().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn started_poller_fetches_on_every_interval() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut poller = StatusPoller::new(counting_api(Arc::clone(&calls), false));

        poller.start();
        settle().await;
        assert_eq!(calls.load(Ordering::Relaxed), 0);

        tokio::time::advance(DEFAULT_STATUS_POLL_INTERVAL).await;
        settle().await;
        assert_eq!(calls.load(Ordering::Relaxed), 1);
        assert!(poller.poll().is_some());

        tokio::time::advance(DEFAULT_STATUS_POLL_INTERVAL).await;
        settle().await;
        assert_eq!(calls.load(Ordering::Relaxed), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn double_start_does_not_leak_a_second_timer() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut poller = StatusPoller::new(counting_api(Arc::clone(&calls), false));

        poller.start();
        poller.start();
        assert!(poller.is_started());

        tokio::time::advance(DEFAULT_STATUS_POLL_INTERVAL).await;
        settle().await;
        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_cancels_polling_and_is_idempotent() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut poller = StatusPoller::new(counting_api(Arc::clone(&calls), false));

        poller.stop();
        assert!(!poller.is_started());

        poller.start();
        poller.stop();
        poller.stop();

        tokio::time::advance(DEFAULT_STATUS_POLL_INTERVAL * 3).await;
        settle().await;
        assert_eq!(calls.load(Ordering::Relaxed), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_fetch_is_swallowed_and_leaves_no_update() {
        let mut api = MockAgentApi::new();
        api.expect_status().returning(|| {
            Err(crate::client::ApiError::Api {
                status: 500,
                detail: "boom".into(),
            })
        });
        let mut poller = StatusPoller::new(Arc::new(api));

        poller.fetch_once();
        settle().await;
        assert!(poller.poll().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn stale_responses_are_discarded_in_favor_of_newer_ones() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut poller = StatusPoller::new(counting_api(Arc::clone(&calls), true));

        // Two in-flight requests resolving in order; poll() must apply the
        // newest and report it, not the first.
        poller.fetch_once();
        poller.fetch_once();
        settle().await;

        let update = poller.poll().unwrap();
        assert_eq!(update.seq, 1);

        // A late echo of the older request would now be dropped.
        assert!(poller.poll().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn out_of_order_arrival_cannot_regress_applied_state() {
        let api = Arc::new(MockAgentApi::new());
        let mut poller = StatusPoller::new(api);

        // Inject responses arriving out of issue order.
        let newer = StatusUpdate {
            seq: 5,
            status: AgentStatus { running: false },
        };
        let stale = StatusUpdate {
            seq: 3,
            status: AgentStatus { running: true },
        };
        poller.tx.try_send(newer).unwrap();
        poller.tx.try_send(stale).unwrap();

        let applied = poller.poll().unwrap();
        assert_eq!(applied.seq, 5);
        assert!(!applied.status.running);

        poller.tx.try_send(stale).unwrap();
        assert!(poller.poll().is_none());
    }
}
