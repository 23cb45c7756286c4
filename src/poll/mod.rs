//! Polling components that keep displayed state in sync with the server.
//!
//! Two pollers each own one recurring timer:
//!
//! - [`StatusPoller`] queries `/api/status` every 5 seconds once started
//! - [`KpiPoller`] queries `/api/kpis` every 30 seconds, skipping ticks
//!   while the KPI view is not active
//!
//! Results are pushed over mpsc channels and applied by the main loop.
//! Each issued request carries a monotonically increasing sequence number
//! so a slow, stale response can never overwrite a fresher one.

pub mod kpi;
pub mod status;

pub use kpi::{KpiPoller, KpiUpdate};
pub use status::{StatusPoller, StatusUpdate};

use tokio::task::JoinHandle;
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;

/// Default polling interval for run-state.
pub const DEFAULT_STATUS_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Default polling interval for KPI aggregates.
pub const DEFAULT_KPI_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Owned handle to a recurring poll task.
///
/// Each poller holds at most one of these; starting is a guarded state
/// transition rather than an unconditional timer creation, so a double
/// start can never leak a duplicate timer. Dropping the handle cancels
/// the task.
pub(crate) struct PollHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl PollHandle {
    pub(crate) fn new(cancel: CancellationToken, task: JoinHandle<()>) -> Self {
        Self { cancel, task }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.task.abort();
    }
}
