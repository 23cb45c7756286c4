//! Application state management.
//!
//! All display state lives here and is mutated exclusively by the main
//! loop: mirrored server snapshots (run-state, KPIs), the credential form,
//! the single alert slot, and the in-flight control-action flag. Poll
//! results and control outcomes arrive over channels and are applied
//! through the `apply_*` methods.

mod alert;
mod form;

pub use alert::{Alert, AlertKind, ALERT_DISMISS_AFTER};
pub use form::{AgentForm, FormField, MissingField};

use chrono::{DateTime, Local};
use tokio::time::{Duration, Instant};

use crate::client::{AgentStatus, KpiSnapshot};

/// How long KPI cards stay highlighted after a refresh.
pub const KPI_PULSE: Duration = Duration::from_millis(200);

/// A control request currently in flight.
///
/// While set, further start/stop input is ignored, so a slow request can
/// never be re-submitted concurrently. Cleared by the completion outcome,
/// not by a timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingAction {
    Start,
    Stop,
}

/// Application state.
pub struct AppState {
    /// Credential form shown on the control view.
    pub form: AgentForm,
    /// Last successfully fetched run-state.
    pub status: AgentStatus,
    /// Last successfully fetched KPI aggregates.
    pub kpis: KpiSnapshot,
    /// Wall-clock time of the last successful KPI refresh.
    pub kpis_refreshed_at: Option<DateTime<Local>>,
    /// Control request currently in flight, if any.
    pub pending: Option<PendingAction>,
    /// Current alert, if one is visible.
    alert: Option<Alert>,
    /// End of the KPI pulse window, if one is running.
    pulse_until: Option<Instant>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            form: AgentForm::new(),
            status: AgentStatus::default(),
            kpis: KpiSnapshot::default(),
            kpis_refreshed_at: None,
            pending: None,
            alert: None,
            pulse_until: None,
        }
    }

    /// Show an alert, replacing any current one and restarting its dismiss
    /// clock.
    pub fn show_alert(&mut self, message: impl Into<String>, kind: AlertKind) {
        self.alert = Some(Alert::new(message, kind));
    }

    /// The currently visible alert, if any.
    pub fn alert(&self) -> Option<&Alert> {
        self.alert.as_ref()
    }

    /// Replace the mirrored run-state.
    pub fn apply_status(&mut self, status: AgentStatus) {
        self.status = status;
    }

    /// Replace the mirrored KPI snapshot and start the pulse window.
    pub fn apply_kpis(&mut self, kpis: KpiSnapshot, now: Instant) {
        self.kpis = kpis;
        self.kpis_refreshed_at = Some(Local::now());
        self.pulse_until = Some(now + KPI_PULSE);
    }

    /// Whether the KPI cards are inside the pulse window.
    pub fn pulsing(&self, now: Instant) -> bool {
        self.pulse_until.is_some_and(|until| now < until)
    }

    /// Whether a control request is in flight.
    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// Expire time-bound display state. Called once per loop iteration.
    pub fn tick(&mut self, now: Instant) {
        if self.alert.as_ref().is_some_and(|a| a.expired(now)) {
            self.alert = None;
        }
        if self.pulse_until.is_some_and(|until| now >= until) {
            self.pulse_until = None;
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test(start_paused = true)]
    async fn show_alert_replaces_the_current_one() {
        let mut state = AppState::new();
        state.show_alert("first", AlertKind::Success);
        state.show_alert("second", AlertKind::Error);

        let alert = state.alert().unwrap();
        assert_eq!(alert.message, "second");
        assert_eq!(alert.kind, AlertKind::Error);
    }

    #[tokio::test(start_paused = true)]
    async fn alert_is_cleared_after_the_dismiss_delay() {
        let mut state = AppState::new();
        state.show_alert("saved", AlertKind::Success);

        state.tick(Instant::now());
        assert!(state.alert().is_some());

        tokio::time::advance(ALERT_DISMISS_AFTER).await;
        state.tick(Instant::now());
        assert!(state.alert().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn replacing_an_alert_restarts_the_dismiss_clock() {
        let mut state = AppState::new();
        state.show_alert("first", AlertKind::Success);

        tokio::time::advance(ALERT_DISMISS_AFTER - Duration::from_secs(1)).await;
        state.show_alert("second", AlertKind::Success);

        tokio::time::advance(Duration::from_secs(1)).await;
        state.tick(Instant::now());
        assert_eq!(state.alert().unwrap().message, "second");
    }

    #[tokio::test(start_paused = true)]
    async fn kpi_refresh_opens_and_closes_the_pulse_window() {
        let mut state = AppState::new();
        let now = Instant::now();
        state.apply_kpis(KpiSnapshot::default(), now);
        assert!(state.pulsing(now));

        tokio::time::advance(KPI_PULSE).await;
        let later = Instant::now();
        state.tick(later);
        assert!(!state.pulsing(later));
    }

    #[test]
    fn status_snapshot_is_replaced_wholesale() {
        let mut state = AppState::new();
        state.apply_status(AgentStatus { running: true });
        assert!(state.status.running);

        state.apply_status(AgentStatus { running: false });
        assert!(!state.status.running);
    }
}
