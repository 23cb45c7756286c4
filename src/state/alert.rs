//! Transient operator notifications.
//!
//! At most one alert is visible at a time; showing a new one replaces the
//! current one and restarts the dismiss clock. There is no queue.

use tokio::time::{Duration, Instant};

/// How long an alert stays on screen.
pub const ALERT_DISMISS_AFTER: Duration = Duration::from_secs(5);

/// Visual category of an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Success,
    Error,
}

/// A single transient notification.
#[derive(Debug, Clone)]
pub struct Alert {
    pub message: String,
    pub kind: AlertKind,
    raised_at: Instant,
}

impl Alert {
    pub fn new(message: impl Into<String>, kind: AlertKind) -> Self {
        Self {
            message: message.into(),
            kind,
            raised_at: Instant::now(),
        }
    }

    /// Whether the dismiss delay has elapsed.
    pub fn expired(&self, now: Instant) -> bool {
        now.duration_since(self.raised_at) >= ALERT_DISMISS_AFTER
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test(start_paused = true)]
    async fn alert_expires_after_the_dismiss_delay() {
        let alert = Alert::new("saved", AlertKind::Success);
        assert!(!alert.expired(Instant::now()));

        tokio::time::advance(ALERT_DISMISS_AFTER).await;
        assert!(alert.expired(Instant::now()));
    }

    #[tokio::test(start_paused = true)]
    async fn alert_survives_until_the_delay_elapses() {
        let alert = Alert::new("oops", AlertKind::Error);

        tokio::time::advance(ALERT_DISMISS_AFTER - Duration::from_millis(1)).await;
        assert!(!alert.expired(Instant::now()));
        assert_eq!(alert.kind, AlertKind::Error);
    }
}
