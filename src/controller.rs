//! Start/stop orchestration for the agent.
//!
//! The controller validates the form, dispatches control requests as
//! spawned tasks so the UI stays responsive, and reports each outcome back
//! over a channel. The main loop applies outcomes: raising the alert,
//! clearing the busy flag, and (on a successful start) beginning status
//! polling.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::client::{AgentApi, ApiError};
use crate::state::{AgentForm, MissingField};

/// Alert text for a successful start.
pub const START_SUCCESS_MESSAGE: &str = "Agent started successfully!";

/// Alert text for a successful stop.
pub const STOP_SUCCESS_MESSAGE: &str = "Stop signal sent to the agent.";

/// Which control request an outcome belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    Start,
    Stop,
}

/// Completion of a dispatched control request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlOutcome {
    /// The start request succeeded; status polling should begin.
    Started,
    /// The stop request succeeded; status polling keeps running so the UI
    /// observes the agent wind down on a later tick.
    Stopped,
    /// The request failed; `message` is ready for the alert slot.
    Failed {
        action: ControlAction,
        message: String,
    },
}

/// Dispatches agent control requests and collects their outcomes.
pub struct AgentController {
    api: Arc<dyn AgentApi>,
    tx: mpsc::Sender<ControlOutcome>,
    rx: mpsc::Receiver<ControlOutcome>,
}

impl AgentController {
    pub fn new(api: Arc<dyn AgentApi>) -> Self {
        let (tx, rx) = mpsc::channel(8);
        Self { api, tx, rx }
    }

    /// Validate the form and dispatch a start request.
    ///
    /// Fails fast on an incomplete form: the error is returned directly
    /// and no network call is made.
    pub fn dispatch_start(&self, form: &AgentForm) -> Result<(), MissingField> {
        let request = form.validate()?;

        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = match api.start_agent(&request).await {
                Ok(()) => ControlOutcome::Started,
                Err(error) => failed(ControlAction::Start, error),
            };
            let _ = tx.send(outcome).await;
        });

        Ok(())
    }

    /// Dispatch a stop request. Carries no payload.
    pub fn dispatch_stop(&self) {
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = match api.stop_agent().await {
                Ok(()) => ControlOutcome::Stopped,
                Err(error) => failed(ControlAction::Stop, error),
            };
            let _ = tx.send(outcome).await;
        });
    }

    /// Drain the next pending outcome, if any.
    pub fn poll(&mut self) -> Option<ControlOutcome> {
        self.rx.try_recv().ok()
    }
}

/// Word a failure for the alert slot.
///
/// Server-reported `{detail}` messages are surfaced verbatim; transport
/// and decode failures are framed as connection problems.
fn failed(action: ControlAction, error: ApiError) -> ControlOutcome {
    let message = if error.is_application() {
        format!("Error: {error}")
    } else {
        format!("Connection error: {error}")
    };
    tracing::warn!(?action, %message, "control request failed");
    ControlOutcome::Failed { action, message }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{MockAgentApi, StartRequest};
    use pretty_assertions::assert_eq;
    use tokio::time::Duration;

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    fn filled_form() -> AgentForm {
        let mut form = AgentForm::new();
        form.username = "operator".into();
        form.password = "secret".into();
        form.target_account = "acme".into();
        form.api_key = "key-123".into();
        form
    }

    #[tokio::test(start_paused = true)]
    async fn incomplete_form_never_reaches_the_network() {
        // No expectations set: any API call would panic the mock.
        let api = Arc::new(MockAgentApi::new());
        let mut controller = AgentController::new(api);

        let mut form = filled_form();
        form.password.clear();

        let err = controller.dispatch_start(&form).unwrap_err();
        assert_eq!(err, MissingField("Password"));

        settle().await;
        assert_eq!(controller.poll(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn successful_start_reports_started_with_the_full_payload() {
        let mut api = MockAgentApi::new();
        api.expect_start_agent()
            .withf(|request: &StartRequest| {
                request.username == "operator" && request.verification_code.is_none()
            })
            .returning(|_| Ok(()));
        let mut controller = AgentController::new(Arc::new(api));

        controller.dispatch_start(&filled_form()).unwrap();
        settle().await;

        assert_eq!(controller.poll(), Some(ControlOutcome::Started));
    }

    #[tokio::test(start_paused = true)]
    async fn server_detail_is_surfaced_verbatim_in_the_failure() {
        let mut api = MockAgentApi::new();
        api.expect_start_agent().returning(|_| {
            Err(ApiError::Api {
                status: 400,
                detail: "Agent is already running".into(),
            })
        });
        let mut controller = AgentController::new(Arc::new(api));

        controller.dispatch_start(&filled_form()).unwrap();
        settle().await;

        match controller.poll().unwrap() {
            ControlOutcome::Failed { action, message } => {
                assert_eq!(action, ControlAction::Start);
                assert!(message.contains("Agent is already running"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stop_success_reports_stopped() {
        let mut api = MockAgentApi::new();
        api.expect_stop_agent().returning(|| Ok(()));
        let mut controller = AgentController::new(Arc::new(api));

        controller.dispatch_stop();
        settle().await;

        assert_eq!(controller.poll(), Some(ControlOutcome::Stopped));
    }

    #[tokio::test(start_paused = true)]
    async fn stop_failure_carries_the_detail_message() {
        let mut api = MockAgentApi::new();
        api.expect_stop_agent().returning(|| {
            Err(ApiError::Api {
                status: 400,
                detail: "Agent is not running".into(),
            })
        });
        let mut controller = AgentController::new(Arc::new(api));

        controller.dispatch_stop();
        settle().await;

        match controller.poll().unwrap() {
            ControlOutcome::Failed { action, message } => {
                assert_eq!(action, ControlAction::Stop);
                assert!(message.contains("Agent is not running"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}
