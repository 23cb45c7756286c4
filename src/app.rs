//! Application state and logic.
//!
//! This module wires the pieces together: the UI controller, the two
//! pollers, the agent controller, and the event loop that drives them.
//! All display state is mutated here, on the main loop, from events and
//! drained channel updates.

use std::sync::Arc;

use color_eyre::Result;
use crossterm::event::KeyEvent;
use futures::StreamExt;
use ratatui::backend::Backend;
use ratatui::Terminal;
use tokio::sync::watch;
use tokio::time::{Duration, Instant};

use crate::client::{AgentApi, ApiClient};
use crate::controller::{AgentController, ControlOutcome, START_SUCCESS_MESSAGE, STOP_SUCCESS_MESSAGE};
use crate::event::{Event, EventHandler};
use crate::poll::{
    KpiPoller, KpiUpdate, StatusPoller, DEFAULT_KPI_POLL_INTERVAL, DEFAULT_STATUS_POLL_INTERVAL,
};
use crate::state::{AlertKind, AppState, PendingAction};
use crate::ui::{Ui, UpdateKind, ViewId};

/// Default agent server address.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Application configuration.
pub struct AppConfig {
    /// Base URL of the agent control API
    pub base_url: String,
    /// Run-state polling interval
    pub status_poll_interval: Duration,
    /// KPI polling interval
    pub kpi_poll_interval: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            status_poll_interval: DEFAULT_STATUS_POLL_INTERVAL,
            kpi_poll_interval: DEFAULT_KPI_POLL_INTERVAL,
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Target a different agent server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Main application.
pub struct App {
    /// Application state
    state: AppState,
    /// Current view controller
    ui: Ui,
    /// Start/stop orchestration
    controller: AgentController,
    /// Run-state poller
    status_poller: StatusPoller,
    /// KPI poller
    kpi_poller: KpiPoller,
    /// Publishes the active view to the KPI poller's gate
    view_tx: watch::Sender<ViewId>,
    /// Should the application exit?
    should_quit: bool,
}

impl App {
    /// Create a new application instance against the configured server.
    pub fn new(config: AppConfig) -> Self {
        let api: Arc<dyn AgentApi> = Arc::new(ApiClient::new(config.base_url.as_str()));
        Self::with_api(config, api)
    }

    /// Create an application instance with an injected API implementation.
    pub fn with_api(config: AppConfig, api: Arc<dyn AgentApi>) -> Self {
        let (view_tx, view_rx) = watch::channel(ViewId::default());

        Self {
            state: AppState::new(),
            ui: Ui::new(),
            controller: AgentController::new(Arc::clone(&api)),
            status_poller: StatusPoller::new(Arc::clone(&api))
                .with_interval(config.status_poll_interval),
            kpi_poller: KpiPoller::new(api, view_rx).with_interval(config.kpi_poll_interval),
            view_tx,
            should_quit: false,
        }
    }

    /// Runs the application main loop.
    pub async fn run(
        &mut self,
        terminal: &mut Terminal<impl Backend>,
        event_handler: &mut EventHandler,
    ) -> Result<()> {
        self.init();

        while !self.should_quit {
            // Draw the UI
            terminal.draw(|frame| self.ui.render(frame, &self.state))?;

            // Handle events
            if let Some(event) = event_handler.next().await {
                self.handle_event(event)?;
            }

            // Drain poller and controller channels
            self.apply_updates();
        }

        Ok(())
    }

    /// Runs the application main loop with the Crossterm backend.
    pub async fn run_with_crossterm(&mut self, event_handler: &mut EventHandler) -> Result<()> {
        use ratatui::backend::CrosstermBackend;

        let mut terminal = Terminal::new(CrosstermBackend::new(std::io::stdout()))?;
        self.run(&mut terminal, event_handler).await
    }

    /// One-time init: an immediate status fetch and the KPI auto-refresh.
    ///
    /// Status polling proper only begins once the agent is successfully
    /// started; the KPI timer runs for the whole session, gated on the
    /// active view.
    fn init(&mut self) {
        self.status_poller.fetch_once();
        self.kpi_poller.start_auto_refresh();
    }

    /// Handles input and other events.
    fn handle_event(&mut self, event: Event) -> Result<()> {
        match event {
            Event::Key(key) => self.handle_key_event(key),
            // The next draw picks up the new terminal size.
            Event::Resize(_, _) => {}
            Event::Tick => {}
        }
        Ok(())
    }

    /// Handles keyboard input.
    fn handle_key_event(&mut self, key: KeyEvent) {
        match self.ui.handle_key_event(key, &mut self.state) {
            UpdateKind::Quit => self.should_quit = true,
            UpdateKind::ToggleHelp => self.ui.toggle_help(),
            UpdateKind::SwitchView(view) => self.switch_view(view),
            UpdateKind::StartAgent => self.start_agent(),
            UpdateKind::StopAgent => self.stop_agent(),
            UpdateKind::RefreshKpis => self.kpi_poller.refresh(),
            UpdateKind::Other => {}
        }
    }

    /// Activate a view and refresh KPIs when the KPI view was entered.
    fn switch_view(&mut self, view: ViewId) {
        if self.ui.activate(view) {
            self.kpi_poller.refresh();
        }
        let _ = self.view_tx.send(self.ui.active_view());
    }

    /// Validate and dispatch a start request.
    fn start_agent(&mut self) {
        if self.state.is_busy() {
            return;
        }
        match self.controller.dispatch_start(&self.state.form) {
            Ok(()) => self.state.pending = Some(PendingAction::Start),
            Err(missing) => self.state.show_alert(missing.to_string(), AlertKind::Error),
        }
    }

    /// Dispatch a stop request.
    fn stop_agent(&mut self) {
        if self.state.is_busy() {
            return;
        }
        self.controller.dispatch_stop();
        self.state.pending = Some(PendingAction::Stop);
    }

    /// Drain channels and expire time-bound display state.
    fn apply_updates(&mut self) {
        let now = Instant::now();
        self.state.tick(now);

        if let Some(update) = self.status_poller.poll() {
            self.state.apply_status(update.status);
        }

        if let Some(update) = self.kpi_poller.poll() {
            match update {
                KpiUpdate::Snapshot { kpis, .. } => self.state.apply_kpis(kpis, now),
                KpiUpdate::Failed { message, .. } => {
                    self.state.show_alert(message, AlertKind::Error)
                }
            }
        }

        while let Some(outcome) = self.controller.poll() {
            self.apply_outcome(outcome);
        }
    }

    /// Apply a control-request completion.
    fn apply_outcome(&mut self, outcome: ControlOutcome) {
        self.state.pending = None;
        match outcome {
            ControlOutcome::Started => {
                self.state.show_alert(START_SUCCESS_MESSAGE, AlertKind::Success);
                self.status_poller.fetch_once();
                self.status_poller.start();
            }
            ControlOutcome::Stopped => {
                // The status poller keeps running so the UI observes the
                // agent wind down on its own on a later tick.
                self.state.show_alert(STOP_SUCCESS_MESSAGE, AlertKind::Success);
                self.status_poller.fetch_once();
            }
            ControlOutcome::Failed { message, .. } => {
                self.state.show_alert(message, AlertKind::Error);
            }
        }
    }
}
