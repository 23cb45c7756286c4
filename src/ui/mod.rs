//! UI components for the operator console.
//!
//! The console has exactly two views, selected like tabs: the control view
//! (credential form plus run-state) and the KPI view. The [`Ui`] controller
//! owns which view is active, routes keyboard input, and renders the frame.
//! View exclusivity is by construction: [`ViewId`] is an enum, so exactly
//! one view is active at any time.

pub mod control;
pub mod help;
pub mod kpis;
pub mod theme;
pub mod widgets;

pub use control::ControlView;
pub use help::HelpView;
pub use kpis::KpiView;
pub use theme::Theme;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Tabs};
use ratatui::Frame;

use crate::state::{AlertKind, AppState};

/// The fixed set of views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewId {
    /// Credential form and agent run-state.
    #[default]
    Control,
    /// Aggregate metrics.
    Kpis,
}

impl ViewId {
    /// All views in selector order.
    pub const ALL: [ViewId; 2] = [ViewId::Control, ViewId::Kpis];

    /// Selector title.
    pub fn title(&self) -> &'static str {
        match self {
            ViewId::Control => "Control",
            ViewId::Kpis => "KPIs",
        }
    }

    fn index(&self) -> usize {
        ViewId::ALL.iter().position(|v| v == self).unwrap_or(0)
    }

    fn next(&self) -> ViewId {
        ViewId::ALL[(self.index() + 1) % ViewId::ALL.len()]
    }
}

/// The result of handling user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateKind {
    /// Quit the application
    Quit,
    /// Toggle the help overlay
    ToggleHelp,
    /// Activate the given view
    SwitchView(ViewId),
    /// Dispatch a start request
    StartAgent,
    /// Dispatch a stop request
    StopAgent,
    /// Refresh KPIs immediately
    RefreshKpis,
    /// No action needed
    Other,
}

/// Main UI controller.
pub struct Ui {
    /// Currently active view
    view: ViewId,
    /// Whether to show the help overlay
    show_help: bool,
    /// UI theme
    theme: Theme,
}

impl Ui {
    /// Create a new UI controller with the control view active.
    pub fn new() -> Self {
        Self {
            view: ViewId::default(),
            show_help: false,
            theme: Theme::default(),
        }
    }

    /// The currently active view.
    pub fn active_view(&self) -> ViewId {
        self.view
    }

    /// Activate `view`, deactivating whichever was active.
    ///
    /// Returns `true` when the KPI view was activated and therefore needs an
    /// immediate refresh so it is never shown stale on entry.
    pub fn activate(&mut self, view: ViewId) -> bool {
        self.view = view;
        view == ViewId::Kpis
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Handle keyboard input.
    pub fn handle_key_event(&mut self, key: KeyEvent, state: &mut AppState) -> UpdateKind {
        // While editing, keystrokes belong to the focused form field.
        if self.view == ViewId::Control && state.form.is_editing() {
            match key.code {
                KeyCode::Esc | KeyCode::Enter => state.form.end_editing(),
                KeyCode::Tab | KeyCode::Down => state.form.focus_next(),
                KeyCode::Up => state.form.focus_prev(),
                KeyCode::Backspace => state.form.pop_char(),
                KeyCode::Char(c) => state.form.push_char(c),
                _ => {}
            }
            return UpdateKind::Other;
        }

        // Global shortcuts.
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return UpdateKind::Quit,
            KeyCode::Char('?') | KeyCode::F(1) => return UpdateKind::ToggleHelp,
            KeyCode::Char('1') => return UpdateKind::SwitchView(ViewId::Control),
            KeyCode::Char('2') => return UpdateKind::SwitchView(ViewId::Kpis),
            KeyCode::Tab => return UpdateKind::SwitchView(self.view.next()),
            _ => {}
        }

        // View-specific shortcuts.
        match self.view {
            ViewId::Control => match key.code {
                KeyCode::Up => {
                    state.form.focus_prev();
                    UpdateKind::Other
                }
                KeyCode::Down => {
                    state.form.focus_next();
                    UpdateKind::Other
                }
                KeyCode::Enter | KeyCode::Char('i') => {
                    state.form.begin_editing();
                    UpdateKind::Other
                }
                KeyCode::Char('s') => UpdateKind::StartAgent,
                KeyCode::Char('x') => UpdateKind::StopAgent,
                _ => UpdateKind::Other,
            },
            ViewId::Kpis => match key.code {
                KeyCode::Char('r') => UpdateKind::RefreshKpis,
                _ => UpdateKind::Other,
            },
        }
    }

    /// Render the frame: view selector, active view, alert and status lines.
    pub fn render(&self, frame: &mut Frame, state: &AppState) {
        let area = frame.size();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2), // View selector
                Constraint::Min(1),    // Active view
                Constraint::Length(1), // Alert line
                Constraint::Length(1), // Status line
            ])
            .split(area);

        self.render_selector(frame, chunks[0]);

        match self.view {
            ViewId::Control => ControlView::render(frame, chunks[1], state, &self.theme),
            ViewId::Kpis => KpiView::render(frame, chunks[1], state, &self.theme),
        }

        self.render_alert(frame, chunks[2], state);
        self.render_status_line(frame, chunks[3], state);

        // Help overlay is always on top.
        if self.show_help {
            HelpView::render(frame, area, &self.theme);
        }
    }

    /// Render the view selector with exactly one active title.
    fn render_selector(&self, frame: &mut Frame, area: ratatui::layout::Rect) {
        let titles: Vec<Line> = ViewId::ALL
            .iter()
            .map(|v| Line::from(Span::raw(v.title())))
            .collect();

        let tabs = Tabs::new(titles)
            .select(self.view.index())
            .style(self.theme.tab_style)
            .highlight_style(self.theme.active_tab_style)
            .divider("|");

        frame.render_widget(tabs, area);
    }

    /// Render the single alert slot, if an alert is visible.
    fn render_alert(&self, frame: &mut Frame, area: ratatui::layout::Rect, state: &AppState) {
        let Some(alert) = state.alert() else {
            return;
        };

        let style = match alert.kind {
            AlertKind::Success => self.theme.alert_success,
            AlertKind::Error => self.theme.alert_error,
        };
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(alert.message.clone(), style))),
            area,
        );
    }

    /// Render the bottom status line.
    fn render_status_line(
        &self,
        frame: &mut Frame,
        area: ratatui::layout::Rect,
        state: &AppState,
    ) {
        let run_state = if state.status.running {
            Span::styled("RUNNING", self.theme.running_style)
        } else {
            Span::styled("STOPPED", self.theme.stopped_style)
        };

        let mut spans = vec![
            Span::styled(self.view.title(), self.theme.active_tab_style),
            Span::raw(" | Agent: "),
            run_state,
        ];
        if state.is_busy() {
            spans.push(Span::raw(" | "));
            spans.push(Span::styled("request in flight", self.theme.busy_style));
        }
        spans.push(Span::raw(" | "));
        spans.push(Span::styled("Press ? for help", self.theme.help_style));

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}

impl Default for Ui {
    fn default() -> Self {
        Self::new()
    }
}
