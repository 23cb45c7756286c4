//! Control view: credential form, run-state read-outs, and action hints.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::state::{AppState, FormField, PendingAction};
use crate::ui::Theme;

/// Short run-state label.
fn status_label(running: bool) -> &'static str {
    if running {
        "Running"
    } else {
        "Stopped"
    }
}

/// Longer run-state sentence shown under the label.
fn status_sentence(running: bool) -> &'static str {
    if running {
        "The agent is active and processing messages..."
    } else {
        "The agent is stopped. Fill in the form and press 's' to start it."
    }
}

/// The agent control view.
pub struct ControlView;

impl ControlView {
    /// Render the control view.
    pub fn render(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),                                // Run-state panel
                Constraint::Length(FormField::ALL.len() as u16 + 2),  // Form
                Constraint::Length(2),                                // Action hints
                Constraint::Min(0),
            ])
            .split(area);

        Self::render_status(frame, chunks[0], state, theme);
        Self::render_form(frame, chunks[1], state, theme);
        Self::render_actions(frame, chunks[2], state, theme);
    }

    /// Render the run-state panel: short label plus descriptive sentence.
    fn render_status(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
        let running = state.status.running;
        let label_style = if running {
            theme.running_style
        } else {
            theme.stopped_style
        };

        let text = vec![
            Line::from(vec![
                Span::styled("Agent status: ", theme.label_style),
                Span::styled(status_label(running), label_style),
            ]),
            Line::from(Span::styled(status_sentence(running), theme.normal_text)),
        ];

        let panel = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).title("Status"));
        frame.render_widget(panel, area);
    }

    /// Render the credential form with focus and editing highlights.
    fn render_form(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
        let form = &state.form;

        let lines: Vec<Line> = FormField::ALL
            .iter()
            .map(|&field| {
                let focused = form.focused() == field;
                let value_style = if focused && form.is_editing() {
                    theme.editing_field_style
                } else if focused {
                    theme.focused_field_style
                } else {
                    theme.value_style
                };

                let marker = if focused { "> " } else { "  " };
                let required = if field.is_required() { "" } else { " (optional)" };
                let mut value = form.display_value(field);
                if focused && form.is_editing() {
                    value.push('_');
                }

                Line::from(vec![
                    Span::raw(marker),
                    Span::styled(
                        format!("{:<18}", format!("{}{}", field.label(), required)),
                        theme.label_style,
                    ),
                    Span::styled(value, value_style),
                ])
            })
            .collect();

        let panel = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Configuration"));
        frame.render_widget(panel, area);
    }

    /// Render the action hints or the in-flight indicator.
    fn render_actions(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
        let line = match state.pending {
            Some(PendingAction::Start) => {
                Line::from(Span::styled("Processing... starting the agent", theme.busy_style))
            }
            Some(PendingAction::Stop) => {
                Line::from(Span::styled("Processing... stopping the agent", theme.busy_style))
            }
            None => Line::from(vec![
                Span::styled("s", theme.key_style),
                Span::styled(" start agent   ", theme.help_style),
                Span::styled("x", theme.key_style),
                Span::styled(" stop agent   ", theme.help_style),
                Span::styled("Enter", theme.key_style),
                Span::styled(" edit field", theme.help_style),
            ]),
        };

        frame.render_widget(Paragraph::new(line), area);
    }
}
