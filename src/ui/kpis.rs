//! KPI view.
//!
//! Shows the five aggregate metrics as stat cards: three counters and two
//! derived percentages. Values mirror the last successful `/api/kpis`
//! response exactly; rates render as `{value}%`.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use tokio::time::Instant;

use crate::state::AppState;
use crate::ui::widgets::StatCard;
use crate::ui::Theme;

/// KPI overview with five display cards.
pub struct KpiView;

impl KpiView {
    /// Render the KPI view.
    pub fn render(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5), // Counter cards
                Constraint::Length(5), // Rate cards
                Constraint::Length(1), // Last refresh line
                Constraint::Min(0),
            ])
            .split(area);

        let pulsing = state.pulsing(Instant::now());
        let value_style = if pulsing {
            theme.kpi_pulse_style
        } else {
            theme.kpi_value_style
        };

        let kpis = &state.kpis;

        // Top row: the three counters.
        let counters = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(34),
                Constraint::Percentage(33),
                Constraint::Percentage(33),
            ])
            .split(chunks[0]);

        frame.render_widget(
            StatCard::new("Messages sent", count(kpis.total_messages_sent))
                .value_style(value_style)
                .border_style(theme.block_style),
            counters[0],
        );
        frame.render_widget(
            StatCard::new("Replies", count(kpis.total_replies))
                .value_style(value_style)
                .border_style(theme.block_style),
            counters[1],
        );
        frame.render_widget(
            StatCard::new("Qualified leads", count(kpis.total_qualified))
                .value_style(value_style)
                .border_style(theme.block_style),
            counters[2],
        );

        // Second row: the two derived rates.
        let rates = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[1]);

        frame.render_widget(
            StatCard::new("Response rate", rate(kpis.response_rate))
                .value_style(value_style)
                .border_style(theme.block_style),
            rates[0],
        );
        frame.render_widget(
            StatCard::new("Qualification rate", rate(kpis.qualification_rate))
                .value_style(value_style)
                .border_style(theme.block_style),
            rates[1],
        );

        // Last refresh timestamp, when known.
        let refreshed = match state.kpis_refreshed_at {
            Some(at) => format!("Last updated {}", at.format("%H:%M:%S")),
            None => "Waiting for first refresh (press r)".to_string(),
        };
        let line = Paragraph::new(Line::from(Span::styled(refreshed, theme.help_style)));
        frame.render_widget(line, chunks[2]);
    }
}

/// Format a counter KPI.
pub fn count(value: u64) -> String {
    value.to_string()
}

/// Format a rate KPI as a percentage, e.g. `42.5` renders as `"42.5%"`.
pub fn rate(value: f64) -> String {
    format!("{value}%")
}
