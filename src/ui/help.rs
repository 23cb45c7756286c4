//! Help overlay.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use crate::ui::Theme;

/// Key binding help overlay.
pub struct HelpView;

impl HelpView {
    /// Render the help overlay centered in `area`.
    pub fn render(frame: &mut Frame, area: Rect, theme: &Theme) {
        let bindings: &[(&str, &str)] = &[
            ("1 / 2", "switch between Control and KPIs"),
            ("Tab", "next view"),
            ("Up / Down", "move field focus"),
            ("Enter", "edit the focused field / stop editing"),
            ("s", "start the agent"),
            ("x", "stop the agent"),
            ("r", "refresh KPIs now"),
            ("?", "toggle this help"),
            ("q", "quit"),
        ];

        let lines: Vec<Line> = bindings
            .iter()
            .map(|(key, action)| {
                Line::from(vec![
                    Span::styled(format!("{key:<10}"), theme.key_style),
                    Span::styled(*action, theme.normal_text),
                ])
            })
            .collect();

        let height = (lines.len() as u16 + 2).min(area.height);
        let width = 52.min(area.width);
        let popup = Rect {
            x: area.x + (area.width.saturating_sub(width)) / 2,
            y: area.y + (area.height.saturating_sub(height)) / 2,
            width,
            height,
        };

        frame.render_widget(Clear, popup);
        frame.render_widget(
            Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Help")),
            popup,
        );
    }
}
