//! UI theme definition.

use ratatui::style::{Color, Modifier, Style};

/// Theme for the application UI.
#[derive(Debug, Clone)]
pub struct Theme {
    // Basic styles
    pub normal_text: Style,
    pub block_style: Style,
    pub header_style: Style,
    pub label_style: Style,
    pub value_style: Style,

    // View selector styles
    pub tab_style: Style,
    pub active_tab_style: Style,

    // Form styles
    pub focused_field_style: Style,
    pub editing_field_style: Style,

    // Run-state styles
    pub running_style: Style,
    pub stopped_style: Style,
    pub busy_style: Style,

    // Alert styles
    pub alert_success: Style,
    pub alert_error: Style,

    // KPI card styles
    pub kpi_value_style: Style,
    pub kpi_pulse_style: Style,

    // Key hint styles
    pub key_style: Style,
    pub help_style: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            // Basic styles
            normal_text: Style::default().fg(Color::White),
            block_style: Style::default(),
            header_style: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            label_style: Style::default().fg(Color::Gray),
            value_style: Style::default().fg(Color::White),

            // View selector styles
            tab_style: Style::default().fg(Color::Gray),
            active_tab_style: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),

            // Form styles
            focused_field_style: Style::default().fg(Color::Black).bg(Color::White),
            editing_field_style: Style::default().fg(Color::Black).bg(Color::Cyan),

            // Run-state styles
            running_style: Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            stopped_style: Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            busy_style: Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),

            // Alert styles
            alert_success: Style::default().fg(Color::Green),
            alert_error: Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),

            // KPI card styles
            kpi_value_style: Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            kpi_pulse_style: Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),

            // Key hint styles
            key_style: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            help_style: Style::default().fg(Color::Gray),
        }
    }
}
