//! KPI stat card widget.
//!
//! A bordered card showing one metric: label as the block title, the value
//! centered inside. During the post-refresh pulse window the value style is
//! swapped for a highlight style, which is the terminal rendition of the
//! original scale-up flourish.

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// A single KPI display card.
pub struct StatCard<'a> {
    /// Metric label, rendered as the card title
    label: &'a str,
    /// Formatted metric value
    value: String,
    /// Style for the value
    value_style: Style,
    /// Style for the card border
    border_style: Style,
}

impl<'a> StatCard<'a> {
    /// Create a card for the given label and formatted value.
    pub fn new(label: &'a str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: value.into(),
            value_style: Style::default(),
            border_style: Style::default(),
        }
    }

    /// Set the style for the value text.
    pub fn value_style(mut self, style: Style) -> Self {
        self.value_style = style;
        self
    }

    /// Set the style for the card border.
    pub fn border_style(mut self, style: Style) -> Self {
        self.border_style = style;
        self
    }
}

impl<'a> Widget for StatCard<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 3 {
            return;
        }

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.border_style)
            .title(self.label);
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.height < 1 {
            return;
        }

        // Center the value vertically inside the card.
        let value_area = Rect {
            y: inner.y + inner.height / 2,
            height: 1,
            ..inner
        };

        let value = Paragraph::new(Line::from(Span::styled(self.value, self.value_style)))
            .alignment(Alignment::Center);
        value.render(value_area, buf);
    }
}
