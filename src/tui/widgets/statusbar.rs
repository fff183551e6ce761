use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::tui::theme;

/// Key hints, plus where the shown timings came from or the last error.
pub fn render(frame: &mut Frame, area: Rect, source: Option<&str>, error: Option<&str>) {
    let hints = [("[r]", " refresh  "), ("[?]", " help  "), ("[q]", " quit")];

    let mut spans = Vec::new();
    for (key, label) in &hints {
        spans.push(Span::styled(*key, theme::accent()));
        spans.push(Span::styled(*label, theme::muted()));
    }

    match (error, source) {
        (Some(err), _) => {
            spans.push(Span::styled("  ·  ", theme::muted()));
            spans.push(Span::styled(format!("✗ {}", err), theme::alert()));
        }
        (None, Some(source)) => {
            spans.push(Span::styled("  ·  ", theme::muted()));
            spans.push(Span::styled(source, theme::muted()));
        }
        (None, None) => {}
    }

    let paragraph = Paragraph::new(Line::from(spans)).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}
