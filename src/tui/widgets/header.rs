use chrono::NaiveDate;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::tui::theme;
use crate::utils::format::fit_width;

/// Place on the left, both calendars on the right.
pub fn render(frame: &mut Frame, area: Rect, city: &str, hijri_str: &str, today: NaiveDate) {
    let block = Block::default()
        .title(Span::styled(" نور noor ", theme::accent().add_modifier(Modifier::BOLD)))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::edge())
        .style(theme::screen());

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(inner);

    let place_width = cols[0].width.saturating_sub(2) as usize;
    let place = Paragraph::new(vec![
        Line::from(Span::styled(
            format!(" {}", fit_width(city, place_width)),
            theme::strong(),
        )),
        Line::from(Span::styled(" local time", theme::muted())),
    ]);
    frame.render_widget(place, cols[0]);

    let dates = Paragraph::new(vec![
        Line::from(Span::styled(format!("{} ", hijri_str), theme::accent())),
        Line::from(Span::styled(
            format!("{} ", today.format("%A, %d %B %Y")),
            theme::muted(),
        )),
    ])
    .alignment(Alignment::Right);
    frame.render_widget(dates, cols[1]);
}
