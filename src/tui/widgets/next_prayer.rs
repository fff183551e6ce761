use ratatui::{
    layout::{Alignment, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::prayer_times::DisplayState;
use crate::tui::theme;

pub fn render(frame: &mut Frame, area: Rect, state: &DisplayState, loading: bool) {
    let block = Block::default()
        .title(Span::styled(" Next Prayer ", theme::accent()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::edge())
        .style(theme::panel());

    let content: Vec<Line> = if state.is_ready {
        vec![
            Line::from(""),
            Line::from(Span::styled(
                state.next_prayer_name.to_uppercase(),
                theme::accent().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(
                state.countdown_text.as_str(),
                theme::countdown(),
            )),
        ]
    } else {
        let placeholder = if loading {
            "Fetching prayer times…"
        } else {
            "No data  ·  [r] retry"
        };
        vec![
            Line::from(""),
            Line::from(Span::styled(placeholder, theme::muted())),
        ]
    };

    let paragraph = Paragraph::new(content)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}
