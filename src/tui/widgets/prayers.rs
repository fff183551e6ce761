use chrono::NaiveTime;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem},
    Frame,
};

use crate::models::{ClockTime, PrayerName, PrayerTimeSet};
use crate::tui::theme;
use crate::utils::format::fit_width;

pub fn render(
    frame: &mut Frame,
    area: Rect,
    times: &PrayerTimeSet,
    midnight: ClockTime,
    next: Option<PrayerName>,
    now: NaiveTime,
) {
    let block = Block::default()
        .title(Span::styled(" Today ", theme::accent()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::edge())
        .style(theme::panel());

    let mut items: Vec<ListItem> = times
        .iter()
        .map(|(name, time)| {
            let is_next = next == Some(name);
            let is_past = time.time().is_some_and(|t| t <= now);

            let style = if is_next {
                theme::next_row()
            } else if is_past {
                theme::muted()
            } else {
                theme::strong()
            };
            let marker = if is_next { "›" } else { " " };

            ListItem::new(Line::from(vec![
                Span::styled(format!(" {} ", marker), style),
                Span::styled(fit_width(name.display_name(), 10), style),
                Span::styled(format!("{:>5} ", time), style),
            ]))
        })
        .collect();

    if midnight.is_known() {
        items.push(ListItem::new(Line::from(vec![
            Span::styled("   ", theme::muted()),
            Span::styled(fit_width("Midnight", 10), theme::muted()),
            Span::styled(format!("{:>5} ", midnight), theme::muted()),
        ])));
    }

    let list = List::new(items).block(block);
    frame.render_widget(list, area);
}
