use ratatui::style::{Color, Modifier, Style};

// Night palette: deep indigo ground, pale text, a lamp-gold accent.
pub const NIGHT: Color = Color::Rgb(14, 17, 28);
pub const PANEL: Color = Color::Rgb(22, 27, 42);
pub const EDGE: Color = Color::Rgb(52, 60, 88);
pub const TEXT: Color = Color::Rgb(222, 226, 238);
pub const MUTED: Color = Color::Rgb(112, 120, 146);
pub const LAMP: Color = Color::Rgb(232, 190, 96);
pub const DAWN: Color = Color::Rgb(120, 196, 214);
pub const ALERT: Color = Color::Rgb(214, 96, 86);
pub const HIGHLIGHT: Color = Color::Rgb(38, 46, 72);

pub fn screen() -> Style {
    Style::default().fg(TEXT).bg(NIGHT)
}

pub fn panel() -> Style {
    Style::default().fg(TEXT).bg(PANEL)
}

pub fn edge() -> Style {
    Style::default().fg(EDGE)
}

pub fn muted() -> Style {
    Style::default().fg(MUTED)
}

pub fn strong() -> Style {
    Style::default().fg(TEXT).add_modifier(Modifier::BOLD)
}

pub fn accent() -> Style {
    Style::default().fg(LAMP)
}

pub fn countdown() -> Style {
    Style::default().fg(DAWN).add_modifier(Modifier::BOLD)
}

pub fn alert() -> Style {
    Style::default().fg(ALERT)
}

/// The upcoming prayer's row in the times list.
pub fn next_row() -> Style {
    Style::default()
        .fg(LAMP)
        .bg(HIGHLIGHT)
        .add_modifier(Modifier::BOLD)
}
