use chrono::{DateTime, FixedOffset, NaiveDate};
use ratatui::{
    layout::{Alignment, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::prayer_times::ScheduleState;
use crate::tui::theme;

pub fn render(
    frame: &mut Frame,
    area: Rect,
    state: &ScheduleState,
    selected: NaiveDate,
    now: DateTime<FixedOffset>,
) {
    let date_str = match state.date {
        Some(_) if state.show_today => now.format("%A %x %X").to_string(),
        Some(date) => date.format("%A %x").to_string(),
        None => "loading…".to_string(),
    };

    let title_line = Line::from(vec![
        Span::styled("  صلوات  ", theme::gold().add_modifier(Modifier::BOLD)),
        Span::styled("salawaat", theme::gold()),
    ]);

    let mut date_line = vec![Span::styled(date_str, theme::bold())];
    if state.date != Some(selected) {
        date_line.push(Span::styled("  ·  ", theme::dim()));
        date_line.push(Span::styled(
            format!("selected {}", selected.format("%a %x")),
            theme::amber(),
        ));
    }

    let place_line = if state.coordinates.is_set() {
        Span::styled(state.coordinates.to_string(), theme::dim())
    } else {
        Span::styled("no location set", theme::red())
    };

    let text = vec![title_line, Line::from(date_line), Line::from(place_line)];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::gold().add_modifier(Modifier::BOLD))
        .style(theme::base());

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}
