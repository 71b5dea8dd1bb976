use chrono::{DateTime, FixedOffset};
use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem},
    Frame,
};

use crate::prayer_times::ScheduleState;
use crate::tui::theme;

pub fn render(frame: &mut Frame, area: Rect, state: &ScheduleState, now: DateTime<FixedOffset>) {
    let title = if state.rotated { " Prayers · relative " } else { " Prayers " };
    let block = Block::default()
        .title(Span::styled(title, theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border())
        .style(theme::surface());

    let current = state.current_at(now).map(|p| p.name);
    let next = state.next_after(now).map(|p| p.name);

    let items: Vec<ListItem> = state
        .ordered()
        .map(|p| {
            let is_past = state.show_today && p.display.is_some_and(|t| t <= now);

            let (icon, name_style, time_style) = if Some(p.name) == current {
                (
                    "●",
                    theme::gold().add_modifier(Modifier::BOLD),
                    theme::gold().add_modifier(Modifier::BOLD),
                )
            } else if state.show_today && Some(p.name) == next {
                ("○", theme::amber(), theme::amber())
            } else if is_past {
                (" ", theme::dim(), theme::dim())
            } else {
                (" ", theme::bold(), theme::base())
            };

            // Relative mode borrows from neighbouring days.
            let day_note = match (p.display, state.date) {
                (Some(t), Some(date)) if t.date_naive() > date => "tomorrow",
                (Some(t), Some(date)) if t.date_naive() < date => "yesterday",
                _ => "",
            };

            let line = Line::from(vec![
                Span::styled(format!(" {} ", icon), name_style),
                Span::styled(format!("{:<9}", p.name.display_name()), name_style),
                Span::styled(format!("{:>6}", p.display_value), time_style),
                Span::styled(format!("  {}", day_note), theme::dim()),
            ]);

            ListItem::new(line)
        })
        .collect();

    let list = List::new(items).block(block);
    frame.render_widget(list, area);
}
