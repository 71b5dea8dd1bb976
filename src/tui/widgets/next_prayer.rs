use chrono::Duration;
use ratatui::{
    layout::{Alignment, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::models::PrayerName;
use crate::prayer_times::Notification;
use crate::tui::theme;
use crate::utils::format::{format_countdown, format_duration_secs};

pub fn render(
    frame: &mut Frame,
    area: Rect,
    next_prayer: Option<(PrayerName, &str, Duration)>,
    banner: Option<&Notification>,
) {
    let block = Block::default()
        .title(Span::styled(" Next Prayer ", theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border())
        .style(theme::surface());

    let mut content: Vec<Line> = match next_prayer {
        None => vec![
            Line::from(""),
            Line::from(Span::styled("  No more prayers today", theme::dim())),
        ],
        Some((prayer, at, remaining)) => {
            let name = prayer.display_name().to_uppercase();
            vec![
                Line::from(""),
                Line::from(vec![
                    Span::styled(format!("  {}", name), theme::gold().add_modifier(Modifier::BOLD)),
                    Span::styled(format!("  at {}", at), theme::dim()),
                ]),
                Line::from(""),
                Line::from(vec![
                    Span::styled("  in  ", theme::dim()),
                    Span::styled(
                        format_countdown(remaining),
                        theme::amber().add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(
                        format!("  ({})", format_duration_secs(remaining.num_seconds())),
                        theme::dim(),
                    ),
                ]),
            ]
        }
    };

    if let Some(notification) = banner {
        let style = match notification {
            Notification::Upcoming { .. } => theme::amber(),
            Notification::Arrived { .. } => theme::green(),
        };
        content.push(Line::from(""));
        content.push(Line::from(vec![
            Span::styled(
                format!("  {}  ", notification.title()),
                style.add_modifier(Modifier::BOLD),
            ),
            Span::styled(notification.body(), style),
        ]));
    }

    let paragraph = Paragraph::new(content)
        .block(block)
        .alignment(Alignment::Left);

    frame.render_widget(paragraph, area);
}
