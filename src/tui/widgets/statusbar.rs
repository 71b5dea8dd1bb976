use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::prayer_times::alerts::StatusLines;
use crate::tui::theme;

pub fn render(frame: &mut Frame, area: Rect, status: Option<&StatusLines>) {
    let hints = vec![
        ("[←→]", " day  "),
        ("[Enter]", " show  "),
        ("[t]", " today  "),
        ("[v]", " relative  "),
        ("[+/-]", " notice  "),
        ("[l]", " location  "),
        ("[?]", " help  "),
        ("[Esc]", " quit"),
    ];

    let mut spans = Vec::new();
    for (key, label) in &hints {
        spans.push(Span::styled(*key, theme::gold()));
        spans.push(Span::styled(*label, theme::dim()));
    }

    let mut lines = vec![Line::from(spans)];
    if let Some(status) = status {
        let text: Vec<&str> = status.lines().collect();
        lines.insert(0, Line::from(Span::styled(text.join("  ·  "), theme::amber())));
    }

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}
