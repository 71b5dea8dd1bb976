use ratatui::style::{Color, Modifier, Style};

// Dusk palette: deep blue ground, lamp-gold accents.
pub const BG: Color = Color::Rgb(14, 17, 26);
pub const SURFACE: Color = Color::Rgb(22, 27, 40);
pub const BORDER: Color = Color::Rgb(48, 56, 78);
pub const TEXT: Color = Color::Rgb(226, 222, 208);
pub const TEXT_DIM: Color = Color::Rgb(116, 122, 140);
pub const GOLD: Color = Color::Rgb(214, 176, 84);
pub const GREEN: Color = Color::Rgb(104, 164, 120);
pub const AMBER: Color = Color::Rgb(224, 146, 72);
pub const RED: Color = Color::Rgb(196, 88, 72);

pub fn base() -> Style {
    Style::default().fg(TEXT).bg(BG)
}

pub fn surface() -> Style {
    Style::default().fg(TEXT).bg(SURFACE)
}

pub fn border() -> Style {
    Style::default().fg(BORDER)
}

pub fn dim() -> Style {
    Style::default().fg(TEXT_DIM)
}

pub fn bold() -> Style {
    Style::default().fg(TEXT).add_modifier(Modifier::BOLD)
}

pub fn gold() -> Style {
    Style::default().fg(GOLD)
}

pub fn green() -> Style {
    Style::default().fg(GREEN)
}

pub fn amber() -> Style {
    Style::default().fg(AMBER)
}

pub fn red() -> Style {
    Style::default().fg(RED)
}
