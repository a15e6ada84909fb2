use ratatui::style::{Color, Modifier, Style};

use crate::color;

pub(super) fn hex_color(hex: &str) -> Color {
    color::parse_hex(hex)
        .map(|(r, g, b)| Color::Rgb(r, g, b))
        .unwrap_or(Color::Gray)
}

pub(super) fn text_color_for_bg(bg_color: Color) -> Color {
    if let Color::Rgb(r, g, b) = bg_color {
        let brightness = (299 * r as u32 + 587 * g as u32 + 114 * b as u32) / 1000;
        if brightness > 128 {
            Color::Black
        } else {
            Color::White
        }
    } else {
        Color::Black
    }
}

pub(super) fn card_border_style(selected: bool, bg: Color) -> Style {
    if selected {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(text_color_for_bg(bg))
    }
}

pub(super) fn selected_row_style(fg: Color) -> Style {
    Style::default().add_modifier(Modifier::REVERSED).fg(fg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_backgrounds_get_dark_text() {
        for swatch in crate::constants::PALETTE {
            assert_eq!(text_color_for_bg(hex_color(swatch)), Color::Black);
        }
        assert_eq!(text_color_for_bg(hex_color("#101010")), Color::White);
        assert_eq!(hex_color("nope"), Color::Gray);
    }
}
