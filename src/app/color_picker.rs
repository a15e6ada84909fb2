use ratatui::{
    Frame,
    layout::Rect,
    prelude::{Line, Span},
    style::{Color, Modifier, Style, Stylize},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use crate::{
    color::{self, Channel},
    constants::{PALETTE, TUI},
};

use super::{App, ui_helpers, view_style};

const SWATCH_WIDTH: u16 = 3;
const SWATCH_STRIDE: u16 = 4;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColorPickerState {
    open_for: Option<String>,
    custom: bool,
    channel: Channel,
    draft: (u8, u8, u8),
}

impl Default for ColorPickerState {
    fn default() -> Self {
        Self {
            open_for: None,
            custom: false,
            channel: Channel::Red,
            draft: (0, 0, 0),
        }
    }
}

impl ColorPickerState {
    pub fn open_for(&self) -> Option<&str> {
        self.open_for.as_deref()
    }

    pub fn is_open(&self) -> bool {
        self.open_for.is_some()
    }

    pub fn is_custom(&self) -> bool {
        self.custom
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn draft_hex(&self) -> String {
        color::format_hex(self.draft)
    }

    pub fn toggle(&mut self, card_id: &str, current_color: &str) {
        if self.open_for.as_deref() == Some(card_id) {
            self.close();
            return;
        }
        self.open_for = Some(card_id.to_string());
        self.custom = false;
        self.channel = Channel::Red;
        self.draft = color::parse_hex(current_color).unwrap_or((0, 0, 0));
    }

    pub fn close(&mut self) {
        self.open_for = None;
        self.custom = false;
    }

    pub fn toggle_custom(&mut self) {
        self.custom = !self.custom;
        self.channel = Channel::Red;
    }

    pub fn cycle_palette(&mut self, step: isize) -> &'static str {
        let len = PALETTE.len() as isize;
        let next = match color::palette_index(&self.draft_hex()) {
            Some(idx) => (idx as isize + step).rem_euclid(len) as usize,
            None => 0,
        };
        self.pick_swatch(next)
    }

    pub fn pick_swatch(&mut self, index: usize) -> &'static str {
        let swatch = PALETTE[index.min(PALETTE.len() - 1)];
        self.draft = color::parse_hex(swatch).unwrap_or(self.draft);
        swatch
    }

    pub fn next_channel(&mut self) {
        self.channel = self.channel.next();
    }

    pub fn prev_channel(&mut self) {
        self.channel = self.channel.prev();
    }

    pub fn adjust(&mut self, steps: i16) {
        self.draft = color::adjust_channel(self.draft, self.channel, steps * TUI.color_step as i16);
    }
}

pub fn swatch_at(popover: Rect, column: u16, row: u16) -> Option<usize> {
    let first_x = popover.x + 2;
    if row != popover.y + 1 || column < first_x {
        return None;
    }
    let offset = column - first_x;
    let index = (offset / SWATCH_STRIDE) as usize;
    (offset % SWATCH_STRIDE < SWATCH_WIDTH && index < PALETTE.len()).then_some(index)
}

impl App {
    pub(super) fn render_color_picker(&mut self, f: &mut Frame, anchor: Rect, area: Rect) {
        let rect = ui_helpers::popover_rect(anchor, area, TUI.popover_width, TUI.popover_height);
        self.popover_rect = Some(rect);

        let draft_color = view_style::hex_color(&self.picker.draft_hex());
        let mut swatches = vec![Span::raw(" ")];
        for swatch in PALETTE {
            let active = swatch.eq_ignore_ascii_case(&self.picker.draft_hex());
            let glyph = if active { "▣▣▣ " } else { "███ " };
            swatches.push(Span::raw(glyph).fg(view_style::hex_color(swatch)));
        }

        let channel_line = if self.picker.is_custom() {
            let (r, g, b) = color::parse_hex(&self.picker.draft_hex()).unwrap_or((0, 0, 0));
            let mut spans = vec![Span::raw(" ")];
            for (channel, value) in [(Channel::Red, r), (Channel::Green, g), (Channel::Blue, b)] {
                let style = if channel == self.picker.channel() {
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::White)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::Gray)
                };
                spans.push(Span::styled(format!("{} {:>3}", channel.label(), value), style));
                spans.push(Span::raw("  "));
            }
            Line::from(spans)
        } else {
            Line::from(Span::styled(" c: custom colour", Style::default().fg(Color::Gray)))
        };

        let hints = if self.picker.is_custom() {
            " Tab chan  ↑/↓ adjust  Enter set"
        } else {
            " ←/→ palette  Enter/Esc close"
        };

        let lines = vec![
            Line::from(swatches),
            Line::from(""),
            channel_line,
            Line::from(vec![
                Span::raw(" "),
                Span::raw("████").fg(draft_color),
                Span::raw(format!(" {}", self.picker.draft_hex())).fg(Color::White),
            ]),
            Line::from(""),
            Line::from(Span::styled(hints, Style::default().fg(Color::DarkGray))),
        ];

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(Line::from(Span::styled("colour", Style::default().fg(Color::White))))
            .border_style(Style::default().fg(draft_color));

        f.render_widget(Clear, rect);
        f.render_widget(Paragraph::new(lines).block(block), rect);
    }
}
