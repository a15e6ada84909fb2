use ratatui::{
    Frame,
    layout::Alignment,
    prelude::{Line, Span},
    style::{Color, Modifier, Style},
    widgets::{Block, BorderType, Borders},
};

use super::{App, UiMode, ui_helpers};

impl App {
    fn footer_hint(&self) -> &'static str {
        match self.ui_mode {
            UiMode::EditTitle => " Enter save · Esc cancel ",
            UiMode::AddRow => " Tab item/price · Enter add · Esc cancel ",
            UiMode::Board if self.picker.is_open() => " ←/→ palette · c custom · Esc close ",
            UiMode::Board => {
                " a add · t title · r row · [/] rows · d del row · x del card · p colour · R reload · q quit "
            }
        }
    }

    pub(super) fn draw_frame(&mut self, f: &mut Frame) {
        let size = f.size();

        let footer = match &self.status {
            Some(status) => Span::styled(
                format!(" {} ", status),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            None => Span::styled(self.footer_hint(), Style::default().fg(Color::Gray)),
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(
                Line::from(Span::styled(
                    "shopboard",
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ))
                .alignment(Alignment::Left),
            )
            .title(
                Line::from(Span::styled(
                    format!(
                        "{} cards · {} · {} cols",
                        self.board.cards().len(),
                        ui_helpers::breakpoint_label(size.width.saturating_sub(2)),
                        self.cols
                    ),
                    Style::default().fg(Color::White),
                ))
                .alignment(Alignment::Right),
            )
            .title_bottom(Line::from(footer).alignment(Alignment::Center))
            .border_style(Style::default().fg(Color::DarkGray));
        let area = block.inner(size);
        f.render_widget(block, size);

        self.cols = ui_helpers::columns_for_terminal(area.width);
        self.view_height = area.height;
        let arranged = self.arranged();

        let content = ui_helpers::content_height(&arranged);
        if self.follow_selection
            && let Some(idx) = self.selected_index()
            && let Some(layout) = arranged.get(idx)
        {
            let (top, height) = ui_helpers::vertical_span(layout);
            self.scroll = ui_helpers::scroll_to_reveal(self.scroll, top, height, area.height);
            self.follow_selection = false;
        }
        self.scroll = ui_helpers::clamp_scroll(self.scroll, content, area.height);

        self.card_hits.clear();
        self.popover_rect = None;
        let mut selected_rect = None;

        let cards = self.board.cards().to_vec();
        for (card, layout) in cards.iter().zip(arranged.iter()) {
            let Some(rect) = ui_helpers::card_rect(layout, area, self.cols, self.scroll) else {
                continue;
            };
            let selected = self.selected_id.as_deref() == Some(card.id.as_str());
            if selected {
                selected_rect = Some(rect);
            }
            self.render_card(f, card, rect, selected);
            self.card_hits.push((card.id.clone(), rect));
        }

        if let Some(open_for) = self.picker.open_for().map(str::to_string) {
            let anchor = self
                .card_hits
                .iter()
                .find(|(id, _)| *id == open_for)
                .map(|(_, rect)| *rect)
                .or(selected_rect);
            if let Some(anchor) = anchor {
                self.render_color_picker(f, anchor, area);
            }
        }
    }
}
