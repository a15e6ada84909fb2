use ratatui::{
    Frame,
    layout::Rect,
    prelude::{Line, Span},
    style::{Modifier, Style, Stylize},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use crate::domain::Card;

use super::{App, RowField, UiMode, view_style};

const CURSOR: &str = "▏";

impl App {
    fn title_line(&self, card: &Card, selected: bool) -> Line<'static> {
        if selected && self.ui_mode == UiMode::EditTitle {
            let shown = if self.title_draft.is_empty() {
                Span::raw(format!(" {}{} ", CURSOR, card.title)).add_modifier(Modifier::DIM)
            } else {
                Span::raw(format!(" {}{} ", self.title_draft, CURSOR))
            };
            return Line::from(shown.add_modifier(Modifier::BOLD | Modifier::UNDERLINED));
        }
        Line::from(Span::raw(format!(" {} ", card.title)).add_modifier(Modifier::BOLD))
    }

    fn row_draft_line(&self) -> Line<'static> {
        let (item_cursor, price_cursor) = match self.row_field {
            RowField::Item => (CURSOR, ""),
            RowField::Price => ("", CURSOR),
        };
        let item = if self.row_item.is_empty() && self.row_field != RowField::Item {
            "item".to_string()
        } else {
            format!("{}{}", self.row_item, item_cursor)
        };
        Line::from(vec![
            Span::raw("+ "),
            Span::raw(item).add_modifier(Modifier::UNDERLINED),
            Span::raw("  "),
            Span::raw(format!("{}{}", self.row_price, price_cursor))
                .add_modifier(Modifier::UNDERLINED),
        ])
    }

    pub(super) fn render_card(&self, f: &mut Frame, card: &Card, rect: Rect, selected: bool) {
        let bg = view_style::hex_color(&card.color);
        let fg = view_style::text_color_for_bg(bg);
        let inner_width = rect.width.saturating_sub(2) as usize;

        let mut lines: Vec<Line> = card
            .rows
            .iter()
            .enumerate()
            .map(|(idx, row)| {
                let price = &row.price;
                let gap = inner_width
                    .saturating_sub(row.item.chars().count() + price.chars().count())
                    .max(1);
                let text = format!("{}{}{}", row.item, " ".repeat(gap), price);
                if selected && self.selected_row == Some(idx) {
                    Line::styled(text, view_style::selected_row_style(fg))
                } else {
                    Line::from(text)
                }
            })
            .collect();

        if selected && self.ui_mode == UiMode::AddRow {
            lines.push(self.row_draft_line());
        } else if card.rows.is_empty() {
            lines.push(Line::from(Span::raw("no items").add_modifier(Modifier::DIM)));
        }

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(if selected {
                BorderType::Thick
            } else {
                BorderType::Rounded
            })
            .title(self.title_line(card, selected))
            .border_style(view_style::card_border_style(selected, bg))
            .style(Style::default().fg(fg).bg(bg));

        f.render_widget(Paragraph::new(lines).block(block), rect);
    }
}
