use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use tracing::info;

use crate::constants::TUI;

use super::{
    App, RowField, UiMode,
    color_picker::swatch_at,
    ui_helpers::{self, Direction},
};

impl App {
    pub(super) fn handle_key(&mut self, key: KeyEvent) -> bool {
        match self.ui_mode {
            UiMode::EditTitle => {
                self.handle_title_key(key);
                false
            }
            UiMode::AddRow => {
                self.handle_row_key(key);
                false
            }
            UiMode::Board if self.picker.is_open() => self.handle_picker_key(key),
            UiMode::Board => self.handle_board_key(key),
        }
    }

    fn handle_title_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.end_entry(),
            KeyCode::Enter => {
                if let Some(id) = self.selected_id.clone() {
                    let draft = self.title_draft.clone();
                    let renamed = self.board.rename_card(&id, &draft);
                    self.persist(renamed);
                }
                self.end_entry();
            }
            KeyCode::Backspace => {
                self.title_draft.pop();
            }
            KeyCode::Char(c) => self.title_draft.push(c),
            _ => {}
        }
        self.render_needed = true;
    }

    fn row_draft_mut(&mut self) -> &mut String {
        match self.row_field {
            RowField::Item => &mut self.row_item,
            RowField::Price => &mut self.row_price,
        }
    }

    fn handle_row_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.end_entry(),
            KeyCode::Tab | KeyCode::BackTab => {
                self.row_field = match self.row_field {
                    RowField::Item => RowField::Price,
                    RowField::Price => RowField::Item,
                };
            }
            KeyCode::Backspace => {
                self.row_draft_mut().pop();
            }
            KeyCode::Char(c) => self.row_draft_mut().push(c),
            KeyCode::Enter => {
                if self.row_item.trim().is_empty() {
                    self.row_field = RowField::Item;
                } else if let Some(id) = self.selected_id.clone() {
                    let (item, price) = (self.row_item.clone(), self.row_price.clone());
                    let added = self.board.add_row(&id, &item, &price);
                    self.persist(added);
                    self.selected_row = self
                        .selected_card()
                        .and_then(|card| card.rows.len().checked_sub(1));
                    self.end_entry();
                }
            }
            _ => {}
        }
        self.render_needed = true;
    }

    fn handle_picker_key(&mut self, key: KeyEvent) -> bool {
        let Some(card_id) = self.picker.open_for().map(str::to_string) else {
            return false;
        };

        match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Esc | KeyCode::Char('p') => self.picker.close(),
            KeyCode::Char('c') => self.picker.toggle_custom(),
            KeyCode::Enter if self.picker.is_custom() => {
                let color = self.picker.draft_hex();
                let changed = self.board.set_color(&card_id, &color);
                self.persist(changed);
                self.picker.close();
            }
            KeyCode::Enter => self.picker.close(),
            KeyCode::Tab | KeyCode::Right if self.picker.is_custom() => self.picker.next_channel(),
            KeyCode::BackTab | KeyCode::Left if self.picker.is_custom() => {
                self.picker.prev_channel()
            }
            KeyCode::Up if self.picker.is_custom() => self.picker.adjust(1),
            KeyCode::Down if self.picker.is_custom() => self.picker.adjust(-1),
            KeyCode::Left | KeyCode::Right => {
                let step = if key.code == KeyCode::Left { -1 } else { 1 };
                let swatch = self.picker.cycle_palette(step);
                let changed = self.board.set_color(&card_id, swatch);
                self.persist(changed);
            }
            _ => {}
        }
        self.render_needed = true;
        false
    }

    fn handle_board_key(&mut self, key: KeyEvent) -> bool {
        let shift = key.modifiers.contains(KeyModifiers::SHIFT);

        match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Esc => {
                self.selected_row = None;
                self.status = None;
            }
            KeyCode::Left => self.arrow(Direction::Left, shift),
            KeyCode::Right => self.arrow(Direction::Right, shift),
            KeyCode::Up => self.arrow(Direction::Up, shift),
            KeyCode::Down => self.arrow(Direction::Down, shift),
            KeyCode::Char('+') | KeyCode::Char('=') => self.resize_selected(0, 1),
            KeyCode::Char('-') | KeyCode::Char('_') => self.resize_selected(0, -1),
            KeyCode::Char('>') | KeyCode::Char('.') => self.resize_selected(1, 0),
            KeyCode::Char('<') | KeyCode::Char(',') => self.resize_selected(-1, 0),
            KeyCode::Char('a') => self.add_card(),
            KeyCode::Char('t') | KeyCode::Enter => {
                if let Some(title) = self.selected_card().map(|card| card.title.clone()) {
                    self.begin_title_edit(title);
                }
            }
            KeyCode::Char('r') => {
                if self.selected_card().is_some() {
                    self.begin_row_entry();
                }
            }
            KeyCode::Char('[') | KeyCode::Char(']') => {
                let len = self.selected_card().map_or(0, |card| card.rows.len());
                if len > 0 {
                    self.selected_row = Some(match (key.code, self.selected_row) {
                        (KeyCode::Char('['), Some(row)) => ui_helpers::wrap_prev_index(row, len),
                        (KeyCode::Char('['), None) => len - 1,
                        (_, Some(row)) => ui_helpers::wrap_next_index(row, len),
                        (_, None) => 0,
                    });
                }
            }
            KeyCode::Char('d') => self.remove_selected_row(),
            KeyCode::Char('x') => {
                if let Some(id) = self.selected_id.clone() {
                    let next = self.next_selection_after(&id);
                    let removed = self.board.remove_card(&id);
                    self.persist(removed);
                    self.select(next);
                    self.repair_selection();
                }
            }
            KeyCode::Char('p') => {
                if let Some(card) = self.selected_card() {
                    let (id, color) = (card.id.clone(), card.color.clone());
                    self.picker.toggle(&id, &color);
                }
            }
            KeyCode::Char('R') => {
                self.board.reload();
                info!(cards = self.board.cards().len(), "board reloaded from storage");
                self.status = None;
                self.repair_selection();
            }
            _ => {}
        }
        self.render_needed = true;
        false
    }

    fn add_card(&mut self) {
        let added = self.board.add_card();
        let id = match added {
            Ok(id) => Some(id),
            Err(e) => {
                self.persist::<()>(Err(e));
                self.board.cards().last().map(|card| card.id.clone())
            }
        };
        self.select(id);
        self.begin_title_edit(String::new());
    }

    fn next_selection_after(&self, card_id: &str) -> Option<String> {
        let cards = self.board.cards();
        let idx = self.board.card_index(card_id)?;
        cards
            .get(idx + 1)
            .or_else(|| idx.checked_sub(1).and_then(|prev| cards.get(prev)))
            .map(|card| card.id.clone())
    }

    fn remove_selected_row(&mut self) {
        let (Some(id), Some(row)) = (self.selected_id.clone(), self.selected_row) else {
            return;
        };
        let Some(row_id) = self
            .selected_card()
            .and_then(|card| card.rows.get(row))
            .map(|row| row.id.clone())
        else {
            return;
        };
        let removed = self.board.remove_row(&id, &row_id);
        self.persist(removed);
        self.repair_selection();
    }

    fn arrow(&mut self, direction: Direction, shift: bool) {
        let Some(idx) = self.selected_index() else {
            self.repair_selection();
            return;
        };
        let arranged = self.arranged();
        if !shift {
            if let Some(next) = ui_helpers::neighbor(&arranged, idx, direction) {
                let id = self.board.cards()[next].id.clone();
                self.select(Some(id));
            }
            return;
        }

        let current = arranged[idx].clone();
        let cards = self.board.cards();
        let id = cards[idx].id.clone();
        // Vertical moves swap with the card stacked above or below.
        let moved = match direction {
            Direction::Left if current.x > 0 => {
                self.board.move_card(&id, current.x - 1, current.y, self.cols)
            }
            Direction::Right if current.x + current.w < self.cols => {
                self.board.move_card(&id, current.x + 1, current.y, self.cols)
            }
            Direction::Up => match ui_helpers::card_above(&arranged, idx) {
                Some(above) => self
                    .board
                    .move_card(&id, current.x, arranged[above].y, self.cols),
                None => Ok(false),
            },
            Direction::Down => match ui_helpers::card_below(&arranged, idx) {
                Some(below) => {
                    let below_id = cards[below].id.clone();
                    let target = &arranged[below];
                    self.board
                        .move_card(&below_id, target.x, current.y, self.cols)
                }
                None => Ok(false),
            },
            _ => Ok(false),
        };
        self.persist(moved);
        self.follow_selection = true;
    }

    fn resize_selected(&mut self, dw: i32, dh: i32) {
        let Some(idx) = self.selected_index() else {
            return;
        };
        let current = self.arranged()[idx].clone();
        let w = (current.w as i32 + dw).clamp(1, self.cols.max(1) as i32) as u32;
        let h = (current.h as i32 + dh).max(1) as u32;
        if (w, h) == (current.w, current.h) {
            return;
        }
        let id = current.i.clone();
        let resized = self.board.resize_card(&id, w, h, self.cols);
        self.persist(resized);
        self.follow_selection = true;
    }

    pub(super) fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if self.ui_mode != UiMode::Board {
                    return;
                }
                if self.picker.is_open() {
                    if let Some(rect) = self.popover_rect
                        && ui_helpers::contains(rect, mouse.column, mouse.row)
                    {
                        if let Some(idx) = swatch_at(rect, mouse.column, mouse.row)
                            && let Some(card_id) = self.picker.open_for().map(str::to_string)
                        {
                            let swatch = self.picker.pick_swatch(idx);
                            let changed = self.board.set_color(&card_id, swatch);
                            self.persist(changed);
                        }
                        self.render_needed = true;
                        return;
                    }
                    self.picker.close();
                    self.render_needed = true;
                }
                let hit = self
                    .card_hits
                    .iter()
                    .find(|(_, rect)| ui_helpers::contains(*rect, mouse.column, mouse.row))
                    .map(|(id, _)| id.clone());
                if hit.is_some() {
                    self.select(hit);
                }
            }
            MouseEventKind::ScrollDown => {
                self.scroll = self.scroll.saturating_add(TUI.row_cells);
                self.follow_selection = false;
                self.render_needed = true;
            }
            MouseEventKind::ScrollUp => {
                self.scroll = self.scroll.saturating_sub(TUI.row_cells);
                self.follow_selection = false;
                self.render_needed = true;
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use ratatui::layout::Rect;

    use super::*;
    use crate::{app::tests::test_app, constants::PALETTE};

    fn press(app: &mut App, code: KeyCode) -> bool {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn shift(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::SHIFT));
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn click(app: &mut App, column: u16, row: u16) {
        app.handle_mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        });
    }

    #[test]
    fn test_quit_key() {
        let mut app = test_app();
        assert!(!press(&mut app, KeyCode::Char('z')));
        assert!(press(&mut app, KeyCode::Char('q')));
    }

    #[test]
    fn test_add_card_opens_title_editor() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('a'));
        assert_eq!(app.ui_mode, UiMode::EditTitle);
        let id = app.selected_id.clone().unwrap();
        assert_eq!(app.board.card(&id).unwrap().title, "New Card");

        type_text(&mut app, "Deli");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.ui_mode, UiMode::Board);
        assert_eq!(app.board.card(&id).unwrap().title, "Deli");
    }

    #[test]
    fn test_blank_title_keeps_default() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('a'));
        press(&mut app, KeyCode::Enter);
        let id = app.selected_id.clone().unwrap();
        assert_eq!(app.board.card(&id).unwrap().title, "New Card");
    }

    #[test]
    fn test_escape_discards_title_edit() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('t'));
        type_text(&mut app, " and more");
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.board.card("a").unwrap().title, "Groceries");
    }

    #[test]
    fn test_row_entry_select_and_remove() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('r'));
        type_text(&mut app, "Eggs");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "3.20");
        press(&mut app, KeyCode::Enter);

        let card = app.board.card("a").unwrap();
        assert_eq!(card.rows.len(), 3);
        assert_eq!(card.rows[2].item, "Eggs");
        assert_eq!(card.rows[2].price, "3.20");
        assert_eq!(app.selected_row, Some(2));

        press(&mut app, KeyCode::Char(']'));
        assert_eq!(app.selected_row, Some(0));
        press(&mut app, KeyCode::Char('['));
        assert_eq!(app.selected_row, Some(2));

        press(&mut app, KeyCode::Char('d'));
        let card = app.board.card("a").unwrap();
        assert_eq!(card.rows.len(), 2);
        assert_eq!(app.selected_row, Some(1));
    }

    #[test]
    fn test_blank_row_item_is_not_added() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('r'));
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "5");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.ui_mode, UiMode::AddRow);
        assert_eq!(app.row_field, RowField::Item);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.board.card("a").unwrap().rows.len(), 2);
    }

    #[test]
    fn test_remove_card_moves_selection() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('x'));
        assert!(app.board.card("a").is_none());
        assert_eq!(app.selected_id.as_deref(), Some("b"));
    }

    #[test]
    fn test_arrows_select_neighbours() {
        let mut app = test_app();
        press(&mut app, KeyCode::Right);
        assert_eq!(app.selected_id.as_deref(), Some("b"));
        press(&mut app, KeyCode::Right);
        assert_eq!(app.selected_id.as_deref(), Some("c"));
        press(&mut app, KeyCode::Left);
        assert_eq!(app.selected_id.as_deref(), Some("b"));
    }

    #[test]
    fn test_shift_right_moves_and_pushes() {
        let mut app = test_app();
        shift(&mut app, KeyCode::Right);
        assert_eq!(app.board.card("a").unwrap().layout.x, 1);
        assert_eq!(app.board.card("b").unwrap().layout.y, 2);
    }

    #[test]
    fn test_shift_down_and_up_swap_stacked_cards() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('a'));
        press(&mut app, KeyCode::Enter);
        let new_id = app.selected_id.clone().unwrap();
        assert_eq!(app.arranged().last().unwrap().y, 1);

        app.select(Some("b".to_string()));
        shift(&mut app, KeyCode::Down);
        assert_eq!(app.board.card(&new_id).unwrap().layout.y, 0);
        assert_eq!(app.board.card("b").unwrap().layout.y, 2);

        shift(&mut app, KeyCode::Up);
        assert_eq!(app.board.card("b").unwrap().layout.y, 0);
        assert_eq!(app.board.card(&new_id).unwrap().layout.y, 1);
    }

    #[test]
    fn test_resize_keys() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('+'));
        press(&mut app, KeyCode::Char('>'));
        let layout = &app.board.card("a").unwrap().layout;
        assert_eq!((layout.w, layout.h), (2, 3));

        for _ in 0..5 {
            press(&mut app, KeyCode::Char('-'));
        }
        assert_eq!(app.board.card("a").unwrap().layout.h, 1);
    }

    #[test]
    fn test_palette_cycling_persists_colour() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('p'));
        assert_eq!(app.picker.open_for(), Some("a"));
        press(&mut app, KeyCode::Right);
        assert_eq!(app.board.card("a").unwrap().color, PALETTE[1]);
        press(&mut app, KeyCode::Esc);
        assert!(!app.picker.is_open());
    }

    #[test]
    fn test_custom_colour_applies_on_enter() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('p'));
        press(&mut app, KeyCode::Char('c'));
        press(&mut app, KeyCode::Down);
        assert_eq!(app.board.card("a").unwrap().color, PALETTE[0]);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.board.card("a").unwrap().color, "#D8EAF6");
        assert!(!app.picker.is_open());
    }

    #[test]
    fn test_click_selects_and_outside_click_closes_popover() {
        let mut app = test_app();
        app.card_hits = vec![
            ("a".to_string(), Rect::new(1, 1, 30, 7)),
            ("c".to_string(), Rect::new(63, 1, 60, 11)),
        ];
        click(&mut app, 70, 5);
        assert_eq!(app.selected_id.as_deref(), Some("c"));

        press(&mut app, KeyCode::Char('p'));
        app.popover_rect = Some(Rect::new(63, 12, 30, 9));
        click(&mut app, 69, 13);
        assert_eq!(app.board.card("c").unwrap().color, PALETTE[1]);
        assert!(app.picker.is_open());

        click(&mut app, 2, 2);
        assert!(!app.picker.is_open());
        assert_eq!(app.selected_id.as_deref(), Some("a"));
    }

    #[test]
    fn test_reload_picks_up_stored_state() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('x'));
        press(&mut app, KeyCode::Char('R'));
        assert_eq!(app.board.cards().len(), 2);
        assert_eq!(app.selected_id.as_deref(), Some("b"));
    }
}
