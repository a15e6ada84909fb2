use std::{io, time::Duration};

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend, layout::Rect};
use tracing::{error, info};

use crate::{
    board::BoardStore,
    config::Settings,
    constants::TUI,
    domain::{Card, Layout},
    layout::{CompactGrid, LayoutEngine},
    storage::{SlotStore, StorageError},
};

mod card_view;
mod color_picker;
mod event_handlers;
mod grid_view;
mod ui_helpers;
mod view_style;

use color_picker::ColorPickerState;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum UiMode {
    Board,
    EditTitle,
    AddRow,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RowField {
    Item,
    Price,
}

struct App {
    board: BoardStore<Box<dyn SlotStore>>,
    engine: CompactGrid,
    ui_mode: UiMode,
    selected_id: Option<String>,
    selected_row: Option<usize>,
    title_draft: String,
    row_item: String,
    row_price: String,
    row_field: RowField,
    picker: ColorPickerState,
    cols: u32,
    scroll: u16,
    view_height: u16,
    follow_selection: bool,
    card_hits: Vec<(String, Rect)>,
    popover_rect: Option<Rect>,
    status: Option<String>,
    render_needed: bool,
}

impl App {
    fn new(board: BoardStore<Box<dyn SlotStore>>, width: u16) -> Self {
        let selected_id = board.cards().first().map(|card| card.id.clone());
        Self {
            board,
            engine: CompactGrid,
            ui_mode: UiMode::Board,
            selected_id,
            selected_row: None,
            title_draft: String::new(),
            row_item: String::new(),
            row_price: String::new(),
            row_field: RowField::Item,
            picker: ColorPickerState::default(),
            cols: ui_helpers::columns_for_terminal(width),
            scroll: 0,
            view_height: 0,
            follow_selection: true,
            card_hits: Vec::new(),
            popover_rect: None,
            status: None,
            render_needed: true,
        }
    }

    fn arranged(&self) -> Vec<Layout> {
        self.engine.arrange(&self.board.layouts(), self.cols)
    }

    fn selected_card(&self) -> Option<&Card> {
        self.selected_id.as_deref().and_then(|id| self.board.card(id))
    }

    fn selected_index(&self) -> Option<usize> {
        self.selected_id
            .as_deref()
            .and_then(|id| self.board.card_index(id))
    }

    fn select(&mut self, card_id: Option<String>) {
        if self.selected_id != card_id {
            self.selected_row = None;
        }
        self.selected_id = card_id;
        self.follow_selection = true;
        self.render_needed = true;
    }

    fn repair_selection(&mut self) {
        if self.selected_card().is_none() {
            let first = self.board.cards().first().map(|card| card.id.clone());
            self.select(first);
        }
        let row_count = self.selected_card().map_or(0, |card| card.rows.len());
        if self.selected_row.is_some_and(|row| row >= row_count) {
            self.selected_row = row_count.checked_sub(1);
        }
        if let Some(open_for) = self.picker.open_for()
            && self.board.card(open_for).is_none()
        {
            self.picker.close();
        }
    }

    fn persist<T: Default>(&mut self, result: Result<T, StorageError>) -> T {
        self.render_needed = true;
        match result {
            Ok(value) => {
                self.status = None;
                value
            }
            Err(e) => {
                error!(error = %e, "saving board failed");
                self.status = Some(format!("Save failed: {}", e));
                T::default()
            }
        }
    }

    fn begin_title_edit(&mut self, draft: String) {
        self.picker.close();
        self.title_draft = draft;
        self.ui_mode = UiMode::EditTitle;
        self.render_needed = true;
    }

    fn begin_row_entry(&mut self) {
        self.picker.close();
        self.row_item.clear();
        self.row_price.clear();
        self.row_field = RowField::Item;
        self.ui_mode = UiMode::AddRow;
        self.render_needed = true;
    }

    fn end_entry(&mut self) {
        self.ui_mode = UiMode::Board;
        self.title_draft.clear();
        self.row_item.clear();
        self.row_price.clear();
        self.render_needed = true;
    }
}

pub fn run_ui(settings: &Settings) -> Result<(), io::Error> {
    let board = BoardStore::open(settings.slot_store());
    info!(
        data_dir = %settings.data_dir.display(),
        ephemeral = settings.ephemeral,
        "dashboard starting"
    );

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let size = terminal.size()?;
    let mut app = App::new(board, size.width);
    let tick_rate = Duration::from_millis(TUI.tick_ms);

    loop {
        if app.render_needed {
            terminal.draw(|f| {
                app.draw_frame(f);
            })?;
            app.render_needed = false;
        }

        if !event::poll(tick_rate)? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if app.handle_key(key) {
                    break;
                }
            }
            Event::Mouse(mouse) => app.handle_mouse(mouse),
            Event::Resize(_, _) => app.render_needed = true,
            _ => {}
        }
    }

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    Ok(())
}
