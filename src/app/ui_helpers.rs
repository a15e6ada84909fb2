use ratatui::layout::Rect;

use crate::{constants::TUI, domain::Layout, layout};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

pub fn wrap_prev_index(current: usize, len: usize) -> usize {
    if len == 0 {
        0
    } else if current == 0 {
        len - 1
    } else {
        current - 1
    }
}

pub fn wrap_next_index(current: usize, len: usize) -> usize {
    if len == 0 || current + 1 >= len {
        0
    } else {
        current + 1
    }
}

pub fn columns_for_terminal(width: u16) -> u32 {
    layout::columns_for_width(width as u32 * TUI.cell_px)
}

pub fn breakpoint_label(width: u16) -> &'static str {
    layout::breakpoint_for_width(width as u32 * TUI.cell_px).name
}

fn column_width(area_width: u16, cols: u32) -> u32 {
    (area_width as u32 / cols.max(1)).max(1)
}

pub fn vertical_span(layout: &Layout) -> (u32, u32) {
    let row = TUI.row_cells as u32;
    let height = layout
        .h
        .saturating_mul(row)
        .saturating_sub(TUI.gutter as u32)
        .max(1);
    (layout.y.saturating_mul(row), height)
}

pub fn content_height(layouts: &[Layout]) -> u32 {
    layout::bottom(layouts).saturating_mul(TUI.row_cells as u32)
}

pub fn card_rect(layout: &Layout, area: Rect, cols: u32, scroll: u16) -> Option<Rect> {
    let col_w = column_width(area.width, cols);
    let left = (area.x as u32).saturating_add(layout.x.saturating_mul(col_w));
    let right = left
        .saturating_add(layout.w.saturating_mul(col_w).saturating_sub(TUI.gutter as u32))
        .min(area.x as u32 + area.width as u32);
    let (top, height) = vertical_span(layout);

    let view_top = scroll as u32;
    let view_bottom = view_top + area.height as u32;
    let visible_top = top.max(view_top);
    let visible_bottom = top.saturating_add(height).min(view_bottom);
    if visible_bottom <= visible_top || right <= left {
        return None;
    }

    Some(Rect::new(
        left as u16,
        area.y + (visible_top - view_top) as u16,
        (right - left) as u16,
        (visible_bottom - visible_top) as u16,
    ))
}

pub fn scroll_to_reveal(scroll: u16, top: u32, height: u32, view_height: u16) -> u16 {
    let scroll_u = scroll as u32;
    let view = view_height as u32;
    let next = if top < scroll_u {
        top
    } else if top + height > scroll_u + view {
        (top + height).saturating_sub(view).min(top)
    } else {
        scroll_u
    };
    next.min(u16::MAX as u32) as u16
}

pub fn clamp_scroll(scroll: u16, content_height: u32, view_height: u16) -> u16 {
    let max = content_height.saturating_sub(view_height as u32);
    (scroll as u32).min(max) as u16
}

pub fn neighbor(layouts: &[Layout], from: usize, direction: Direction) -> Option<usize> {
    let origin = layouts.get(from)?;
    let center = |l: &Layout| (2 * l.x as i64 + l.w as i64, 2 * l.y as i64 + l.h as i64);
    let (ox, oy) = center(origin);

    layouts
        .iter()
        .enumerate()
        .filter(|(idx, _)| *idx != from)
        .filter_map(|(idx, c)| {
            let (cx, cy) = center(c);
            let (gap, offset) = match direction {
                Direction::Left => (origin.x as i64 - (c.x as i64 + c.w as i64), (cy - oy).abs()),
                Direction::Right => (c.x as i64 - (origin.x as i64 + origin.w as i64), (cy - oy).abs()),
                Direction::Up => (origin.y as i64 - (c.y as i64 + c.h as i64), (cx - ox).abs()),
                Direction::Down => (c.y as i64 - (origin.y as i64 + origin.h as i64), (cx - ox).abs()),
            };
            (gap >= 0).then_some((gap, offset, idx))
        })
        .min()
        .map(|(_, _, idx)| idx)
}

fn shares_columns(a: &Layout, b: &Layout) -> bool {
    a.x < b.x.saturating_add(b.w) && b.x < a.x.saturating_add(a.w)
}

pub fn card_above(layouts: &[Layout], idx: usize) -> Option<usize> {
    let current = layouts.get(idx)?;
    layouts
        .iter()
        .enumerate()
        .filter(|(other, l)| *other != idx && shares_columns(current, l) && l.y.saturating_add(l.h) <= current.y)
        .max_by_key(|(_, l)| l.y.saturating_add(l.h))
        .map(|(other, _)| other)
}

pub fn card_below(layouts: &[Layout], idx: usize) -> Option<usize> {
    let current = layouts.get(idx)?;
    layouts
        .iter()
        .enumerate()
        .filter(|(other, l)| *other != idx && shares_columns(current, l) && l.y >= current.y.saturating_add(current.h))
        .min_by_key(|(_, l)| l.y)
        .map(|(other, _)| other)
}

pub fn popover_rect(anchor: Rect, area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = anchor.x.min(area.right().saturating_sub(width)).max(area.x);
    let y = if anchor.bottom() + height <= area.bottom() {
        anchor.bottom()
    } else {
        anchor
            .y
            .saturating_sub(height)
            .max(area.y)
            .min(area.bottom().saturating_sub(height))
    };
    Rect::new(x, y, width, height)
}

pub fn contains(rect: Rect, column: u16, row: u16) -> bool {
    column >= rect.x && column < rect.right() && row >= rect.y && row < rect.bottom()
}
