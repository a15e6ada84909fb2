use crate::{
    constants::{Breakpoint, GRID},
    domain::Layout,
};

pub trait LayoutEngine {
    fn arrange(&self, items: &[Layout], cols: u32) -> Vec<Layout>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct CompactGrid;

impl LayoutEngine for CompactGrid {
    fn arrange(&self, items: &[Layout], cols: u32) -> Vec<Layout> {
        compact(items, cols)
    }
}

pub fn breakpoint_for_width(width_px: u32) -> &'static Breakpoint {
    GRID.breakpoints
        .iter()
        .find(|bp| width_px >= bp.min_width)
        .unwrap_or(&GRID.breakpoints[GRID.breakpoints.len() - 1])
}

pub fn columns_for_width(width_px: u32) -> u32 {
    breakpoint_for_width(width_px).cols as u32
}

pub fn max_columns() -> u32 {
    GRID.breakpoints
        .iter()
        .map(|bp| bp.cols as u32)
        .max()
        .unwrap_or(1)
}

pub fn collides(a: &Layout, b: &Layout) -> bool {
    a.x < b.x.saturating_add(b.w)
        && b.x < a.x.saturating_add(a.w)
        && a.y < b.y.saturating_add(b.h)
        && b.y < a.y.saturating_add(a.h)
}

pub fn bottom(items: &[Layout]) -> u32 {
    items
        .iter()
        .map(|item| item.y.saturating_add(item.h))
        .max()
        .unwrap_or(0)
}

// Staggered column, appended below everything else.
pub fn initial_placement(id: &str, existing: &[Layout]) -> Layout {
    let count = existing.len() as u32;
    let x = (count * GRID.add_stride) % max_columns();
    Layout::new(id, x, bottom(existing), GRID.default_w, GRID.default_h)
}

fn fit_to_columns(item: &mut Layout, cols: u32) {
    let cols = cols.max(1);
    item.w = item.w.clamp(1, cols);
    item.h = item.h.clamp(1, GRID.max_h);
    item.x = item.x.min(cols - item.w);
    item.y = item.y.min(GRID.max_row);
}

fn hits<'a>(item: &Layout, placed: &'a [Layout]) -> Option<&'a Layout> {
    placed.iter().find(|other| collides(item, other))
}

pub fn compact(items: &[Layout], cols: u32) -> Vec<Layout> {
    compact_with_priority(items, cols, None)
}

// On equal rows the dragged item goes first.
fn compact_with_priority(items: &[Layout], cols: u32, priority: Option<&str>) -> Vec<Layout> {
    let mut order: Vec<usize> = (0..items.len()).collect();
    order.sort_by_key(|&idx| {
        let item = &items[idx];
        (item.y, priority != Some(item.i.as_str()), item.x)
    });

    let mut placed: Vec<Layout> = Vec::with_capacity(items.len());
    let mut arranged: Vec<Option<Layout>> = vec![None; items.len()];

    for idx in order {
        let mut item = items[idx].clone();
        fit_to_columns(&mut item, cols);

        item.y = item.y.min(bottom(&placed));
        while item.y > 0 {
            let probe = Layout {
                y: item.y - 1,
                ..item.clone()
            };
            if hits(&probe, &placed).is_some() {
                break;
            }
            item.y -= 1;
        }
        while let Some(hit) = hits(&item, &placed) {
            item.y = hit.y.saturating_add(hit.h);
        }

        placed.push(item.clone());
        arranged[idx] = Some(item);
    }

    arranged.into_iter().flatten().collect()
}

fn push_colliders_down(items: &mut [Layout], anchor_idx: usize) {
    let mut pending = vec![anchor_idx];
    while let Some(anchor) = pending.pop() {
        for idx in 0..items.len() {
            if idx == anchor || idx == anchor_idx {
                continue;
            }
            if collides(&items[anchor], &items[idx]) {
                items[idx].y = items[anchor].y.saturating_add(items[anchor].h);
                pending.push(idx);
            }
        }
    }
}

pub fn move_item(items: &[Layout], id: &str, x: u32, y: u32, cols: u32) -> Vec<Layout> {
    let mut moved = items.to_vec();
    for item in moved.iter_mut() {
        fit_to_columns(item, cols);
    }
    let Some(idx) = moved.iter().position(|item| item.i == id) else {
        return compact(&moved, cols);
    };

    moved[idx].x = x;
    moved[idx].y = y;
    fit_to_columns(&mut moved[idx], cols);
    push_colliders_down(&mut moved, idx);
    compact_with_priority(&moved, cols, Some(id))
}

pub fn resize_item(items: &[Layout], id: &str, w: u32, h: u32, cols: u32) -> Vec<Layout> {
    let mut resized = items.to_vec();
    for item in resized.iter_mut() {
        fit_to_columns(item, cols);
    }
    let Some(idx) = resized.iter().position(|item| item.i == id) else {
        return compact(&resized, cols);
    };

    resized[idx].w = w;
    resized[idx].h = h;
    fit_to_columns(&mut resized[idx], cols);
    push_colliders_down(&mut resized, idx);
    compact_with_priority(&resized, cols, Some(id))
}
