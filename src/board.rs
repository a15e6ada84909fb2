use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::{debug, info};

use crate::{
    color,
    constants::CARD_DEFAULTS,
    domain::{Card, CardPatch, Layout, default_title, new_id, new_row},
    layout,
    storage::{self, SlotStore, StorageError},
};

pub fn add_card<R: Rng + ?Sized>(cards: &[Card], rng: &mut R) -> (Vec<Card>, String) {
    let id = new_id(rng);
    let existing: Vec<Layout> = cards.iter().map(|card| card.layout.clone()).collect();
    let card = Card {
        id: id.clone(),
        title: default_title(),
        color: color::random_palette_color(rng),
        rows: Vec::new(),
        layout: layout::initial_placement(&id, &existing),
    };

    let mut next = cards.to_vec();
    next.push(card);
    (next, id)
}

pub fn update_card(cards: &[Card], card_id: &str, patch: &CardPatch) -> Vec<Card> {
    cards
        .iter()
        .map(|card| {
            if card.id != card_id {
                return card.clone();
            }
            let mut updated = card.clone();
            if let Some(title) = &patch.title {
                updated.title = title.clone();
            }
            if let Some(color) = &patch.color {
                updated.color = color.clone();
            }
            if let Some(rows) = &patch.rows {
                updated.rows = rows.clone();
            }
            if let Some(layout) = &patch.layout {
                updated.layout = Layout {
                    i: updated.id.clone(),
                    ..layout.clone()
                };
            }
            updated
        })
        .collect()
}

pub fn remove_card(cards: &[Card], card_id: &str) -> Vec<Card> {
    cards
        .iter()
        .filter(|card| card.id != card_id)
        .cloned()
        .collect()
}

pub fn apply_layout(cards: &[Card], entries: &[Layout]) -> Vec<Card> {
    entries.iter().fold(cards.to_vec(), |acc, entry| {
        update_card(&acc, &entry.i, &CardPatch::layout(entry.clone()))
    })
}

pub fn add_row<R: Rng + ?Sized>(
    cards: &[Card],
    card_id: &str,
    item: &str,
    price: &str,
    rng: &mut R,
) -> Vec<Card> {
    let item = item.trim();
    if item.is_empty() {
        return cards.to_vec();
    }
    let Some(card) = cards.iter().find(|card| card.id == card_id) else {
        return cards.to_vec();
    };

    let price = match price.trim() {
        "" => CARD_DEFAULTS.blank_price,
        typed => typed,
    };
    let mut rows = card.rows.clone();
    rows.push(new_row(rng, item, price));
    update_card(cards, card_id, &CardPatch::rows(rows))
}

pub fn remove_row(cards: &[Card], card_id: &str, row_id: &str) -> Vec<Card> {
    let Some(card) = cards.iter().find(|card| card.id == card_id) else {
        return cards.to_vec();
    };
    let rows = card
        .rows
        .iter()
        .filter(|row| row.id != row_id)
        .cloned()
        .collect();
    update_card(cards, card_id, &CardPatch::rows(rows))
}

pub struct BoardStore<S: SlotStore> {
    store: S,
    cards: Vec<Card>,
    rng: StdRng,
}

impl<S: SlotStore> BoardStore<S> {
    pub fn open(store: S) -> Self {
        Self::open_with_rng(store, StdRng::from_entropy())
    }

    pub fn open_with_rng(store: S, mut rng: StdRng) -> Self {
        let cards = storage::load_cards(&store, &mut rng);
        info!(cards = cards.len(), "board loaded");
        Self { store, cards, rng }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn card(&self, card_id: &str) -> Option<&Card> {
        self.cards.iter().find(|card| card.id == card_id)
    }

    pub fn card_index(&self, card_id: &str) -> Option<usize> {
        self.cards.iter().position(|card| card.id == card_id)
    }

    pub fn layouts(&self) -> Vec<Layout> {
        self.cards.iter().map(|card| card.layout.clone()).collect()
    }

    pub fn save(&self) -> Result<(), StorageError> {
        storage::save_cards(&self.store, &self.cards)
    }

    pub fn reload(&mut self) {
        self.cards = storage::load_cards(&self.store, &mut self.rng);
        debug!(cards = self.cards.len(), "board reloaded");
    }

    fn commit(&mut self, next: Vec<Card>) -> Result<bool, StorageError> {
        if next == self.cards {
            return Ok(false);
        }
        self.cards = next;
        self.save()?;
        Ok(true)
    }

    pub fn import(&mut self, cards: Vec<Card>) -> Result<usize, StorageError> {
        let cards = storage::normalize_cards(cards);
        let count = cards.len();
        self.cards = cards;
        self.save()?;
        info!(cards = count, "board imported");
        Ok(count)
    }

    pub fn add_card(&mut self) -> Result<String, StorageError> {
        let (next, id) = add_card(&self.cards, &mut self.rng);
        self.commit(next)?;
        info!(card = %id, "card added");
        Ok(id)
    }

    pub fn update_card(&mut self, card_id: &str, patch: &CardPatch) -> Result<bool, StorageError> {
        if patch.is_empty() {
            return Ok(false);
        }
        let next = update_card(&self.cards, card_id, patch);
        self.commit(next)
    }

    pub fn rename_card(&mut self, card_id: &str, title: &str) -> Result<bool, StorageError> {
        let title = title.trim();
        if title.is_empty() {
            return Ok(false);
        }
        self.update_card(card_id, &CardPatch::title(title))
    }

    pub fn set_color(&mut self, card_id: &str, color: &str) -> Result<bool, StorageError> {
        let Some(color) = color::normalize_hex(color) else {
            return Ok(false);
        };
        self.update_card(card_id, &CardPatch::color(color))
    }

    pub fn remove_card(&mut self, card_id: &str) -> Result<bool, StorageError> {
        let next = remove_card(&self.cards, card_id);
        let changed = self.commit(next)?;
        if changed {
            info!(card = %card_id, "card removed");
        }
        Ok(changed)
    }

    pub fn apply_layout(&mut self, entries: &[Layout]) -> Result<bool, StorageError> {
        let next = apply_layout(&self.cards, entries);
        self.commit(next)
    }

    pub fn add_row(
        &mut self,
        card_id: &str,
        item: &str,
        price: &str,
    ) -> Result<Option<String>, StorageError> {
        let next = add_row(&self.cards, card_id, item, price, &mut self.rng);
        if !self.commit(next)? {
            return Ok(None);
        }
        Ok(self
            .card(card_id)
            .and_then(|card| card.rows.last())
            .map(|row| row.id.clone()))
    }

    pub fn remove_row(&mut self, card_id: &str, row_id: &str) -> Result<bool, StorageError> {
        let next = remove_row(&self.cards, card_id, row_id);
        self.commit(next)
    }

    pub fn move_card(
        &mut self,
        card_id: &str,
        x: u32,
        y: u32,
        cols: u32,
    ) -> Result<bool, StorageError> {
        if self.card(card_id).is_none() {
            return Ok(false);
        }
        let arranged = layout::move_item(&self.layouts(), card_id, x, y, cols);
        self.apply_layout(&arranged)
    }

    pub fn resize_card(
        &mut self,
        card_id: &str,
        w: u32,
        h: u32,
        cols: u32,
    ) -> Result<bool, StorageError> {
        if self.card(card_id).is_none() {
            return Ok(false);
        }
        let arranged = layout::resize_item(&self.layouts(), card_id, w, h, cols);
        self.apply_layout(&arranged)
    }
}
