use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::{CARD_DEFAULTS, GRID, PALETTE};

// `i` always mirrors the owning card's id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    pub i: String,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Layout {
    pub fn new(i: impl Into<String>, x: u32, y: u32, w: u32, h: u32) -> Self {
        Self {
            i: i.into(),
            x,
            y,
            w,
            h,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub id: String,
    pub item: String,
    pub price: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub title: String,
    pub color: String,
    #[serde(default)]
    pub rows: Vec<Row>,
    pub layout: Layout,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CardPatch {
    pub title: Option<String>,
    pub color: Option<String>,
    pub rows: Option<Vec<Row>>,
    pub layout: Option<Layout>,
}

impl CardPatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn color(color: impl Into<String>) -> Self {
        Self {
            color: Some(color.into()),
            ..Self::default()
        }
    }

    pub fn rows(rows: Vec<Row>) -> Self {
        Self {
            rows: Some(rows),
            ..Self::default()
        }
    }

    pub fn layout(layout: Layout) -> Self {
        Self {
            layout: Some(layout),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.color.is_none() && self.rows.is_none() && self.layout.is_none()
    }
}

pub fn new_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut bytes = [0u8; 16];
    rng.fill(&mut bytes[..]);
    let mut hex = String::with_capacity(36);
    for (index, byte) in bytes.iter().enumerate() {
        let byte = match index {
            6 => (byte & 0x0f) | 0x40,
            8 => (byte & 0x3f) | 0x80,
            _ => *byte,
        };
        if matches!(index, 4 | 6 | 8 | 10) {
            hex.push('-');
        }
        hex.push_str(&format!("{:02x}", byte));
    }
    hex
}

pub fn new_row<R: Rng + ?Sized>(rng: &mut R, item: &str, price: &str) -> Row {
    Row {
        id: new_id(rng),
        item: item.to_string(),
        price: price.to_string(),
    }
}

pub fn seed_cards<R: Rng + ?Sized>(rng: &mut R) -> Vec<Card> {
    vec![
        Card {
            id: "a".to_string(),
            title: "Groceries".to_string(),
            color: PALETTE[0].to_string(),
            rows: vec![new_row(rng, "Milk", "2"), new_row(rng, "Bread", "1.50")],
            layout: Layout::new("a", 0, 0, GRID.default_w, GRID.default_h),
        },
        Card {
            id: "b".to_string(),
            title: "Work Tasks".to_string(),
            color: PALETTE[1].to_string(),
            rows: vec![new_row(rng, "Finish report", "EOD")],
            layout: Layout::new("b", 1, 0, 1, 1),
        },
        Card {
            id: "c".to_string(),
            title: "Project Ideas".to_string(),
            color: PALETTE[2].to_string(),
            rows: Vec::new(),
            layout: Layout::new("c", 2, 0, 2, 3),
        },
    ]
}

pub fn default_title() -> String {
    CARD_DEFAULTS.title.to_string()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn test_new_id_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        let id = new_id(&mut rng);
        assert_eq!(id.len(), 36);
        let groups: Vec<&str> = id.split('-').collect();
        assert_eq!(
            groups.iter().map(|g| g.len()).collect::<Vec<_>>(),
            vec![8, 4, 4, 4, 12]
        );
        assert!(groups[2].starts_with('4'));
    }

    #[test]
    fn test_new_id_is_unique_across_draws() {
        let mut rng = StdRng::seed_from_u64(11);
        let ids: HashSet<String> = (0..500).map(|_| new_id(&mut rng)).collect();
        assert_eq!(ids.len(), 500);
    }

    #[test]
    fn test_seed_cards_match_fixed_sample() {
        let mut rng = StdRng::seed_from_u64(1);
        let cards = seed_cards(&mut rng);

        let ids: Vec<&str> = cards.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(cards[0].title, "Groceries");
        assert_eq!(cards[1].title, "Work Tasks");
        assert_eq!(cards[2].title, "Project Ideas");

        let groceries: Vec<(&str, &str)> = cards[0]
            .rows
            .iter()
            .map(|r| (r.item.as_str(), r.price.as_str()))
            .collect();
        assert_eq!(groceries, vec![("Milk", "2"), ("Bread", "1.50")]);
        assert_eq!(cards[1].rows[0].price, "EOD");
        assert!(cards[2].rows.is_empty());

        assert_eq!(cards[0].layout, Layout::new("a", 0, 0, 1, 2));
        assert_eq!(cards[1].layout, Layout::new("b", 1, 0, 1, 1));
        assert_eq!(cards[2].layout, Layout::new("c", 2, 0, 2, 3));
    }

    #[test]
    fn test_card_json_uses_layout_key_i() {
        let card = Card {
            id: "z".to_string(),
            title: "T".to_string(),
            color: "#FFF9C4".to_string(),
            rows: Vec::new(),
            layout: Layout::new("z", 3, 4, 1, 2),
        };
        let json = serde_json::to_value(&card).unwrap();
        assert_eq!(json["layout"]["i"], "z");
        assert_eq!(json["layout"]["x"], 3);
    }

    #[test]
    fn test_patch_is_empty() {
        assert!(CardPatch::default().is_empty());
        assert!(!CardPatch::title("x").is_empty());
    }
}
