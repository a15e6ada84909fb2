use rand::{Rng, seq::SliceRandom};

use crate::constants::PALETTE;

pub fn random_palette_color<R: Rng + ?Sized>(rng: &mut R) -> String {
    PALETTE
        .choose(rng)
        .copied()
        .unwrap_or(PALETTE[0])
        .to_string()
}

pub fn palette_index(color: &str) -> Option<usize> {
    PALETTE
        .iter()
        .position(|candidate| candidate.eq_ignore_ascii_case(color))
}

pub fn parse_hex(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.trim().trim_start_matches('#');
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some((r, g, b))
        }
        3 => {
            let expand = |idx: usize| u8::from_str_radix(&hex[idx..idx + 1], 16).ok().map(|v| v * 17);
            Some((expand(0)?, expand(1)?, expand(2)?))
        }
        _ => None,
    }
}

pub fn format_hex((r, g, b): (u8, u8, u8)) -> String {
    format!("#{:02X}{:02X}{:02X}", r, g, b)
}

pub fn normalize_hex(color: &str) -> Option<String> {
    parse_hex(color).map(format_hex)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl Channel {
    pub fn next(self) -> Self {
        match self {
            Channel::Red => Channel::Green,
            Channel::Green => Channel::Blue,
            Channel::Blue => Channel::Red,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Channel::Red => Channel::Blue,
            Channel::Green => Channel::Red,
            Channel::Blue => Channel::Green,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Channel::Red => "R",
            Channel::Green => "G",
            Channel::Blue => "B",
        }
    }
}

pub fn adjust_channel(rgb: (u8, u8, u8), channel: Channel, delta: i16) -> (u8, u8, u8) {
    let shift = |value: u8| (value as i16 + delta).clamp(0, 255) as u8;
    let (r, g, b) = rgb;
    match channel {
        Channel::Red => (shift(r), g, b),
        Channel::Green => (r, shift(g), b),
        Channel::Blue => (r, g, shift(b)),
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn test_random_palette_color_is_from_palette() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..50 {
            let color = random_palette_color(&mut rng);
            assert!(palette_index(&color).is_some());
        }
    }

    #[test]
    fn test_parse_hex_forms() {
        assert_eq!(parse_hex("#E8EAF6"), Some((0xE8, 0xEA, 0xF6)));
        assert_eq!(parse_hex("e8eaf6"), Some((0xE8, 0xEA, 0xF6)));
        assert_eq!(parse_hex("#fff"), Some((255, 255, 255)));
        assert_eq!(parse_hex("#12345"), None);
        assert_eq!(parse_hex("#GGGGGG"), None);
        assert_eq!(parse_hex("#ééé"), None);
    }

    #[test]
    fn test_normalize_hex_uppercases() {
        assert_eq!(normalize_hex("#e0f2f1").as_deref(), Some("#E0F2F1"));
        assert_eq!(normalize_hex("blue"), None);
    }

    #[test]
    fn test_adjust_channel_saturates() {
        assert_eq!(adjust_channel((250, 0, 0), Channel::Red, 16), (255, 0, 0));
        assert_eq!(adjust_channel((0, 5, 0), Channel::Green, -16), (0, 0, 0));
        assert_eq!(adjust_channel((0, 0, 16), Channel::Blue, 16), (0, 0, 32));
        assert_eq!(Channel::Blue.next(), Channel::Red);
        assert_eq!(Channel::Red.prev(), Channel::Blue);
    }
}
