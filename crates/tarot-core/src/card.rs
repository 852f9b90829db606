//! The Major Arcana catalog.
//!
//! Cards are leaf data: defined once, never mutated and handed around as
//! `&'static Card` or by copy.

use serde::Serialize;

/// Highest valid card id.
pub const MAX_CARD_ID: u8 = 21;

/// A single Major Arcana card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Card {
    pub id: u8,
    pub name: &'static str,
    /// Artwork path served by the front-end.
    pub image: &'static str,
}

macro_rules! card {
    ($id:expr, $name:expr, $image:expr) => {
        Card {
            id: $id,
            name: $name,
            image: $image,
        }
    };
}

/// All 22 cards, indexed by id.
pub static MAJOR_ARCANA: [Card; 22] = [
    card!(0, "The Fool", "/image/fool.png"),
    card!(1, "The Magician", "/image/magician.png"),
    card!(2, "The High Priestess", "/image/high_priestess.png"),
    card!(3, "The Empress", "/image/empress.png"),
    card!(4, "The Emperor", "/image/emperor.png"),
    card!(5, "The Hierophant", "/image/hierophant.png"),
    card!(6, "The Lovers", "/image/lovers.png"),
    card!(7, "The Chariot", "/image/chariot.png"),
    card!(8, "Strength", "/image/strength.png"),
    card!(9, "The Hermit", "/image/hermit.png"),
    card!(10, "Wheel of Fortune", "/image/wheel_of_fortune.png"),
    card!(11, "Justice", "/image/justice.png"),
    card!(12, "The Hanged Man", "/image/hanged_man.png"),
    card!(13, "Death", "/image/death.png"),
    card!(14, "Temperance", "/image/temperance.png"),
    card!(15, "The Devil", "/image/devil.png"),
    card!(16, "The Tower", "/image/tower.png"),
    card!(17, "The Star", "/image/star.png"),
    card!(18, "The Moon", "/image/moon.png"),
    card!(19, "The Sun", "/image/sun.png"),
    card!(20, "Judgement", "/image/judgement.png"),
    card!(21, "The World", "/image/world.png"),
];

/// Looks up a card by id.
pub fn card_by_id(id: u8) -> Option<&'static Card> {
    MAJOR_ARCANA.get(usize::from(id))
}

/// Looks up a card by name, ignoring ASCII case and surrounding whitespace.
pub fn card_by_name(name: &str) -> Option<&'static Card> {
    let needle = name.trim();
    MAJOR_ARCANA
        .iter()
        .find(|card| card.name.eq_ignore_ascii_case(needle))
}

/// Resolves a list of ids, stopping at the first unknown one.
pub fn cards_by_ids(ids: &[u8]) -> Result<Vec<Card>, u8> {
    ids.iter()
        .map(|&id| card_by_id(id).copied().ok_or(id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_ids_match_positions() {
        for (index, card) in MAJOR_ARCANA.iter().enumerate() {
            assert_eq!(usize::from(card.id), index);
        }
        assert_eq!(MAJOR_ARCANA.len(), usize::from(MAX_CARD_ID) + 1);
    }

    #[test]
    fn test_lookup_by_name_is_case_insensitive() {
        let card = card_by_name("  the star ").unwrap();
        assert_eq!(card.id, 17);
        assert!(card_by_name("The Joker").is_none());
    }

    #[test]
    fn test_cards_by_ids_reports_unknown_id() {
        assert_eq!(cards_by_ids(&[0, 42, 1]), Err(42));
        let cards = cards_by_ids(&[3, 7]).unwrap();
        assert_eq!(cards[0].name, "The Empress");
        assert_eq!(cards[1].name, "The Chariot");
    }
}
