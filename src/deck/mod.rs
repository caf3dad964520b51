pub mod card;
pub mod library;

use anyhow::Result;
use serde_json::Value;

pub use card::{Card, CardKind};

/// Supplies the ordered raw card records for a deck identifier.
pub trait CardSource {
    fn fetch(&self, source_key: &str) -> Result<Vec<Value>>;
}

/// An ordered run of cards under one source key.
#[derive(Clone, Debug)]
pub struct Deck {
    pub source_key: String,
    pub cards: Vec<Card>,
}

impl Deck {
    pub fn new(source_key: &str, cards: Vec<Card>) -> Self {
        Self {
            source_key: source_key.to_string(),
            cards,
        }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Card> {
        self.cards.get(index)
    }

    /// Highest valid index for a position read back from storage.
    pub fn clamp_index(&self, index: usize) -> usize {
        index.min(self.len().saturating_sub(1))
    }
}
