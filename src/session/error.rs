use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// A record failed validation; the deck was not installed.
    #[error("card #{index} (id {id}) is invalid: {reason}")]
    DeckLoad {
        index: usize,
        id: String,
        reason: String,
    },
    #[error("deck {source_key} has no cards")]
    EmptyDeck { source_key: String },
    #[error("no deck is loaded")]
    NoActiveDeck,
}
