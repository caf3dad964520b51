pub mod json_store;
pub mod memory;
pub mod schema;

use anyhow::Result;

/// Last-viewed card index per deck, keyed by source key.
///
/// The session engine only reads a key when a deck is loaded and writes it
/// after every index change. Writes are synchronous; a failed write leaves
/// the caller's in-memory position alone.
pub trait PositionStore {
    fn get(&self, source_key: &str) -> Option<usize>;
    fn set(&mut self, source_key: &str, index: usize) -> Result<()>;
}
