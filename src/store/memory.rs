use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use anyhow::{Result, bail};

use crate::store::PositionStore;

#[derive(Debug, Default)]
struct Inner {
    positions: HashMap<String, usize>,
    writes: Vec<(String, usize)>,
    fail_writes: bool,
}

/// In-memory position store. Clones share state, so a test can keep one
/// handle while the session owns another and still observe every write.
#[derive(Clone, Debug, Default)]
pub struct MemoryPositionStore {
    inner: Rc<RefCell<Inner>>,
}

impl MemoryPositionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_position(self, source_key: &str, index: usize) -> Self {
        self.inner
            .borrow_mut()
            .positions
            .insert(source_key.to_string(), index);
        self
    }

    /// Make subsequent writes fail until switched back off.
    pub fn fail_writes(&self, fail: bool) {
        self.inner.borrow_mut().fail_writes = fail;
    }

    /// Every successful write, oldest first.
    pub fn writes(&self) -> Vec<(String, usize)> {
        self.inner.borrow().writes.clone()
    }

    pub fn peek(&self, source_key: &str) -> Option<usize> {
        self.inner.borrow().positions.get(source_key).copied()
    }
}

impl PositionStore for MemoryPositionStore {
    fn get(&self, source_key: &str) -> Option<usize> {
        self.peek(source_key)
    }

    fn set(&mut self, source_key: &str, index: usize) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        if inner.fail_writes {
            bail!("position store is unavailable");
        }
        inner.positions.insert(source_key.to_string(), index);
        inner.writes.push((source_key.to_string(), index));
        Ok(())
    }
}
