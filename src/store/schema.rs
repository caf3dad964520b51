use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PositionData {
    pub schema_version: u32,
    #[serde(default)]
    pub saved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub positions: BTreeMap<String, usize>,
}

impl Default for PositionData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            saved_at: None,
            positions: BTreeMap::new(),
        }
    }
}

impl PositionData {
    /// Check if loaded data has a stale schema version and needs reset.
    pub fn needs_reset(&self) -> bool {
        self.schema_version != SCHEMA_VERSION
    }
}
