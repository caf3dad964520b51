use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;

use crate::store::PositionStore;
use crate::store::schema::PositionData;

const POSITIONS_FILE: &str = "positions.json";

/// File-backed position store. Every call goes to disk so that separate
/// handles on the same directory never disagree.
pub struct JsonPositionStore {
    base_dir: PathBuf,
}

impl JsonPositionStore {
    pub fn new() -> Result<Self> {
        Self::with_base_dir(default_data_dir())
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    fn file_path(&self) -> PathBuf {
        self.base_dir.join(POSITIONS_FILE)
    }

    /// Missing, unreadable, or stale-schema files all read as empty.
    pub fn load(&self) -> PositionData {
        let path = self.file_path();
        if !path.exists() {
            return PositionData::default();
        }
        let parsed = fs::read_to_string(&path)
            .ok()
            .and_then(|content| serde_json::from_str::<PositionData>(&content).ok());
        match parsed {
            Some(data) if !data.needs_reset() => data,
            _ => {
                tracing::warn!(path = %path.display(), "discarding unreadable position file");
                PositionData::default()
            }
        }
    }

    fn save(&self, data: &PositionData) -> Result<()> {
        let path = self.file_path();
        let tmp_path = path.with_extension("tmp");

        let json = serde_json::to_string_pretty(data)?;
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    /// Forget every saved position.
    pub fn reset_all(&self) -> Result<()> {
        let data = PositionData {
            saved_at: Some(Utc::now()),
            ..PositionData::default()
        };
        self.save(&data)?;
        tracing::info!("cleared all saved positions");
        Ok(())
    }
}

impl PositionStore for JsonPositionStore {
    fn get(&self, source_key: &str) -> Option<usize> {
        self.load().positions.get(source_key).copied()
    }

    fn set(&mut self, source_key: &str, index: usize) -> Result<()> {
        let mut data = self.load();
        data.positions.insert(source_key.to_string(), index);
        data.saved_at = Some(Utc::now());
        self.save(&data)
    }
}

pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("flashdeck")
}
