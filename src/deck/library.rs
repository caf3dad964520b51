use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use rust_embed::Embed;
use serde_json::Value;

use crate::deck::CardSource;

#[derive(Embed)]
#[folder = "assets/decks/"]
struct DeckAssets;

/// Deck files on disk, with the decks bundled into the binary as fallback.
pub struct DeckLibrary {
    deck_dir: PathBuf,
}

impl DeckLibrary {
    pub fn new(deck_dir: PathBuf) -> Self {
        Self { deck_dir }
    }

    pub fn deck_dir(&self) -> &PathBuf {
        &self.deck_dir
    }

    fn file_path(&self, source_key: &str) -> PathBuf {
        self.deck_dir.join(format!("{source_key}.json"))
    }

    /// Keys of every deck that can be fetched, user decks first.
    pub fn available(&self) -> Vec<String> {
        let mut keys: Vec<String> = Vec::new();
        if let Ok(entries) = fs::read_dir(&self.deck_dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) != Some("json") {
                    continue;
                }
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    keys.push(stem.to_string());
                }
            }
        }
        keys.sort();
        for name in DeckAssets::iter() {
            if let Some(key) = name.strip_suffix(".json")
                && !keys.iter().any(|k| k == key)
            {
                keys.push(key.to_string());
            }
        }
        keys
    }
}

impl CardSource for DeckLibrary {
    fn fetch(&self, source_key: &str) -> Result<Vec<Value>> {
        if source_key.is_empty()
            || source_key.contains(['/', '\\'])
            || source_key.starts_with('.')
        {
            bail!("Invalid deck key: {source_key:?}");
        }

        let path = self.file_path(source_key);
        if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            return parse_records(&content)
                .with_context(|| format!("Failed to parse {}", path.display()));
        }

        let filename = format!("{source_key}.json");
        if let Some(file) = DeckAssets::get(&filename) {
            let content = std::str::from_utf8(file.data.as_ref())?;
            return parse_records(content)
                .with_context(|| format!("Failed to parse bundled deck {filename}"));
        }

        bail!("No deck found for {source_key}")
    }
}

/// Accepts either a bare JSON array of card records or `{ "cards": [...] }`.
pub fn parse_records(content: &str) -> Result<Vec<Value>> {
    match serde_json::from_str::<Value>(content)? {
        Value::Array(records) => Ok(records),
        Value::Object(mut map) => match map.remove("cards") {
            Some(Value::Array(records)) => Ok(records),
            _ => bail!("Expected a `cards` array"),
        },
        _ => bail!("Expected a JSON array of cards"),
    }
}
