//! Best score table
//!
//! One best score per game type. Persisted as JSON, to a file on native
//! builds and to LocalStorage in the browser.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::collaborators::BestScoreStore;
use crate::error::StoreError;

/// A single best score entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BestScoreEntry {
    pub score: u64,
    /// How many times this entry was improved
    pub improvements: u32,
}

/// Best scores keyed by game type ("fish_jump", "fish_dodge", "fish_flap")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BestScores {
    pub entries: BTreeMap<String, BestScoreEntry>,
}

impl BestScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Best score for a game type, 0 if none recorded
    pub fn best(&self, game_type: &str) -> u64 {
        self.entries.get(game_type).map(|e| e.score).unwrap_or(0)
    }

    /// Record a score. Returns true if it beat the stored best.
    pub fn record(&mut self, game_type: &str, score: u64) -> bool {
        let entry = self.entries.entry(game_type.to_string()).or_default();
        if score <= entry.score {
            return false;
        }
        entry.score = score;
        entry.improvements += 1;
        true
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Best score store backed by a JSON file shared by all game types
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct FileBestScoreStore {
    path: std::path::PathBuf,
    game_type: String,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileBestScoreStore {
    pub fn new(path: impl Into<std::path::PathBuf>, game_type: &str) -> Self {
        Self {
            path: path.into(),
            game_type: game_type.to_string(),
        }
    }

    /// Read the whole table. A missing file is an empty table.
    pub fn read_table(&self) -> Result<BestScores, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(json) => BestScores::from_json(&json),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BestScores::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_table(&self, table: &BestScores) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)?;
            }
        }
        // Write to a sibling temp file first, then rename over the old table
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, table.to_json()?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl BestScoreStore for FileBestScoreStore {
    fn load_best_score(&mut self) -> Result<u64, StoreError> {
        let best = self.read_table()?.best(&self.game_type);
        log::info!("Loaded best score {} for {}", best, self.game_type);
        Ok(best)
    }

    fn save_best_score(&mut self, score: u64) -> Result<(), StoreError> {
        let mut table = self.read_table()?;
        if table.record(&self.game_type, score) {
            self.write_table(&table)?;
            log::info!("Best score saved ({} for {})", score, self.game_type);
        }
        Ok(())
    }
}

/// Best score store backed by browser LocalStorage
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone)]
pub struct LocalStorageBestScoreStore {
    game_type: String,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorageBestScoreStore {
    const STORAGE_KEY: &'static str = "aqua_arcade_best_scores";

    pub fn new(game_type: &str) -> Self {
        Self {
            game_type: game_type.to_string(),
        }
    }

    fn storage() -> Result<web_sys::Storage, StoreError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or(StoreError::Unavailable)
    }

    fn read_table(storage: &web_sys::Storage) -> Result<BestScores, StoreError> {
        match storage.get_item(Self::STORAGE_KEY) {
            Ok(Some(json)) => BestScores::from_json(&json),
            Ok(None) => Ok(BestScores::new()),
            Err(_) => Err(StoreError::Unavailable),
        }
    }
}

#[cfg(target_arch = "wasm32")]
impl BestScoreStore for LocalStorageBestScoreStore {
    fn load_best_score(&mut self) -> Result<u64, StoreError> {
        let storage = Self::storage()?;
        let best = Self::read_table(&storage)?.best(&self.game_type);
        log::info!("Loaded best score {} for {}", best, self.game_type);
        Ok(best)
    }

    fn save_best_score(&mut self, score: u64) -> Result<(), StoreError> {
        let storage = Self::storage()?;
        let mut table = Self::read_table(&storage)?;
        if table.record(&self.game_type, score) {
            storage
                .set_item(Self::STORAGE_KEY, &table.to_json()?)
                .map_err(|_| StoreError::Unavailable)?;
            log::info!("Best score saved ({} for {})", score, self.game_type);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_only_improves() {
        let mut table = BestScores::new();
        assert!(table.is_empty());
        assert!(table.record("fish_jump", 40));
        assert!(!table.record("fish_jump", 40));
        assert!(!table.record("fish_jump", 12));
        assert!(table.record("fish_jump", 41));
        assert_eq!(table.best("fish_jump"), 41);
        assert_eq!(table.entries["fish_jump"].improvements, 2);
    }

    #[test]
    fn test_game_types_are_independent() {
        let mut table = BestScores::new();
        table.record("fish_dodge", 9);
        assert_eq!(table.best("fish_dodge"), 9);
        assert_eq!(table.best("fish_flap"), 0);
    }

    #[test]
    fn test_json_roundtrip() {
        let mut table = BestScores::new();
        table.record("fish_flap", 3);
        let back = BestScores::from_json(&table.to_json().unwrap()).unwrap();
        assert_eq!(back, table);
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(matches!(
            BestScores::from_json("{not json"),
            Err(StoreError::Parse(_))
        ));
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_file_store() {
        let dir = std::env::temp_dir().join(format!("aqua-arcade-test-{}", std::process::id()));
        let path = dir.join("best.json");
        let _ = std::fs::remove_file(&path);

        let mut jump = FileBestScoreStore::new(&path, "fish_jump");
        assert_eq!(jump.load_best_score().unwrap(), 0);
        jump.save_best_score(25).unwrap();
        jump.save_best_score(10).unwrap();
        assert_eq!(jump.load_best_score().unwrap(), 25);

        let mut flap = FileBestScoreStore::new(&path, "fish_flap");
        assert_eq!(flap.load_best_score().unwrap(), 0);
        flap.save_best_score(4).unwrap();
        assert_eq!(jump.read_table().unwrap().best("fish_flap"), 4);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
