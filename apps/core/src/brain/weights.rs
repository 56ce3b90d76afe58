//! Adaptive pattern-weight table with JSON persistence.
//!
//! The table is the only mutable state in the classifier: a fixed
//! `(intent, pattern)` key set whose weight values move within [0, cap].
//! Reads run concurrently; reinforcement serializes behind the write lock.
//! Persistence is best-effort: a failed save is a warning, never a turn
//! failure, and a corrupt file at load degrades to the base vocabulary.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::{info, warn};

use super::classifier::{Intent, ALL_INTENTS};
use crate::error::AppError;

/// Weight every pattern starts with.
pub const BASE_WEIGHT: f32 = 1.0;

/// Thread-safe pattern-weight store, seeded from the fixed intent vocabulary.
pub struct PatternWeightTable {
    weights: RwLock<HashMap<Intent, HashMap<String, f32>>>,
    path: PathBuf,
    cap: f32,
}

impl PatternWeightTable {
    /// Creates a table seeded at [`BASE_WEIGHT`] for every configured pattern.
    pub fn new(path: PathBuf, cap: f32) -> Self {
        let weights = ALL_INTENTS
            .iter()
            .map(|&intent| {
                let patterns = intent
                    .patterns()
                    .iter()
                    .map(|p| (p.to_string(), BASE_WEIGHT))
                    .collect();
                (intent, patterns)
            })
            .collect();

        Self {
            weights: RwLock::new(weights),
            path,
            cap,
        }
    }

    /// Creates a table and, when a persisted file exists, merges its values
    /// over the base vocabulary. Unknown keys are ignored and values are
    /// clamped, so the key set stays exactly the configured vocabulary.
    /// A missing or corrupt file falls back to base weights.
    pub fn load_or_default(path: &Path, cap: f32) -> Self {
        let table = Self::new(path.to_path_buf(), cap);

        if !path.exists() {
            return table;
        }

        match Self::read_snapshot(path) {
            Ok(saved) => {
                let mut weights = table.weights.write().expect("weight lock poisoned");
                let mut loaded = 0usize;
                for (label, patterns) in saved {
                    let Some(intent) = Intent::from_label(&label) else {
                        continue;
                    };
                    let Some(entry) = weights.get_mut(&intent) else {
                        continue;
                    };
                    for (pattern, value) in patterns {
                        if let Some(weight) = entry.get_mut(&pattern) {
                            *weight = value.clamp(0.0, cap);
                            loaded += 1;
                        }
                    }
                }
                drop(weights);
                info!("Loaded {} trained intent weights from {:?}", loaded, path);
            }
            Err(e) => {
                warn!(
                    "Failed to load intent weights from {:?}, using base vocabulary: {}",
                    path, e
                );
            }
        }

        table
    }

    fn read_snapshot(path: &Path) -> Result<BTreeMap<String, BTreeMap<String, f32>>, AppError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Current weight of one pattern, or 0 for keys outside the vocabulary.
    pub fn weight(&self, intent: Intent, pattern: &str) -> f32 {
        self.weights
            .read()
            .expect("weight lock poisoned")
            .get(&intent)
            .and_then(|patterns| patterns.get(pattern))
            .copied()
            .unwrap_or(0.0)
    }

    /// Sums the weights of the given matched patterns under one read lock.
    pub fn matched_sum(&self, intent: Intent, patterns: &[String]) -> f32 {
        let weights = self.weights.read().expect("weight lock poisoned");
        let Some(entry) = weights.get(&intent) else {
            return 0.0;
        };
        patterns
            .iter()
            .filter_map(|pattern| entry.get(pattern))
            .sum()
    }

    /// Increments every given pattern of the intent by `step`, capped.
    /// Only existing keys move; the vocabulary never grows at runtime.
    pub fn reinforce(&self, intent: Intent, patterns: &[String], step: f32) {
        let mut weights = self.weights.write().expect("weight lock poisoned");
        let Some(entry) = weights.get_mut(&intent) else {
            return;
        };
        for pattern in patterns {
            if let Some(weight) = entry.get_mut(pattern) {
                *weight = (*weight + step).min(self.cap);
            }
        }
    }

    /// Label-keyed, sorted copy of the table, used for persistence and for
    /// read-only inspection.
    pub fn snapshot(&self) -> BTreeMap<String, BTreeMap<String, f32>> {
        self.weights
            .read()
            .expect("weight lock poisoned")
            .iter()
            .map(|(intent, patterns)| {
                (
                    intent.label().to_string(),
                    patterns
                        .iter()
                        .map(|(p, w)| (p.clone(), *w))
                        .collect(),
                )
            })
            .collect()
    }

    /// Writes the current table to its configured path as pretty JSON.
    pub fn save(&self) -> Result<(), AppError> {
        let snapshot = self.snapshot();
        let json = serde_json::to_string_pretty(&snapshot)?;
        std::fs::write(&self.path, json)?;
        info!("Saved intent weights to {:?}", self.path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(dir: &tempfile::TempDir) -> PatternWeightTable {
        PatternWeightTable::new(dir.path().join("weights.json"), 3.0)
    }

    #[test]
    fn test_seeded_at_base_weight() {
        let dir = tempfile::tempdir().expect("tempdir");
        let table = table(&dir);

        assert_eq!(table.weight(Intent::TactProgram, "tact"), BASE_WEIGHT);
        assert_eq!(table.weight(Intent::Greeting, "hello"), BASE_WEIGHT);
        assert_eq!(table.weight(Intent::Greeting, "unknown-pattern"), 0.0);
    }

    #[test]
    fn test_reinforce_caps_at_limit() {
        let dir = tempfile::tempdir().expect("tempdir");
        let table = table(&dir);
        let patterns = vec!["tact".to_string()];

        for _ in 0..50 {
            table.reinforce(Intent::TactProgram, &patterns, 0.1);
        }

        assert_eq!(table.weight(Intent::TactProgram, "tact"), 3.0);
    }

    #[test]
    fn test_reinforce_never_adds_keys() {
        let dir = tempfile::tempdir().expect("tempdir");
        let table = table(&dir);

        table.reinforce(Intent::Greeting, &["made-up".to_string()], 0.1);
        assert_eq!(table.weight(Intent::Greeting, "made-up"), 0.0);
    }

    #[test]
    fn test_save_and_reload_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("weights.json");

        let table = PatternWeightTable::new(path.clone(), 3.0);
        table.reinforce(Intent::Fees, &["tuition".to_string()], 0.1);
        table.save().expect("save should succeed");

        let reloaded = PatternWeightTable::load_or_default(&path, 3.0);
        assert!((reloaded.weight(Intent::Fees, "tuition") - 1.1).abs() < 1e-6);
        assert_eq!(reloaded.weight(Intent::Fees, "cost"), BASE_WEIGHT);
    }

    #[test]
    fn test_corrupt_file_degrades_to_base() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("weights.json");
        std::fs::write(&path, "{ not json").expect("write");

        let table = PatternWeightTable::load_or_default(&path, 3.0);
        assert_eq!(table.weight(Intent::TactProgram, "tact"), BASE_WEIGHT);
    }

    #[test]
    fn test_save_failure_is_reported() {
        let table = PatternWeightTable::new(
            PathBuf::from("/nonexistent-dir/definitely/weights.json"),
            3.0,
        );
        assert!(table.save().is_err());
    }
}
