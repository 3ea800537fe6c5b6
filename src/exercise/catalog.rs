//! Exercise lookup
//!
//! Sessions only ever see the `ExerciseCatalog` trait. `JsonCatalog` is the
//! bundled implementation, backed by a `{"exercises": [...]}` file.

use super::pattern::{ExercisePattern, PatternRecord};
use crate::error::CatalogError;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::info;

/// Read-only exercise lookup
pub trait ExerciseCatalog {
    fn lookup(&self, exercise_id: &str) -> Option<&ExercisePattern>;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Deserialize)]
struct CatalogFile {
    exercises: Vec<PatternRecord>,
}

/// In-memory catalog keyed by exercise id
#[derive(Clone, Debug, Default)]
pub struct JsonCatalog {
    patterns: FxHashMap<String, ExercisePattern>,
}

impl JsonCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let catalog = Self::from_json(&content)?;
        info!(
            "Loaded {} exercises from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    pub fn from_json(content: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(content)?;
        let mut catalog = JsonCatalog::new();
        for record in file.exercises {
            catalog.insert(ExercisePattern::try_from(record)?);
        }
        Ok(catalog)
    }

    /// Add or replace a pattern
    pub fn insert(&mut self, pattern: ExercisePattern) {
        self.patterns.insert(pattern.id.clone(), pattern);
    }

    /// Exercise ids in sorted order
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.patterns.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

impl ExerciseCatalog for JsonCatalog {
    fn lookup(&self, exercise_id: &str) -> Option<&ExercisePattern> {
        self.patterns.get(exercise_id)
    }

    fn len(&self) -> usize {
        self.patterns.len()
    }
}
