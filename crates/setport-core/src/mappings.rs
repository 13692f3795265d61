use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::Result;

/// User-maintained exercise-name mapping table, loaded once per run and
/// read-only afterwards. Keys are source names (exact match), values are the
/// destination app's names.
///
/// ```toml
/// [exercises]
/// "Barbell Flat Bench Press" = "Bench Press (Barbell)"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExerciseMappings {
    #[serde(default)]
    exercises: BTreeMap<String, String>,
}

impl ExerciseMappings {
    pub fn parse(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    pub fn contains(&self, source_name: &str) -> bool {
        self.exercises.contains_key(source_name)
    }

    /// Mapped name when an entry exists, otherwise the source name unchanged.
    pub fn resolve<'a>(&'a self, source_name: &'a str) -> &'a str {
        self.exercises
            .get(source_name)
            .map(String::as_str)
            .unwrap_or(source_name)
    }

    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }
}
