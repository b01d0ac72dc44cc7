use crate::model::{MoveInfo, Species};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

/// Read-only lookup surface over the species/move/learnset database.
///
/// Absence is always reported as `None`, never as an empty-but-valid record.
pub trait Dex: Sync {
    fn species(&self, id: &str) -> Option<&Species>;
    fn move_info(&self, id: &str) -> Option<&MoveInfo>;
    fn learnset(&self, species_id: &str) -> Option<&BTreeSet<String>>;
    fn species_ids(&self) -> Vec<&str>;
}

/// Lowercases and strips everything but ASCII alphanumerics, matching the
/// id scheme of the data source ("Mr. Mime" -> "mrmime").
pub fn normalize_id(name: &str) -> String {
    name.to_ascii_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

#[derive(Debug, Deserialize)]
struct DexFile {
    #[serde(default)]
    species: HashMap<String, Species>,
    #[serde(default)]
    moves: HashMap<String, MoveInfo>,
    #[serde(default)]
    learnsets: HashMap<String, BTreeSet<String>>,
}

/// In-memory dex backed by the JSON dump produced by `tools/dump_dex.js`.
#[derive(Debug)]
pub struct JsonDex {
    species: HashMap<String, Species>,
    moves: HashMap<String, MoveInfo>,
    learnsets: HashMap<String, BTreeSet<String>>,
}

impl JsonDex {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read dex dump at {}", path.display()))?;
        let parsed: DexFile = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse JSON from {}", path.display()))?;
        Ok(Self {
            species: parsed.species,
            moves: parsed.moves,
            learnsets: parsed.learnsets,
        })
    }

    pub fn from_parts(
        species: HashMap<String, Species>,
        moves: HashMap<String, MoveInfo>,
        learnsets: HashMap<String, BTreeSet<String>>,
    ) -> Self {
        Self {
            species,
            moves,
            learnsets,
        }
    }
}

impl Dex for JsonDex {
    fn species(&self, id: &str) -> Option<&Species> {
        self.species.get(id)
    }

    fn move_info(&self, id: &str) -> Option<&MoveInfo> {
        self.moves.get(id)
    }

    fn learnset(&self, species_id: &str) -> Option<&BTreeSet<String>> {
        self.learnsets.get(species_id)
    }

    fn species_ids(&self) -> Vec<&str> {
        self.species.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::normalize_id;

    #[test]
    fn normalize_strips_punctuation_and_case() {
        assert_eq!(normalize_id("Mr. Mime"), "mrmime");
        assert_eq!(normalize_id("Farfetch'd"), "farfetchd");
        assert_eq!(normalize_id("Porygon-Z"), "porygonz");
        assert_eq!(normalize_id("CHARIZARD"), "charizard");
    }
}
