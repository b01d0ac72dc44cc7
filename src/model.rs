use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Nonstandard tag attached to species and moves that are not ordinary
/// content for the current generation. Spellings follow the data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Nonstandard {
    Past,
    Future,
    #[serde(rename = "CAP")]
    Cap,
    #[serde(rename = "LGPE")]
    Lgpe,
    Custom,
    Gigantamax,
    Unobtainable,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Species {
    pub name: String,
    /// Ability slot -> ability name. Slot keys are "0", "1", "H", "S";
    /// the same name may occupy more than one slot.
    #[serde(default)]
    pub abilities: BTreeMap<String, String>,
    #[serde(default)]
    pub tier: Option<String>,
    #[serde(default, rename = "isNonstandard")]
    pub nonstandard: Option<Nonstandard>,
    /// Display name of the immediate prior evolutionary stage, if any.
    #[serde(default)]
    pub prevo: Option<String>,
    #[serde(flatten, default)]
    pub extras: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MoveInfo {
    pub name: String,
    #[serde(default, rename = "isNonstandard")]
    pub nonstandard: Option<Nonstandard>,
    #[serde(flatten, default)]
    pub extras: HashMap<String, serde_json::Value>,
}

/// Per-format rule snapshot, immutable for the duration of a run.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatRules {
    #[serde(default)]
    pub banned: HashSet<String>,
    #[serde(default)]
    pub restricted: HashSet<String>,
    #[serde(default)]
    pub allowed_nonstandard: HashSet<Nonstandard>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatSpread {
    #[serde(default)]
    pub hp: u16,
    #[serde(default)]
    pub atk: u16,
    #[serde(default)]
    pub def: u16,
    #[serde(default)]
    pub spa: u16,
    #[serde(default)]
    pub spd: u16,
    #[serde(default)]
    pub spe: u16,
}

impl StatSpread {
    /// Stable "hp,atk,def,spa,spd,spe" form used by canonical signatures.
    pub fn canonical(&self) -> String {
        format!(
            "{},{},{},{},{},{}",
            self.hp, self.atk, self.def, self.spa, self.spd, self.spe
        )
    }
}

fn default_level() -> u8 {
    100
}

/// One generated configuration entry as produced by the team generator.
/// Fields the generator emits beyond the signature-relevant ones ride along
/// in `extras` and are written back out unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub species: String,
    #[serde(default)]
    pub item: String,
    #[serde(default)]
    pub ability: String,
    #[serde(default)]
    pub moves: Vec<String>,
    #[serde(default)]
    pub nature: String,
    #[serde(default)]
    pub evs: StatSpread,
    #[serde(default)]
    pub ivs: StatSpread,
    #[serde(default)]
    pub gender: String,
    #[serde(default = "default_level")]
    pub level: u8,
    #[serde(default)]
    pub shiny: bool,
    #[serde(default)]
    pub tera_type: String,
    #[serde(flatten, default)]
    pub extras: HashMap<String, serde_json::Value>,
}

/// Per-species output of the extraction pipeline: the abilities and moves
/// that survived legality filtering, plus the species' tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegalRecord {
    pub abilities: BTreeMap<String, String>,
    pub moves: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,
}

/// Complete sampling-mode output artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolFile {
    pub format: String,
    pub generated_teams: usize,
    pub one_mon_per_team: bool,
    pub max_per_species: usize,
    pub dedupe_exact_sets: bool,
    pub pool_size: usize,
    pub pool: Vec<TeamMember>,
}
