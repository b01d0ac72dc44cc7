use crate::dex::Dex;
use crate::model::{FormatRules, Species};
use anyhow::Result;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Minimal proposed configuration submitted to the external validator.
#[derive(Debug, Clone)]
pub struct ProposedSet {
    pub species: String,
    pub ability: String,
    pub moves: Vec<String>,
    pub level: u8,
}

impl ProposedSet {
    pub fn minimal(species: &str, ability: &str, moves: Vec<String>) -> Self {
        Self {
            species: species.to_string(),
            ability: ability.to_string(),
            moves,
            level: 100,
        }
    }
}

/// Capability contract over the external legality validator.
pub trait Validator: Sync {
    /// Problems the validator reports for the proposed set; empty means the
    /// set is legal. `Err` is a hard validator fault and must propagate, it
    /// is never read as "legal".
    fn validate(&self, set: &ProposedSet) -> Result<Vec<String>>;
}

/// Filters a species' ability slots down to the legal ones.
///
/// A name is legal if it is neither banned nor restricted for the format and
/// validating a minimal set with that ability reports no problem mentioning
/// it. Slot keys are preserved; a name occupying several slots is validated
/// once.
pub fn legal_abilities(
    validator: &dyn Validator,
    rules: &FormatRules,
    species: &Species,
) -> Result<BTreeMap<String, String>> {
    let mut verdicts: HashMap<&str, bool> = HashMap::new();
    let mut legal = BTreeMap::new();
    for (slot, name) in &species.abilities {
        let cached = verdicts.get(name.as_str()).copied();
        let ok = match cached {
            Some(verdict) => verdict,
            None => {
                let ok = if rules.banned.contains(name) || rules.restricted.contains(name) {
                    false
                } else {
                    let set = ProposedSet::minimal(&species.name, name, Vec::new());
                    let problems = validator.validate(&set)?;
                    !problems.iter().any(|p| p.contains(name.as_str()))
                };
                verdicts.insert(name.as_str(), ok);
                ok
            }
        };
        if ok {
            legal.insert(slot.clone(), name.clone());
        }
    }
    Ok(legal)
}

/// Filters candidate move ids down to the legal move names for the format,
/// sorted lexicographically.
///
/// `probe_ability` must already be legal for the species; move validation
/// pairs each candidate with it one move at a time. Candidates without a move
/// record are dropped as missing data.
pub fn legal_moves(
    validator: &dyn Validator,
    dex: &dyn Dex,
    rules: &FormatRules,
    species: &Species,
    probe_ability: &str,
    candidates: &BTreeSet<String>,
    restricted_moves: bool,
) -> Result<Vec<String>> {
    let mut legal = Vec::new();
    for move_id in candidates {
        let Some(info) = dex.move_info(move_id) else {
            continue;
        };
        if let Some(tag) = info.nonstandard {
            if !rules.allowed_nonstandard.contains(&tag) {
                continue;
            }
        }
        if rules.banned.contains(&info.name) {
            continue;
        }
        if restricted_moves && rules.restricted.contains(&info.name) {
            continue;
        }
        let set = ProposedSet::minimal(&species.name, probe_ability, vec![info.name.clone()]);
        let problems = validator.validate(&set)?;
        if problems.iter().any(|p| p.contains(info.name.as_str())) {
            continue;
        }
        legal.push(info.name.clone());
    }
    legal.sort();
    legal.dedup();
    Ok(legal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dex::JsonDex;
    use crate::model::{MoveInfo, Nonstandard};
    use anyhow::bail;
    use std::collections::HashMap as StdHashMap;

    struct NameListValidator {
        illegal: Vec<&'static str>,
    }

    impl Validator for NameListValidator {
        fn validate(&self, set: &ProposedSet) -> Result<Vec<String>> {
            let mut problems = Vec::new();
            if self.illegal.contains(&set.ability.as_str()) {
                problems.push(format!(
                    "{}'s ability {} is unreleased.",
                    set.species, set.ability
                ));
            }
            for mv in &set.moves {
                if self.illegal.contains(&mv.as_str()) {
                    problems.push(format!("{} can't learn {}.", set.species, mv));
                }
            }
            Ok(problems)
        }
    }

    struct FaultyValidator;

    impl Validator for FaultyValidator {
        fn validate(&self, _set: &ProposedSet) -> Result<Vec<String>> {
            bail!("validator subprocess died");
        }
    }

    fn make_species(name: &str, abilities: &[(&str, &str)]) -> Species {
        Species {
            name: name.to_string(),
            abilities: abilities
                .iter()
                .map(|(slot, ability)| (slot.to_string(), ability.to_string()))
                .collect(),
            tier: None,
            nonstandard: None,
            prevo: None,
            extras: StdHashMap::new(),
        }
    }

    fn make_move(name: &str, nonstandard: Option<Nonstandard>) -> MoveInfo {
        MoveInfo {
            name: name.to_string(),
            nonstandard,
            extras: StdHashMap::new(),
        }
    }

    fn move_dex(moves: &[(&str, Option<Nonstandard>)]) -> JsonDex {
        let moves = moves
            .iter()
            .map(|(name, tag)| (name.to_string(), make_move(name, *tag)))
            .collect();
        JsonDex::from_parts(StdHashMap::new(), moves, StdHashMap::new())
    }

    fn candidates(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    #[test]
    fn abilities_keep_slots_and_drop_flagged_names() {
        let validator = NameListValidator {
            illegal: vec!["Moody"],
        };
        let species = make_species(
            "Glitchmon",
            &[("0", "Moody"), ("1", "Pressure"), ("H", "Pressure")],
        );
        let rules = FormatRules::default();
        let legal = legal_abilities(&validator, &rules, &species).expect("validator is healthy");
        assert_eq!(legal.len(), 2);
        assert_eq!(legal.get("1").map(String::as_str), Some("Pressure"));
        assert_eq!(legal.get("H").map(String::as_str), Some("Pressure"));
        assert!(!legal.contains_key("0"));
    }

    #[test]
    fn banned_and_restricted_abilities_are_dropped_without_validation() {
        let validator = NameListValidator { illegal: vec![] };
        let species = make_species("Glitchmon", &[("0", "Shadow Tag"), ("1", "Levitate")]);
        let mut rules = FormatRules::default();
        rules.banned.insert("Shadow Tag".to_string());
        let legal = legal_abilities(&validator, &rules, &species).expect("validator is healthy");
        assert_eq!(legal.len(), 1);
        assert_eq!(legal.get("1").map(String::as_str), Some("Levitate"));
    }

    #[test]
    fn banned_move_is_dropped_and_rest_survive() {
        let validator = NameListValidator { illegal: vec![] };
        let dex = move_dex(&[("X", None), ("Y", None)]);
        let species = make_species("Glitchmon", &[("0", "Pressure")]);
        let mut rules = FormatRules::default();
        rules.banned.insert("X".to_string());
        let legal = legal_moves(
            &validator,
            &dex,
            &rules,
            &species,
            "Pressure",
            &candidates(&["X", "Y"]),
            false,
        )
        .expect("validator is healthy");
        assert_eq!(legal, vec!["Y".to_string()]);
    }

    #[test]
    fn validator_flagged_move_is_dropped() {
        let validator = NameListValidator {
            illegal: vec!["Chatter"],
        };
        let dex = move_dex(&[("Chatter", None), ("Peck", None)]);
        let species = make_species("Songbird", &[("0", "Keen Eye")]);
        let rules = FormatRules::default();
        let legal = legal_moves(
            &validator,
            &dex,
            &rules,
            &species,
            "Keen Eye",
            &candidates(&["Chatter", "Peck"]),
            false,
        )
        .expect("validator is healthy");
        assert_eq!(legal, vec!["Peck".to_string()]);
    }

    #[test]
    fn nonstandard_move_needs_an_allowance() {
        let validator = NameListValidator { illegal: vec![] };
        let dex = move_dex(&[("Pursuit", Some(Nonstandard::Past)), ("Tackle", None)]);
        let species = make_species("Chaser", &[("0", "Intimidate")]);
        let mut rules = FormatRules::default();
        let ids = candidates(&["Pursuit", "Tackle"]);

        let legal = legal_moves(
            &validator,
            &dex,
            &rules,
            &species,
            "Intimidate",
            &ids,
            false,
        )
        .expect("validator is healthy");
        assert_eq!(legal, vec!["Tackle".to_string()]);

        rules.allowed_nonstandard.insert(Nonstandard::Past);
        let legal = legal_moves(
            &validator,
            &dex,
            &rules,
            &species,
            "Intimidate",
            &ids,
            false,
        )
        .expect("validator is healthy");
        assert_eq!(legal, vec!["Pursuit".to_string(), "Tackle".to_string()]);
    }

    #[test]
    fn restricted_moves_honor_the_scope_switch() {
        let validator = NameListValidator { illegal: vec![] };
        let dex = move_dex(&[("Last Respects", None), ("Shadow Ball", None)]);
        let species = make_species("Wraith", &[("0", "Cursed Body")]);
        let mut rules = FormatRules::default();
        rules.restricted.insert("Last Respects".to_string());

        let ids = candidates(&["Last Respects", "Shadow Ball"]);
        let relaxed = legal_moves(
            &validator,
            &dex,
            &rules,
            &species,
            "Cursed Body",
            &ids,
            false,
        )
        .expect("validator is healthy");
        assert_eq!(relaxed.len(), 2);

        let strict = legal_moves(
            &validator,
            &dex,
            &rules,
            &species,
            "Cursed Body",
            &ids,
            true,
        )
        .expect("validator is healthy");
        assert_eq!(strict, vec!["Shadow Ball".to_string()]);
    }

    #[test]
    fn validator_fault_propagates() {
        let species = make_species("Glitchmon", &[("0", "Pressure")]);
        let rules = FormatRules::default();
        assert!(legal_abilities(&FaultyValidator, &rules, &species).is_err());

        let dex = move_dex(&[("Tackle", None)]);
        let result = legal_moves(
            &FaultyValidator,
            &dex,
            &rules,
            &species,
            "Pressure",
            &candidates(&["Tackle"]),
            false,
        );
        assert!(result.is_err());
    }
}
