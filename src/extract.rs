use crate::aggregate::collect_learnable_moves;
use crate::dex::Dex;
use crate::legality::{legal_abilities, legal_moves, Validator};
use crate::model::{FormatRules, LegalRecord, Nonstandard};
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::collections::{BTreeMap, HashSet};

/// Tiers whose species never enter the extraction output.
static EXCLUDED_TIERS: phf::Set<&'static str> = phf::phf_set! {
    "Illegal",
    "Unreleased",
    "CAP",
    "CAP NFE",
    "CAP LC",
};

#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Minimum number of legal moves a record needs; floored at one.
    pub min_moves: usize,
    /// Nonstandard tags admitted on top of what the format already allows.
    pub allow_nonstandard: HashSet<Nonstandard>,
    /// Whether the format's restricted names also exclude moves.
    pub restricted_moves: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            min_moves: 1,
            allow_nonstandard: HashSet::new(),
            restricted_moves: false,
        }
    }
}

/// Runs the whole database through admission, ancestry aggregation, and
/// legality filtering. Returns one record per admitted species, keyed by
/// display name; the map and every move list inside it are deterministic.
pub fn extract_legal_records(
    dex: &dyn Dex,
    validator: &dyn Validator,
    rules: &FormatRules,
    opts: &ExtractOptions,
) -> Result<BTreeMap<String, LegalRecord>> {
    let mut rules = rules.clone();
    rules
        .allowed_nonstandard
        .extend(opts.allow_nonstandard.iter().copied());

    let mut ids = dex.species_ids();
    ids.sort_unstable();

    let rows: Vec<Option<(String, LegalRecord)>> = ids
        .into_par_iter()
        .map(|id| {
            extract_one(dex, validator, &rules, opts, id)
                .with_context(|| format!("Failed to evaluate species '{id}'"))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(rows.into_iter().flatten().collect())
}

fn extract_one(
    dex: &dyn Dex,
    validator: &dyn Validator,
    rules: &FormatRules,
    opts: &ExtractOptions,
    id: &str,
) -> Result<Option<(String, LegalRecord)>> {
    let Some(species) = dex.species(id) else {
        return Ok(None);
    };
    if let Some(tag) = species.nonstandard {
        if !rules.allowed_nonstandard.contains(&tag) {
            return Ok(None);
        }
    }
    if let Some(tier) = species.tier.as_deref() {
        if EXCLUDED_TIERS.contains(tier) {
            return Ok(None);
        }
    }
    if rules.banned.contains(&species.name) {
        return Ok(None);
    }

    let candidates = collect_learnable_moves(dex, id)?;

    // Abilities first: move validation needs a legal ability to pair with.
    let abilities = legal_abilities(validator, rules, species)?;
    let Some(probe_ability) = abilities.values().next().cloned() else {
        return Ok(None);
    };

    let moves = legal_moves(
        validator,
        dex,
        rules,
        species,
        &probe_ability,
        &candidates,
        opts.restricted_moves,
    )?;
    if moves.is_empty() || moves.len() < opts.min_moves {
        return Ok(None);
    }

    let record = LegalRecord {
        abilities,
        moves,
        tier: species.tier.clone(),
    };
    Ok(Some((species.name.clone(), record)))
}
