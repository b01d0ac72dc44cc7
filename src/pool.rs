use crate::model::{PoolFile, TeamMember};
use anyhow::{Context, Result};
use rand::rngs::SmallRng;
use rand::Rng;
use std::collections::{HashMap, HashSet};

const PROGRESS_INTERVAL: usize = 1000;

/// Capability contract over the external random team generator. Every call
/// produces one independent configuration for the format.
pub trait TeamGenerator {
    fn generate(&mut self, format: &str) -> Result<Vec<TeamMember>>;
}

#[derive(Debug, Clone)]
pub struct PoolOptions {
    /// Number of generation attempts; the run always performs exactly this
    /// many regardless of how many members are admitted.
    pub teams: usize,
    pub one_mon_per_team: bool,
    pub max_per_species: usize,
    pub dedupe_exact_sets: bool,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            teams: 20000,
            one_mon_per_team: true,
            max_per_species: 60,
            dedupe_exact_sets: true,
        }
    }
}

/// Canonical signature over every set-defining field of a member. Two members
/// with the same signature are the same set.
pub fn set_key(member: &TeamMember) -> String {
    let mut moves = member.moves.clone();
    moves.sort();
    [
        member.species.clone(),
        member.item.clone(),
        member.ability.clone(),
        moves.join(","),
        member.nature.clone(),
        member.evs.canonical(),
        member.ivs.canonical(),
        member.gender.clone(),
        member.level.to_string(),
        member.shiny.to_string(),
        member.tera_type.clone(),
    ]
    .join("|")
}

/// Drives the generator for exactly `opts.teams` attempts and accumulates a
/// deduplicated, per-species-capped pool of members.
pub fn build_pool(
    generator: &mut dyn TeamGenerator,
    format: &str,
    opts: &PoolOptions,
    rng: &mut SmallRng,
) -> Result<PoolFile> {
    let mut pool: Vec<TeamMember> = Vec::new();
    let mut per_species: HashMap<String, usize> = HashMap::new();
    let mut seen_set_keys: HashSet<String> = HashSet::new();

    for attempt in 0..opts.teams {
        let team = generator
            .generate(format)
            .with_context(|| format!("Team generation failed at attempt {}", attempt + 1))?;

        let picks: Vec<TeamMember> = if opts.one_mon_per_team {
            match team.len() {
                0 => Vec::new(),
                len => {
                    let idx = rng.gen_range(0..len);
                    vec![team[idx].clone()]
                }
            }
        } else {
            team
        };

        for member in picks {
            let key = opts.dedupe_exact_sets.then(|| set_key(&member));
            if let Some(key) = &key {
                if seen_set_keys.contains(key) {
                    continue;
                }
            }
            let count = per_species.get(&member.species).copied().unwrap_or(0);
            if count >= opts.max_per_species {
                continue;
            }
            per_species.insert(member.species.clone(), count + 1);
            if let Some(key) = key {
                seen_set_keys.insert(key);
            }
            pool.push(member);
        }

        if (attempt + 1) % PROGRESS_INTERVAL == 0 {
            println!(
                "Generated {} teams. Pool size so far: {}",
                attempt + 1,
                pool.len()
            );
        }
    }

    Ok(PoolFile {
        format: format.to_string(),
        generated_teams: opts.teams,
        one_mon_per_team: opts.one_mon_per_team,
        max_per_species: opts.max_per_species,
        dedupe_exact_sets: opts.dedupe_exact_sets,
        pool_size: pool.len(),
        pool,
    })
}
