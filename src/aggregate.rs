use crate::dex::{normalize_id, Dex};
use anyhow::{bail, Result};
use std::collections::{BTreeSet, HashSet};

/// Union of the learnsets of `species_id` and every ancestor reachable by
/// following prevo links. A species without a learnset entry contributes
/// nothing; a prevo that is missing from the dex ends the chain.
///
/// The chain is assumed acyclic. A repeated id is a corrupted database and
/// aborts the run instead of looping.
pub fn collect_learnable_moves(dex: &dyn Dex, species_id: &str) -> Result<BTreeSet<String>> {
    let mut moves = BTreeSet::new();
    let mut visited: HashSet<String> = HashSet::new();
    let mut current = normalize_id(species_id);

    loop {
        if !visited.insert(current.clone()) {
            bail!("Cyclic evolution chain detected at '{current}'");
        }
        if let Some(learnset) = dex.learnset(&current) {
            moves.extend(learnset.iter().cloned());
        }
        let Some(species) = dex.species(&current) else {
            break;
        };
        match &species.prevo {
            Some(prevo) => current = normalize_id(prevo),
            None => break,
        }
    }

    Ok(moves)
}
