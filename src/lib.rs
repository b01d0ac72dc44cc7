//! Extraction and sampling pipelines over Pokemon Showdown data.
//!
//! Two run modes share one output sink: `extract` walks the whole dex and
//! emits the legal abilities and moves per species, `sample` drives the
//! random team generator into a deduplicated, capped set pool.

pub mod aggregate;
pub mod bridge;
pub mod dex;
pub mod extract;
pub mod legality;
pub mod model;
pub mod pool;

use crate::bridge::ShowdownBridge;
use crate::dex::JsonDex;
use crate::extract::{extract_legal_records, ExtractOptions};
use crate::pool::{build_pool, PoolOptions};
use anyhow::{Context, Result};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub enum RunMode {
    Extract(ExtractOptions),
    Sample(PoolOptions),
}

#[derive(Debug, Clone)]
pub struct CliOptions {
    pub mode: RunMode,
    pub format: String,
    pub dex_path: PathBuf,
    pub bridge_script: PathBuf,
    pub showdown_dir: PathBuf,
    pub output_path: PathBuf,
    pub seed: u64,
}

/// Serializes `value` next to the output path and moves it into place in one
/// step, so a failed run never leaves a truncated artifact behind.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, json)
        .with_context(|| format!("Failed to write {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("Failed to move output into place at {}", path.display()))?;
    Ok(())
}

pub fn run(opts: CliOptions) -> Result<()> {
    let mut bridge = ShowdownBridge::spawn(&opts.bridge_script, &opts.showdown_dir, &opts.format)?;
    match &opts.mode {
        RunMode::Extract(extract_opts) => {
            let dex = JsonDex::load(&opts.dex_path)?;
            let rules = bridge.format_rules(&opts.format)?;
            let records = extract_legal_records(&dex, &bridge, &rules, extract_opts)?;
            write_json(&opts.output_path, &records)?;
            println!(
                "Wrote {} legal records to {}",
                records.len(),
                opts.output_path.display()
            );
        }
        RunMode::Sample(pool_opts) => {
            if pool_opts.teams == 0 {
                anyhow::bail!("--teams must be > 0");
            }
            if pool_opts.max_per_species == 0 {
                anyhow::bail!("--max-per-species must be > 0");
            }
            println!(
                "Generating {} teams for {}...",
                pool_opts.teams, opts.format
            );
            let mut rng = SmallRng::seed_from_u64(opts.seed);
            let file = build_pool(&mut bridge, &opts.format, pool_opts, &mut rng)?;
            write_json(&opts.output_path, &file)?;
            println!(
                "Wrote {} mons to {}",
                file.pool_size,
                opts.output_path.display()
            );
        }
    }
    Ok(())
}
