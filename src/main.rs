use pokemon_set_db::extract::ExtractOptions;
use pokemon_set_db::model::Nonstandard;
use pokemon_set_db::pool::PoolOptions;
use pokemon_set_db::{run, CliOptions, RunMode};
use std::env;
use std::path::PathBuf;

fn usage() -> ! {
    eprintln!(
        "Usage: cargo run --release -- <extract|sample> [--format ID] [--output FILE] [--dex dex.json] \
[--bridge tools/sim_bridge.js] [--showdown pokemon-showdown] [--seed SEED] \
[--min-moves N] [--restricted-moves] [--allow-nonstandard Past,Future] \
[--teams N] [--all-members] [--max-per-species N] [--no-dedupe]"
    );
    std::process::exit(1);
}

fn parse_nonstandard(name: &str) -> anyhow::Result<Nonstandard> {
    match name.to_ascii_lowercase().as_str() {
        "past" => Ok(Nonstandard::Past),
        "future" => Ok(Nonstandard::Future),
        "cap" => Ok(Nonstandard::Cap),
        "lgpe" => Ok(Nonstandard::Lgpe),
        "custom" => Ok(Nonstandard::Custom),
        "gigantamax" => Ok(Nonstandard::Gigantamax),
        "unobtainable" => Ok(Nonstandard::Unobtainable),
        other => Err(anyhow::anyhow!("Unknown nonstandard tag {other}")),
    }
}

fn parse_args() -> anyhow::Result<CliOptions> {
    let mut args = env::args().skip(1);
    let mode_arg = match args.next() {
        Some(mode) => mode,
        None => usage(),
    };
    let is_extract = match mode_arg.as_str() {
        "extract" => true,
        "sample" => false,
        "--help" | "-h" => usage(),
        other => anyhow::bail!("Unknown mode {other} (use extract or sample)"),
    };

    let mut format: Option<String> = None;
    let mut output_path: Option<PathBuf> = None;
    let mut dex_path = PathBuf::from("dex.json");
    let mut bridge_script = PathBuf::from("tools/sim_bridge.js");
    let mut showdown_dir = PathBuf::from("pokemon-showdown");
    let mut seed = 0u64;
    let mut extract_opts = ExtractOptions::default();
    let mut pool_opts = PoolOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--format" => {
                format = Some(
                    args.next()
                        .ok_or_else(|| anyhow::anyhow!("--format requires a format id"))?,
                );
            }
            "--output" => {
                output_path = Some(args.next().map(PathBuf::from).ok_or_else(|| {
                    anyhow::anyhow!("--output requires a path (e.g. --output pool.json)")
                })?);
            }
            "--dex" => {
                dex_path = args.next().map(PathBuf::from).ok_or_else(|| {
                    anyhow::anyhow!("--dex requires a path (e.g. --dex dex.json)")
                })?;
            }
            "--bridge" => {
                bridge_script = args.next().map(PathBuf::from).ok_or_else(|| {
                    anyhow::anyhow!("--bridge requires a path to sim_bridge.js")
                })?;
            }
            "--showdown" => {
                showdown_dir = args.next().map(PathBuf::from).ok_or_else(|| {
                    anyhow::anyhow!("--showdown requires the pokemon-showdown checkout path")
                })?;
            }
            "--seed" => {
                let val = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--seed requires a number"))?;
                seed = val.parse()?;
            }
            "--min-moves" => {
                let val = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--min-moves requires a number"))?;
                extract_opts.min_moves = val.parse()?;
            }
            "--restricted-moves" => {
                extract_opts.restricted_moves = true;
            }
            "--allow-nonstandard" => {
                let val = args.next().ok_or_else(|| {
                    anyhow::anyhow!("--allow-nonstandard requires a comma-separated tag list")
                })?;
                for part in val.split(',') {
                    extract_opts
                        .allow_nonstandard
                        .insert(parse_nonstandard(part.trim())?);
                }
            }
            "--teams" => {
                let val = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--teams requires a number"))?;
                pool_opts.teams = val.parse()?;
            }
            "--all-members" => {
                pool_opts.one_mon_per_team = false;
            }
            "--max-per-species" => {
                let val = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--max-per-species requires a number"))?;
                pool_opts.max_per_species = val.parse()?;
            }
            "--no-dedupe" => {
                pool_opts.dedupe_exact_sets = false;
            }
            "--help" | "-h" => usage(),
            other => return Err(anyhow::anyhow!("Unknown argument {other}")),
        }
    }

    let format = format.unwrap_or_else(|| {
        if is_extract {
            "gen9ou".to_string()
        } else {
            "gen9randombattle".to_string()
        }
    });
    let output_path = output_path.unwrap_or_else(|| {
        if is_extract {
            PathBuf::from("legal_sets.json")
        } else {
            PathBuf::from(format!("{format}_db.json"))
        }
    });
    let mode = if is_extract {
        RunMode::Extract(extract_opts)
    } else {
        RunMode::Sample(pool_opts)
    };

    Ok(CliOptions {
        mode,
        format,
        dex_path,
        bridge_script,
        showdown_dir,
        output_path,
        seed,
    })
}

fn main() -> anyhow::Result<()> {
    let opts = parse_args()?;
    run(opts)
}
