// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Genome Evolution Tool

Reads a genome set, checks it against the genome schema, evolves it and
writes the next population.

Usage:
  cargo run --bin evolve_genomes -- --csv population.csv --out next.jsonl --seed 42
  cargo run --bin evolve_genomes -- --jsonl population.jsonl --out next.csv --generations 5

Exit code 0 on success, 1 on any validation or I/O failure. Every schema
violation is printed on its own stderr line.
*/

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{ArgGroup, Parser};
use tracing::info;

use morphogen::config::{load_config_or_default, validate_config};
use morphogen::evolution::random_seed;
use morphogen::genome::{EvoError, GenomeFormat};
use morphogen::observability::{init_logging, CrateDebugFlags, DEBUG_ENV};
use morphogen::pipeline::{error_lines, evolve_file, resolve_validator, EvolveRequest};

/// Evolve a population of Morphogen genomes
#[derive(Parser, Debug)]
#[command(name = "evolve_genomes", version, author, long_about = None)]
#[command(group(ArgGroup::new("input").required(true).args(["csv", "jsonl"])))]
struct Args {
    /// Input genome set in CSV form
    #[arg(long, value_name = "PATH")]
    csv: Option<PathBuf>,

    /// Input genome set in JSONL form
    #[arg(long, value_name = "PATH")]
    jsonl: Option<PathBuf>,

    /// Output file; `.csv` or `.jsonl` picks the format
    #[arg(long, value_name = "PATH")]
    out: PathBuf,

    /// Base seed (random and logged when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Number of generations (overrides config)
    #[arg(long)]
    generations: Option<u32>,

    /// Configuration file (default: search for morphogen.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Genome schema file (overrides config)
    #[arg(long, value_name = "PATH")]
    schema: Option<PathBuf>,

    /// Enable debug logging for a crate, or `all` (repeatable)
    #[arg(long = "debug", value_name = "CRATE")]
    debug: Vec<String>,
}

impl Args {
    fn input(&self) -> Option<(PathBuf, GenomeFormat)> {
        match (&self.csv, &self.jsonl) {
            (Some(path), _) => Some((path.clone(), GenomeFormat::Csv)),
            (None, Some(path)) => Some((path.clone(), GenomeFormat::Jsonl)),
            (None, None) => None,
        }
    }

    fn overrides(&self) -> HashMap<String, String> {
        let mut overrides = HashMap::new();
        if let Some(generations) = self.generations {
            overrides.insert("generations".to_string(), generations.to_string());
        }
        if let Some(schema) = &self.schema {
            overrides.insert("schema_path".to_string(), schema.display().to_string());
        }
        overrides
    }

    fn debug_flags(&self) -> CrateDebugFlags {
        let mut flags = CrateDebugFlags::from_args(self.debug.iter().map(|c| format!("--debug-{}", c)));
        if let Ok(value) = std::env::var(DEBUG_ENV) {
            flags.merge_env_value(&value);
        }
        flags
    }
}

fn run(args: &Args) -> Result<()> {
    let config = load_config_or_default(args.config.as_deref(), Some(&args.overrides()))?;
    validate_config(&config)?;

    let _logging = init_logging(&args.debug_flags(), &config.logging)?;

    let (input, input_format) = args
        .input()
        .ok_or_else(|| EvoError::Precondition("one of --csv or --jsonl is required".to_string()))?;
    let validator = resolve_validator(config.genome.schema_path.as_deref())?;
    let seed = args.seed.unwrap_or_else(random_seed);

    let request = EvolveRequest {
        input,
        input_format,
        output: args.out.clone(),
        seed,
    };
    let summary = evolve_file(&request, &config, &validator)?;

    info!(
        "💾 [RUN] Wrote {} genomes to {} after {} generation(s), seed {}",
        summary.members,
        request.output.display(),
        summary.generations,
        seed
    );
    if let Some(best) = summary.best_id {
        info!("🏆 [RUN] Best placeholder fitness: {}", best);
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<EvoError>() {
                Some(evo) => {
                    for line in error_lines(evo) {
                        eprintln!("{}", line);
                    }
                }
                None => eprintln!("{:#}", err),
            }
            ExitCode::from(1)
        }
    }
}
