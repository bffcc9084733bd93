// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! File-to-file evolution run
//!
//! Load and validate a genome set, evolve it, validate the result and write
//! it out. Any failure leaves the output path untouched: the file appears
//! only once it is completely written.

use std::env;
use std::path::{Path, PathBuf};

use morphogen_config::MorphogenConfig;
use morphogen_evolution::{evolve, Population};
use morphogen_genome::schema::SCHEMA_PATH_ENV;
use morphogen_genome::{
    load_genomes, validate_genomes, write_genomes, EvoError, EvoResult, GenomeFormat, SchemaValidator,
};
use tracing::{debug, info};

/// One run of the evolve tool
#[derive(Debug, Clone, PartialEq)]
pub struct EvolveRequest {
    pub input: PathBuf,
    pub input_format: GenomeFormat,
    /// Format follows the extension (`.csv`, `.jsonl`)
    pub output: PathBuf,
    pub seed: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub members: usize,
    pub generations: u32,
    pub output_format: GenomeFormat,
    pub best_id: Option<String>,
}

/// Explicit schema file if given, else the located one, else the embedded copy
///
/// A path named by `MORPHOGEN_GENOME_SCHEMA` must exist; only an unsuccessful
/// directory search falls back to the embedded schema.
pub fn resolve_validator(explicit: Option<&Path>) -> EvoResult<SchemaValidator> {
    if let Some(path) = explicit {
        return SchemaValidator::from_path(path);
    }
    let env_override = env::var(SCHEMA_PATH_ENV).is_ok();
    match SchemaValidator::locate(None) {
        Ok(validator) => Ok(validator),
        Err(EvoError::Precondition(reason)) if !env_override => {
            debug!("📐 [SCHEMA] {}; using embedded schema", reason);
            SchemaValidator::embedded()
        }
        Err(err) => Err(err),
    }
}

pub fn evolve_file(
    request: &EvolveRequest,
    config: &MorphogenConfig,
    validator: &SchemaValidator,
) -> EvoResult<RunSummary> {
    let output_format = GenomeFormat::from_path(&request.output)?;
    let genomes = load_genomes(&request.input, request.input_format, validator)?;
    if genomes.is_empty() {
        return Err(EvoError::Precondition(format!(
            "{} contains no genomes",
            request.input.display()
        )));
    }
    info!(
        "🧬 [RUN] {} genomes, seed {}, {} generation(s)",
        genomes.len(),
        request.seed,
        config.evolution.generations
    );

    let population = evolve(
        Population::from_genomes(genomes, request.seed),
        &config.mutation,
        &config.evolution,
    )?;
    let best_id = population.best().map(|m| m.genome.id.clone());
    let genomes = population.into_genomes();

    validate_genomes(&genomes, validator)?.into_result()?;
    write_genomes(&request.output, output_format, &genomes)?;

    Ok(RunSummary {
        members: genomes.len(),
        generations: config.evolution.generations,
        output_format,
        best_id,
    })
}

/// One stderr line per violation, or the error itself when it carries none
pub fn error_lines(err: &EvoError) -> Vec<String> {
    let violations = err.violations();
    if violations.is_empty() {
        vec![err.to_string()]
    } else {
        violations.iter().map(|v| v.to_string()).collect()
    }
}
