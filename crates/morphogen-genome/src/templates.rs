// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Genome templates.

Provides a small, schema-valid genome embedded at compile time, used to
seed a population from scratch and as a fixture across the workspace.
*/

use crate::{EvoError, EvoResult, Genome, MAX_ID_LENGTH};

/// Embedded minimal genome (loaded at compile time)
pub const MINIMAL_GENOME_JSON: &str = include_str!("../genomes/minimal_genome.json");

/// Decode the embedded minimal genome as-is
pub fn load_minimal_genome() -> EvoResult<Genome> {
    Genome::from_json_str(MINIMAL_GENOME_JSON)
}

/// Minimal genome under a new id and seed
pub fn create_minimal_genome(id: &str, seed: u64) -> EvoResult<Genome> {
    if id.is_empty() || id.chars().count() > MAX_ID_LENGTH {
        return Err(EvoError::Range(format!(
            "genome id must be 1-{} characters, got {}",
            MAX_ID_LENGTH,
            id.chars().count()
        )));
    }
    let mut genome = load_minimal_genome()?;
    genome.id = id.to_string();
    genome.seed = seed;
    Ok(genome)
}
