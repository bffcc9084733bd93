// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Morphogen - Deterministic Genome Evolution
//!
//! Morphogen evolves populations of creature genomes. A genome describes a
//! body on a cell grid, a brain budget, senses, muscles and pheromone glands;
//! it is validated against a JSON schema, stored as CSV or JSONL, and bred
//! with genetic operators that are fully reproducible from one base seed.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use morphogen::prelude::*;
//!
//! let validator = SchemaValidator::embedded()?;
//! let genomes = load_genomes("population.csv".as_ref(), GenomeFormat::Csv, &validator)?;
//!
//! let population = Population::from_genomes(genomes, 2025);
//! let next = evolve(population, &MutationConfig::default(), &EvolutionConfig::default())?;
//!
//! write_genomes("next.jsonl".as_ref(), GenomeFormat::Jsonl, &next.into_genomes())?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Foundation: morphogen-config, morphogen-observability  │
//! │  (TOML + overrides, tracing setup)                      │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Data: morphogen-genome                                 │
//! │  (Canonical JSON, schema validation, CSV/JSONL codec)   │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Algorithms: morphogen-evolution                        │
//! │  (Streams, mutation, crossover, tournament selection)   │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! The `evolve_genomes` tool wires these together; [`pipeline`] is the
//! library half of it.
//!
//! ## License
//!
//! Apache-2.0

pub use morphogen_config as config;
pub use morphogen_evolution as evolution;
pub use morphogen_genome as genome;
pub use morphogen_observability as observability;

pub mod pipeline;

/// Prelude - commonly used types and functions
pub mod prelude {
    pub use morphogen_config::{EvolutionConfig, MorphogenConfig, MutationConfig};
    pub use morphogen_evolution::{
        combine, evolve, mutate, next_generation, tournament, DeterministicStream, Member, Population,
    };
    pub use morphogen_genome::{
        load_genomes, read_genomes, write_genomes, EvoError, EvoResult, Genome, GenomeFormat, SchemaValidator,
        Section, Violation,
    };

    pub use crate::pipeline::{evolve_file, EvolveRequest, RunSummary};
}
