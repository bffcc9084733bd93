// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
# Morphogen Evolution

Deterministic genetic-algorithm operators over [`morphogen_genome::Genome`]:

- [`DeterministicStream`]: reproducible random streams keyed by a base seed and role list
- [`mutate`]: per-section perturbation with clamped bounds
- [`combine`]: two-parent crossover
- [`tournament`]: selection with an id tie-break
- [`Population`], [`next_generation`], [`evolve`]: generation stepping

Every operator takes its stream explicitly. Given the same population seed
the same generations come out, whether members are bred sequentially or on
the rayon pool.
*/

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod crossover;
pub mod generation;
pub mod mutation;
pub mod population;
pub mod random;
pub mod selection;

pub use crossover::{child_id, combine, placeholder_fitness};
pub use generation::{
    breed_child, evolve, next_generation, ROLE_CROSSOVER, ROLE_MUTATE, ROLE_SELECT_LEFT, ROLE_SELECT_RIGHT,
};
pub use mutation::{apply_mutations, mutate};
pub use population::{Member, Population};
pub use random::{mix64, random_seed, DeterministicStream};
pub use selection::{compare_members, tournament};
