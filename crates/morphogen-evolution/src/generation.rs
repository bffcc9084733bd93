// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Generation stepping.

Child `i` of generation `g` is produced from four streams keyed
`(g, i, role)`: two tournaments pick the parents, crossover breeds them and
the child is mutated. No stream is shared between children, so the members
of a generation can be produced in any order, or in parallel, with the same
result.
*/

use morphogen_config::{EvolutionConfig, MutationConfig};
use morphogen_genome::{EvoError, EvoResult};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::crossover::combine;
use crate::mutation::apply_mutations;
use crate::population::{Member, Population};
use crate::selection::tournament;

pub const ROLE_SELECT_LEFT: i32 = 0;
pub const ROLE_SELECT_RIGHT: i32 = 1;
pub const ROLE_CROSSOVER: i32 = 2;
pub const ROLE_MUTATE: i32 = 3;

fn role_index(value: u64, what: &str) -> EvoResult<i32> {
    i32::try_from(value).map_err(|_| EvoError::Range(format!("{} {} does not fit a stream role", what, value)))
}

/// Produce child `index` of `generation`
pub fn breed_child(
    population: &Population,
    mutation: &MutationConfig,
    tournament_size: usize,
    generation: i32,
    index: i32,
) -> EvoResult<Member> {
    let members = population.members();
    let mut left_stream = population.create_stream(&[generation, index, ROLE_SELECT_LEFT]);
    let left = tournament(members, tournament_size, &mut left_stream)?;
    let mut right_stream = population.create_stream(&[generation, index, ROLE_SELECT_RIGHT]);
    let right = tournament(members, tournament_size, &mut right_stream)?;

    let child = combine(
        &left.genome,
        &right.genome,
        &mut population.create_stream(&[generation, index, ROLE_CROSSOVER]),
    );
    let child = apply_mutations(
        child,
        mutation,
        &mut population.create_stream(&[generation, index, ROLE_MUTATE]),
    );
    debug!(
        "🧬 [GENERATION] g{} #{}: {} x {} -> {}",
        generation, index, left.genome.id, right.genome.id, child.id
    );
    Ok(Member::from_genome(child))
}

/// Replace every member with a bred child; the seed carries over
///
/// # Errors
///
/// `Precondition` for an empty population, `Range` for a zero tournament
/// size or an index that does not fit a stream role.
pub fn next_generation(
    population: &Population,
    mutation: &MutationConfig,
    evolution: &EvolutionConfig,
    generation: u32,
) -> EvoResult<Population> {
    if population.is_empty() {
        return Err(EvoError::Precondition("cannot breed from an empty population".to_string()));
    }
    let generation = role_index(u64::from(generation), "generation")?;
    let indices = (0..population.len())
        .map(|i| role_index(i as u64, "member index"))
        .collect::<EvoResult<Vec<i32>>>()?;

    let size = evolution.tournament_size;
    let children = if evolution.parallel {
        indices
            .into_par_iter()
            .map(|i| breed_child(population, mutation, size, generation, i))
            .collect::<EvoResult<Vec<Member>>>()?
    } else {
        indices
            .into_iter()
            .map(|i| breed_child(population, mutation, size, generation, i))
            .collect::<EvoResult<Vec<Member>>>()?
    };
    Ok(Population::new(children, population.seed()))
}

/// Run `evolution.generations` generations, numbered from 0
pub fn evolve(
    population: Population,
    mutation: &MutationConfig,
    evolution: &EvolutionConfig,
) -> EvoResult<Population> {
    let mut current = population;
    for generation in 0..evolution.generations {
        current = next_generation(&current, mutation, evolution, generation)?;
        if let Some(best) = current.best() {
            info!(
                "🧬 [GENERATION] {} done: {} members, best {} ({})",
                generation,
                current.len(),
                best.genome.id,
                best.fitness
            );
        }
    }
    Ok(current)
}
