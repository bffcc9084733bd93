// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Two-parent crossover
//!
//! Whole sections are inherited from one parent per coin flip. Muscles and
//! body cells are merged index by index. The child gets a fresh seed drawn
//! from the stream and an id derived from both parent ids.

use morphogen_genome::{hash_string, Body, Genome, MAX_ID_LENGTH};
use tracing::debug;

use crate::random::DeterministicStream;

fn pick<T: Clone>(stream: &mut DeterministicStream, left: &T, right: &T) -> T {
    if stream.coin() {
        left.clone()
    } else {
        right.clone()
    }
}

/// Index-aligned merge: a coin where both sides have an entry, otherwise the side that has one
pub fn merge_aligned<T: Clone>(stream: &mut DeterministicStream, left: &[T], right: &[T]) -> Vec<T> {
    let len = left.len().max(right.len());
    (0..len)
        .filter_map(|i| match (left.get(i), right.get(i)) {
            (Some(l), Some(r)) => Some(pick(stream, l, r)),
            (Some(only), None) | (None, Some(only)) => Some(only.clone()),
            (None, None) => None,
        })
        .collect()
}

/// `<lower id>_<higher id>_<SEED HEX>`, hashed down when it would be too long
pub fn child_id(left_id: &str, right_id: &str, seed: u64) -> String {
    let (lo, hi) = if left_id <= right_id {
        (left_id, right_id)
    } else {
        (right_id, left_id)
    };
    let id = format!("{}_{}_{:X}", lo, hi, seed);
    if id.len() <= MAX_ID_LENGTH {
        return id;
    }
    format!("{}_{:X}", hash_string(&format!("{}_{}", lo, hi)), seed)
}

/// Mean of both parents; a missing fitness counts as 0
pub fn placeholder_fitness(left: Option<f64>, right: Option<f64>) -> f64 {
    (left.unwrap_or(0.0) + right.unwrap_or(0.0)) / 2.0
}

/// Breed a child from two parents
pub fn combine(left: &Genome, right: &Genome, stream: &mut DeterministicStream) -> Genome {
    let version = pick(stream, &left.version, &right.version);
    let name = pick(stream, &left.name, &right.name);
    let metadata = pick(stream, &left.metadata, &right.metadata);
    let brain = pick(stream, &left.brain, &right.brain);
    let senses = pick(stream, &left.senses, &right.senses);
    let reproduction = pick(stream, &left.reproduction, &right.reproduction);
    let pheromone_pairs = pick(stream, &left.pheromone_pairs, &right.pheromone_pairs);
    let nerves = pick(stream, &left.nerves, &right.nerves);
    let energy = pick(stream, &left.energy, &right.energy);
    let fitness_weights = pick(stream, &left.fitness_weights, &right.fitness_weights);

    let body = Body {
        grid: pick(stream, &left.body.grid, &right.body.grid),
        cells: merge_aligned(stream, &left.body.cells, &right.body.cells),
    };
    let muscles = merge_aligned(stream, &left.muscles, &right.muscles);

    let seed = stream.next_u64();
    let id = child_id(&left.id, &right.id, seed);
    debug!("🧬 [CROSSOVER] {} x {} -> {}", left.id, right.id, id);

    Genome {
        version,
        id,
        name,
        seed,
        pre_eval_fitness: Some(placeholder_fitness(left.pre_eval_fitness, right.pre_eval_fitness)),
        null_fitness: false,
        metadata,
        body,
        brain,
        senses,
        reproduction,
        muscles,
        pheromone_pairs,
        nerves,
        energy,
        fitness_weights,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use morphogen_genome::create_minimal_genome;

    #[test]
    fn test_child_id_sorted_and_hex() {
        assert_eq!(child_id("b", "a", 255), "a_b_FF");
        assert_eq!(child_id("a", "b", 255), "a_b_FF");
        assert_eq!(child_id("x", "x", 0), "x_x_0");
    }

    #[test]
    fn test_long_child_id_is_hashed() {
        let left = "l".repeat(40);
        let right = "r".repeat(40);
        let id = child_id(&left, &right, u64::MAX);
        assert!(id.len() <= MAX_ID_LENGTH);
        assert!(id.ends_with("_FFFFFFFFFFFFFFFF"));
        assert_eq!(id, child_id(&right, &left, u64::MAX));
    }

    #[test]
    fn test_placeholder_fitness_treats_missing_as_zero() {
        assert_eq!(placeholder_fitness(Some(3.0), Some(1.0)), 2.0);
        assert_eq!(placeholder_fitness(Some(3.0), None), 1.5);
        assert_eq!(placeholder_fitness(None, None), 0.0);
    }

    #[test]
    fn test_merge_aligned_keeps_longer_tail() {
        let mut stream = DeterministicStream::derive(4, &[2]);
        let merged = merge_aligned(&mut stream, &[1, 2], &[10, 20, 30, 40]);
        assert_eq!(merged.len(), 4);
        assert!(merged[0] == 1 || merged[0] == 10);
        assert!(merged[1] == 2 || merged[1] == 20);
        assert_eq!(&merged[2..], &[30, 40]);
    }

    #[test]
    fn test_combine_is_deterministic() {
        let mut left = create_minimal_genome("left", 1).unwrap();
        left.name = "Left".to_string();
        left.pre_eval_fitness = Some(1.0);
        let mut right = create_minimal_genome("right", 2).unwrap();
        right.name = "Right".to_string();
        right.muscles.clear();

        let a = combine(&left, &right, &mut DeterministicStream::derive(8, &[0, 0, 2]));
        let b = combine(&left, &right, &mut DeterministicStream::derive(8, &[0, 0, 2]));
        assert_eq!(a, b);
        assert!(a.id.starts_with("left_right_"));
        assert_eq!(a.id, format!("left_right_{:X}", a.seed));
        assert_eq!(a.pre_eval_fitness, Some(0.5));
        assert!(a.name == "Left" || a.name == "Right");
        // right has no muscles, so left's muscle survives at index 0
        assert_eq!(a.muscles, left.muscles);
    }
}
