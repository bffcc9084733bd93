// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Tournament selection

use std::cmp::Ordering;

use morphogen_genome::{EvoError, EvoResult};

use crate::population::Member;
use crate::random::DeterministicStream;

/// Total order used by tournaments: higher fitness first, then smaller id
///
/// `Ordering::Greater` means `a` beats `b`. Numerically equal fitness
/// (including `-0.0` and `0.0`) is a tie. NaN ranks below every number and
/// two NaNs tie.
pub fn compare_members(a: &Member, b: &Member) -> Ordering {
    compare_fitness(a.fitness, b.fitness).then_with(|| b.genome.id.cmp(&a.genome.id))
}

fn compare_fitness(a: f64, b: f64) -> Ordering {
    match a.partial_cmp(&b) {
        Some(ordering) => ordering,
        None => match (a.is_nan(), b.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Less,
            _ => Ordering::Greater,
        },
    }
}

/// Best of `size` draws, with replacement
pub fn tournament<'a>(members: &'a [Member], size: usize, stream: &mut DeterministicStream) -> EvoResult<&'a Member> {
    if members.is_empty() {
        return Err(EvoError::Range("tournament needs at least one member".to_string()));
    }
    if size == 0 {
        return Err(EvoError::Range("tournament size must be at least 1".to_string()));
    }
    let mut best = &members[stream.next_index(members.len())?];
    for _ in 1..size {
        let candidate = &members[stream.next_index(members.len())?];
        if compare_members(candidate, best) == Ordering::Greater {
            best = candidate;
        }
    }
    Ok(best)
}
