// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Ordered population with its base seed

use morphogen_genome::Genome;

use crate::random::DeterministicStream;

/// One genome with the fitness used for selection
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub genome: Genome,
    pub fitness: f64,
}

impl Member {
    pub fn new(genome: Genome, fitness: f64) -> Self {
        Self { genome, fitness }
    }

    /// Use the genome's placeholder fitness, or 0 when it has none
    pub fn from_genome(genome: Genome) -> Self {
        let fitness = genome.pre_eval_fitness.unwrap_or(0.0);
        Self { genome, fitness }
    }
}

/// Members in a fixed order; index `i` keys that member's streams
#[derive(Debug, Clone, PartialEq)]
pub struct Population {
    members: Vec<Member>,
    seed: u64,
}

impl Population {
    pub fn new(members: Vec<Member>, seed: u64) -> Self {
        Self { members, seed }
    }

    pub fn from_genomes(genomes: Vec<Genome>, seed: u64) -> Self {
        Self::new(genomes.into_iter().map(Member::from_genome).collect(), seed)
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Stream for `roles` under this population's seed
    pub fn create_stream(&self, roles: &[i32]) -> DeterministicStream {
        DeterministicStream::derive(self.seed, roles)
    }

    /// Best fitness, ties broken towards the smaller id
    pub fn best(&self) -> Option<&Member> {
        self.members
            .iter()
            .max_by(|a, b| crate::selection::compare_members(a, b))
    }

    pub fn into_genomes(self) -> Vec<Genome> {
        self.members.into_iter().map(|m| m.genome).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use morphogen_genome::create_minimal_genome;

    #[test]
    fn test_streams_use_population_seed() {
        let population = Population::new(Vec::new(), 77);
        let mut a = population.create_stream(&[1, 2]);
        let mut b = DeterministicStream::derive(77, &[1, 2]);
        assert_eq!(a.next_u64(), b.next_u64());
        assert!(population.is_empty());
    }

    #[test]
    fn test_fitness_defaults_to_zero() {
        let mut scored = create_minimal_genome("scored", 1).unwrap();
        scored.pre_eval_fitness = Some(2.5);
        let unscored = create_minimal_genome("unscored", 2).unwrap();

        let population = Population::from_genomes(vec![scored, unscored], 3);
        assert_eq!(population.len(), 2);
        assert_eq!(population.members()[0].fitness, 2.5);
        assert_eq!(population.members()[1].fitness, 0.0);
        assert_eq!(population.best().unwrap().genome.id, "scored");

        let ids: Vec<String> = population.into_genomes().into_iter().map(|g| g.id).collect();
        assert_eq!(ids, vec!["scored", "unscored"]);
    }
}
