// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
The genome entity: header scalars plus ten typed sections.

A [`Genome`] is decoded once from its JSON form (integral floats normalised
first) and re-encoded on demand. Every section can be read and replaced as
canonical text, which is what the tabular codec stores per column.
*/

pub mod sections;

pub use sections::*;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::canonical::{normalize, parse_json, to_canonical_string};
use crate::codec::FITNESS_KEY;
use crate::{EvoError, EvoResult, Violation};

/// The only genome format version understood by this crate
pub const GENOME_VERSION: &str = "v0";

/// Longest allowed genome id
pub const MAX_ID_LENGTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Genome {
    pub version: String,
    pub id: String,
    pub name: String,
    pub seed: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_eval_fitness: Option<f64>,
    /// Fitness slot present but empty; only read while `pre_eval_fitness` is `None`
    #[serde(skip)]
    pub null_fitness: bool,
    pub metadata: Metadata,
    pub body: Body,
    pub brain: Brain,
    pub senses: Senses,
    pub reproduction: Reproduction,
    pub muscles: Vec<Muscle>,
    pub pheromone_pairs: Vec<PheromonePair>,
    pub nerves: Nerves,
    pub energy: EnergyBudget,
    pub fitness_weights: FitnessWeights,
}

/// One of the ten independently encoded nested sections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Section {
    Metadata,
    Body,
    Brain,
    Senses,
    Reproduction,
    Muscles,
    PheromonePairs,
    Nerves,
    Energy,
    FitnessWeights,
}

impl Section {
    /// Sections in storage order
    pub const ALL: [Section; 10] = [
        Section::Metadata,
        Section::Body,
        Section::Brain,
        Section::Senses,
        Section::Reproduction,
        Section::Muscles,
        Section::PheromonePairs,
        Section::Nerves,
        Section::Energy,
        Section::FitnessWeights,
    ];

    /// Key in the expanded (JSON/JSONL) form
    pub fn key(self) -> &'static str {
        match self {
            Section::Metadata => "metadata",
            Section::Body => "body",
            Section::Brain => "brain",
            Section::Senses => "senses",
            Section::Reproduction => "reproduction",
            Section::Muscles => "muscles",
            Section::PheromonePairs => "pheromone_pairs",
            Section::Nerves => "nerves",
            Section::Energy => "energy",
            Section::FitnessWeights => "fitness_weights",
        }
    }

    /// Column name in the tabular (CSV) form
    pub fn column(self) -> &'static str {
        match self {
            Section::Metadata => "metadata_json",
            Section::Body => "body_json",
            Section::Brain => "brain_json",
            Section::Senses => "senses_json",
            Section::Reproduction => "reproduction_json",
            Section::Muscles => "muscles_json",
            Section::PheromonePairs => "pheromones_json",
            Section::Nerves => "nerves_json",
            Section::Energy => "energy_json",
            Section::FitnessWeights => "fitness_json",
        }
    }

    pub fn from_key(key: &str) -> Option<Section> {
        Section::ALL.into_iter().find(|s| s.key() == key)
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl Genome {
    /// Decode a genome from its expanded JSON form
    pub fn from_value(value: Value) -> EvoResult<Self> {
        let null_fitness = value.get(FITNESS_KEY).map_or(false, Value::is_null);
        let mut genome: Genome = decode("genome", value)?;
        genome.null_fitness = null_fitness;
        Ok(genome)
    }

    pub fn from_json_str(text: &str) -> EvoResult<Self> {
        Self::from_value(parse_json("genome", text)?)
    }

    /// Expanded JSON form (pre_eval_fitness omitted when absent, null when empty)
    pub fn to_value(&self) -> EvoResult<Value> {
        let mut value = serde_json::to_value(self)?;
        if self.has_null_fitness() {
            if let Value::Object(object) = &mut value {
                object.insert(FITNESS_KEY.to_string(), Value::Null);
            }
        }
        Ok(value)
    }

    /// True when the fitness slot exists but carries no number
    pub fn has_null_fitness(&self) -> bool {
        self.pre_eval_fitness.is_none() && self.null_fitness
    }

    /// True when a fitness slot (number or null) belongs in the encoded form
    pub fn has_fitness_slot(&self) -> bool {
        self.pre_eval_fitness.is_some() || self.null_fitness
    }

    /// Canonical text of the whole genome
    pub fn canonical_text(&self) -> EvoResult<String> {
        Ok(to_canonical_string(&self.to_value()?))
    }

    pub fn section_value(&self, section: Section) -> EvoResult<Value> {
        let value = match section {
            Section::Metadata => serde_json::to_value(&self.metadata)?,
            Section::Body => serde_json::to_value(&self.body)?,
            Section::Brain => serde_json::to_value(&self.brain)?,
            Section::Senses => serde_json::to_value(&self.senses)?,
            Section::Reproduction => serde_json::to_value(&self.reproduction)?,
            Section::Muscles => serde_json::to_value(&self.muscles)?,
            Section::PheromonePairs => serde_json::to_value(&self.pheromone_pairs)?,
            Section::Nerves => serde_json::to_value(&self.nerves)?,
            Section::Energy => serde_json::to_value(&self.energy)?,
            Section::FitnessWeights => serde_json::to_value(&self.fitness_weights)?,
        };
        Ok(value)
    }

    /// Canonical text of one section, as stored in its CSV column
    pub fn section_text(&self, section: Section) -> EvoResult<String> {
        Ok(to_canonical_string(&self.section_value(section)?))
    }

    /// Replace one section from its JSON form
    pub fn set_section_value(&mut self, section: Section, value: Value) -> EvoResult<()> {
        let context = section.column();
        match section {
            Section::Metadata => self.metadata = decode(context, value)?,
            Section::Body => self.body = decode(context, value)?,
            Section::Brain => self.brain = decode(context, value)?,
            Section::Senses => self.senses = decode(context, value)?,
            Section::Reproduction => self.reproduction = decode(context, value)?,
            Section::Muscles => self.muscles = decode(context, value)?,
            Section::PheromonePairs => self.pheromone_pairs = decode(context, value)?,
            Section::Nerves => self.nerves = decode(context, value)?,
            Section::Energy => self.energy = decode(context, value)?,
            Section::FitnessWeights => self.fitness_weights = decode(context, value)?,
        }
        Ok(())
    }

    /// Replace one section from JSON text
    pub fn set_section_text(&mut self, section: Section, text: &str) -> EvoResult<()> {
        let value = parse_json(section.column(), text)?;
        self.set_section_value(section, value)
    }

    /// Cross-field rules the schema cannot express
    pub fn invariant_violations(&self) -> Vec<Violation> {
        let mut violations = Vec::new();
        if self.version != GENOME_VERSION {
            violations.push(Violation::new(
                "$.version",
                format!("expected \"{}\", found \"{}\"", GENOME_VERSION, self.version),
            ));
        }

        let brain = &self.brain;
        let hidden_used = u64::from(brain.hidden_used);
        if hidden_used > brain.max_hidden_nodes() {
            violations.push(Violation::new(
                "$.brain.hidden_used",
                format!(
                    "{} exceeds cell_count² = {}",
                    brain.hidden_used,
                    brain.max_hidden_nodes()
                ),
            ));
        }
        if brain.hidden_used > brain.hidden_max {
            violations.push(Violation::new(
                "$.brain.hidden_used",
                format!("{} exceeds hidden_max {}", brain.hidden_used, brain.hidden_max),
            ));
        }
        if u64::from(brain.layers_used) > brain.max_layers() {
            violations.push(Violation::new(
                "$.brain.layers_used",
                format!(
                    "{} exceeds max(1, cell_count/2) = {}",
                    brain.layers_used,
                    brain.max_layers()
                ),
            ));
        }
        if brain.layers_used > brain.layer_limit {
            violations.push(Violation::new(
                "$.brain.layers_used",
                format!("{} exceeds layer_limit {}", brain.layers_used, brain.layer_limit),
            ));
        }
        violations
    }
}

fn decode<T: serde::de::DeserializeOwned>(context: &str, value: Value) -> EvoResult<T> {
    let value = normalize(value);
    let text = to_canonical_string(&value);
    serde_json::from_value(value).map_err(|err| EvoError::parse(context, err, &text))
}
