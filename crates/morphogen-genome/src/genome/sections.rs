// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Typed genome sections.

Each section is decoded once when a genome is loaded and encoded once when it
is saved. Optional fields are `Option`s so that presence survives a round
trip; open-ended objects keep unknown keys in a flattened `extra` map.
*/

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Grid coordinate `[x, y]`
pub type Coord = [u32; 2];

/// Genome bookkeeping; must name the RNG service that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub rng_service: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lineage: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Body {
    pub grid: Grid,
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Grid {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Cell {
    pub coord: Coord,
    pub tissue: TissueType,
    pub area: f64,
    pub edge: EdgeShape,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<Material>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TissueType {
    Muscle,
    Bone,
    Fat,
    Nerve,
    Skin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeShape {
    Straight,
    Convex,
    Concave,
    Serrated,
}

/// Material coefficients of one body cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Material {
    pub elasticity: f64,
    pub toughness: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub density: Option<f64>,
}

/// Brain sizing. Usage counters never exceed the budgets derived from `cell_count`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Brain {
    pub cell_count: u32,
    pub hidden_max: u32,
    pub hidden_used: u32,
    pub layer_limit: u32,
    pub layers_used: u32,
}

impl Brain {
    /// `cell_count²`
    pub fn max_hidden_nodes(&self) -> u64 {
        u64::from(self.cell_count) * u64::from(self.cell_count)
    }

    /// `max(1, cell_count / 2)`
    pub fn max_layers(&self) -> u64 {
        (u64::from(self.cell_count) / 2).max(1)
    }

    /// Hidden nodes granted or revoked with each layer
    pub fn hidden_budget_per_layer(&self) -> u64 {
        u64::from(self.cell_count)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Senses {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vision: Option<Vision>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pheromone: Option<PheromoneSense>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Vision {
    /// Degrees, 1..=360
    pub field_of_view: f64,
    /// Cells, 1..=128
    pub range: u32,
    pub processing_energy: f64,
    pub clarity_falloff: f64,
}

/// Summary of pheromone sensing capability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PheromoneSense {
    pub receptor_count: u32,
    pub sensitivity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Reproduction {
    pub mode: ReproductionMode,
    pub gestation_ticks: u32,
    pub offspring_energy_ratio: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReproductionMode {
    Fast,
    Slow,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Muscle {
    pub id: String,
    pub anchors: [String; 2],
    pub nerve_ending: Coord,
    pub rest_length: f64,
    pub width: f64,
    pub strength: f64,
    pub energy_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PheromonePair {
    pub id: String,
    pub emitter: PheromoneEnd,
    pub receptor: PheromoneEnd,
}

/// One side of a pheromone pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PheromoneEnd {
    pub specialization_energy: f64,
    pub radius: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle: Option<f64>,
    pub shape: PheromoneShape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PheromoneShape {
    Circle,
    Cone,
    Ring,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Nerves {
    pub endings: Vec<NerveEnding>,
    pub clusters: Vec<NerveCluster>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NerveEnding {
    pub id: String,
    pub coord: Coord,
    pub sensitivity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NerveCluster {
    pub id: String,
    /// Ids of member nerve endings
    pub endings: Vec<String>,
}

/// Energy budget shares by name, each in [0, 1]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnergyBudget(pub BTreeMap<String, f64>);

/// Named fitness multipliers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FitnessWeights(pub BTreeMap<String, f64>);
