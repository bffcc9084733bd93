// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! This module defines all configuration structs that map to sections in
//! `morphogen.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MorphogenConfig {
    pub genome: GenomeConfig,
    pub mutation: MutationConfig,
    pub evolution: EvolutionConfig,
    pub logging: LoggingConfig,
}

/// Genome loading and validation configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GenomeConfig {
    /// Schema document; when unset the schema is searched for, then the embedded copy is used
    pub schema_path: Option<PathBuf>,
}

/// Per-section mutation rates and step sizes
///
/// A rate is the probability that an entity (or a whole section, for
/// section-wide operators) is perturbed in one mutation call. A rate of zero
/// disables the operator without consuming any random draws.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MutationConfig {
    pub muscle_rate: f64,
    pub muscle_strength_jitter: f64,
    pub max_muscle_strength: f64,
    pub brain_rate: f64,
    pub vision_rate: f64,
    /// Fraction of the full field-of-view (360°) and range (128) scale moved per step
    pub vision_step: f64,
    pub vision_energy_step: f64,
    pub vision_clarity_step: f64,
    pub pheromone_rate: f64,
    /// Emitter energy at or below this counts as a disabled pair
    pub pheromone_disable_threshold: f64,
    pub pheromone_enable_value: f64,
    pub material_rate: f64,
    pub material_nudge: f64,
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self {
            muscle_rate: 0.1,
            muscle_strength_jitter: 0.25,
            max_muscle_strength: 10.0,
            brain_rate: 0.05,
            vision_rate: 0.05,
            vision_step: 0.05,
            vision_energy_step: 0.05,
            vision_clarity_step: 0.05,
            pheromone_rate: 0.05,
            pheromone_disable_threshold: 0.001,
            pheromone_enable_value: 0.5,
            material_rate: 0.1,
            material_nudge: 0.05,
        }
    }
}

impl MutationConfig {
    /// Every `*_rate` field, for validation and logging
    pub fn rates(&self) -> [(&'static str, f64); 5] {
        [
            ("muscle_rate", self.muscle_rate),
            ("brain_rate", self.brain_rate),
            ("vision_rate", self.vision_rate),
            ("pheromone_rate", self.pheromone_rate),
            ("material_rate", self.material_rate),
        ]
    }

    /// Every step or jitter magnitude
    pub fn steps(&self) -> [(&'static str, f64); 5] {
        [
            ("muscle_strength_jitter", self.muscle_strength_jitter),
            ("vision_step", self.vision_step),
            ("vision_energy_step", self.vision_energy_step),
            ("vision_clarity_step", self.vision_clarity_step),
            ("material_nudge", self.material_nudge),
        ]
    }
}

/// Generation stepping configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EvolutionConfig {
    pub tournament_size: usize,
    pub generations: u32,
    /// Process the members of one generation on the rayon thread pool
    pub parallel: bool,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            tournament_size: 3,
            generations: 1,
            parallel: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level for crates without a debug flag
    pub level: String,
    pub format: LogFormat,
    /// Also write JSON logs under this directory (requires the `file-logging` feature)
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
            log_dir: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_sections_fill_defaults() {
        let config: MorphogenConfig = toml::from_str(
            r#"
            [mutation]
            muscle_rate = 0.5

            [logging]
            format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(config.mutation.muscle_rate, 0.5);
        assert_eq!(config.mutation.max_muscle_strength, 10.0);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.evolution, EvolutionConfig::default());
    }

    #[test]
    fn test_serializes_to_json() {
        let value = serde_json::to_value(MorphogenConfig::default()).unwrap();
        assert_eq!(value["evolution"]["tournament_size"], 3);
        assert_eq!(value["logging"]["format"], "text");
    }
}
