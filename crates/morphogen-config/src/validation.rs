// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! This module checks that configuration values are within valid ranges
//! before any genome is touched.

use crate::{ConfigError, ConfigResult, MorphogenConfig};

/// Validation errors that can occur during config validation
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    OutOfRange { field: String, value: f64, min: f64, max: f64 },
    Negative { field: String, value: f64 },
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfRange { field, value, min, max } => {
                write!(f, "{} = {} is outside [{}, {}]", field, value, min, max)
            }
            Self::Negative { field, value } => {
                write!(f, "{} = {} must not be negative", field, value)
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

/// Validate the complete configuration
///
/// Checks for:
/// - Mutation rates and the pheromone enable value in [0, 1]
/// - Non-negative step sizes and threshold
/// - `max_muscle_strength >= 0.1`
/// - `tournament_size >= 1`
/// - A non-empty log level
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every problem found
pub fn validate_config(config: &MorphogenConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();

    validate_mutation(config, &mut errors);
    validate_evolution(config, &mut errors);
    validate_logging(config, &mut errors);

    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");

        return Err(ConfigError::ValidationError(format!(
            "Configuration validation failed:\n{}",
            error_messages
        )));
    }

    Ok(())
}

fn validate_mutation(config: &MorphogenConfig, errors: &mut Vec<ConfigValidationError>) {
    let mutation = &config.mutation;
    for (name, rate) in mutation.rates() {
        check_unit(&format!("mutation.{}", name), rate, errors);
    }
    check_unit("mutation.pheromone_enable_value", mutation.pheromone_enable_value, errors);

    for (name, step) in mutation.steps() {
        check_non_negative(&format!("mutation.{}", name), step, errors);
    }
    check_non_negative(
        "mutation.pheromone_disable_threshold",
        mutation.pheromone_disable_threshold,
        errors,
    );

    if !(mutation.max_muscle_strength >= 0.1) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "mutation.max_muscle_strength".to_string(),
            reason: format!("must be at least 0.1, got {}", mutation.max_muscle_strength),
        });
    }
}

fn validate_evolution(config: &MorphogenConfig, errors: &mut Vec<ConfigValidationError>) {
    if config.evolution.tournament_size == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "evolution.tournament_size".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
}

fn validate_logging(config: &MorphogenConfig, errors: &mut Vec<ConfigValidationError>) {
    if config.logging.level.trim().is_empty() {
        errors.push(ConfigValidationError::InvalidValue {
            field: "logging.level".to_string(),
            reason: "must not be empty".to_string(),
        });
    }
}

// written as negated comparisons so NaN is rejected too
fn check_unit(field: &str, value: f64, errors: &mut Vec<ConfigValidationError>) {
    if !(0.0..=1.0).contains(&value) {
        errors.push(ConfigValidationError::OutOfRange {
            field: field.to_string(),
            value,
            min: 0.0,
            max: 1.0,
        });
    }
}

fn check_non_negative(field: &str, value: f64, errors: &mut Vec<ConfigValidationError>) {
    if !(value >= 0.0) {
        errors.push(ConfigValidationError::Negative {
            field: field.to_string(),
            value,
        });
    }
}
