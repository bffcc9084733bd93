// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! This module implements the 3-tier configuration loading system:
//! 1. TOML file (base defaults)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::{ConfigError, ConfigResult, MorphogenConfig};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming the configuration file
pub const CONFIG_PATH_ENV: &str = "MORPHOGEN_CONFIG_PATH";

/// Conventional configuration file name
pub const CONFIG_FILE_NAME: &str = "morphogen.toml";

/// Find the Morphogen configuration file
///
/// Search order:
/// 1. `MORPHOGEN_CONFIG_PATH` environment variable
/// 2. Current working directory: `./morphogen.toml`
/// 3. Up to 5 parent directories
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        } else {
            return Err(ConfigError::FileNotFound(format!(
                "Config file specified by {} not found: {}",
                CONFIG_PATH_ENV,
                path.display()
            )));
        }
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));

        let mut current = cwd.clone();
        for _ in 0..5 {
            if let Some(parent) = current.parent() {
                search_paths.push(parent.join(CONFIG_FILE_NAME));
                current = parent.to_path_buf();
            }
        }
    }

    for path in &search_paths {
        if path.exists() {
            return Ok(path.clone());
        }
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "Morphogen configuration file '{}' not found in any of these locations:\n{}\n\nSet {} environment variable to specify custom location.",
        CONFIG_FILE_NAME, search_list, CONFIG_PATH_ENV
    )))
}

/// Load configuration from TOML file
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, will search for config file.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if config file is not found or contains invalid TOML
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<MorphogenConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: MorphogenConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config);
    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli)?;
    }

    Ok(config)
}

/// Like [`load_config`], but falls back to built-in defaults (plus overrides)
/// when no file is given and none is found
pub fn load_config_or_default(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<MorphogenConfig> {
    if config_path.is_some() {
        return load_config(config_path, cli_args);
    }
    match find_config_file() {
        Ok(path) => load_config(Some(&path), cli_args),
        Err(ConfigError::FileNotFound(_)) if env::var(CONFIG_PATH_ENV).is_err() => {
            let mut config = MorphogenConfig::default();
            apply_environment_overrides(&mut config);
            if let Some(cli) = cli_args {
                apply_cli_overrides(&mut config, cli)?;
            }
            Ok(config)
        }
        Err(err) => Err(err),
    }
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `MORPHOGEN_SCHEMA_PATH` -> `genome.schema_path`
/// - `MORPHOGEN_TOURNAMENT_SIZE` -> `evolution.tournament_size`
/// - `MORPHOGEN_GENERATIONS` -> `evolution.generations`
/// - `MORPHOGEN_PARALLEL` -> `evolution.parallel`
/// - `MORPHOGEN_LOG_LEVEL` -> `logging.level`
///
/// Unparseable values are ignored.
pub fn apply_environment_overrides(config: &mut MorphogenConfig) {
    if let Ok(value) = env::var("MORPHOGEN_SCHEMA_PATH") {
        config.genome.schema_path = Some(PathBuf::from(value));
    }
    if let Ok(value) = env::var("MORPHOGEN_TOURNAMENT_SIZE") {
        if let Ok(size) = value.parse::<usize>() {
            config.evolution.tournament_size = size;
        }
    }
    if let Ok(value) = env::var("MORPHOGEN_GENERATIONS") {
        if let Ok(generations) = value.parse::<u32>() {
            config.evolution.generations = generations;
        }
    }
    if let Ok(value) = env::var("MORPHOGEN_PARALLEL") {
        config.evolution.parallel =
            value.to_lowercase() == "true" || value == "1" || value.to_lowercase() == "yes";
    }
    if let Ok(value) = env::var("MORPHOGEN_LOG_LEVEL") {
        config.logging.level = value;
    }
}

/// Apply CLI argument overrides to configuration
///
/// # Arguments
///
/// * `config` - Configuration to modify
/// * `cli_args` - HashMap of CLI arguments (e.g., `{"tournament_size": "5", "generations": "10"}`)
///
/// # Errors
///
/// Unlike environment variables, a CLI value that does not parse is an error.
pub fn apply_cli_overrides(config: &mut MorphogenConfig, cli_args: &HashMap<String, String>) -> ConfigResult<()> {
    if let Some(value) = cli_args.get("schema_path") {
        config.genome.schema_path = Some(PathBuf::from(value));
    }
    if let Some(value) = cli_args.get("tournament_size") {
        config.evolution.tournament_size = parse_cli("tournament_size", value)?;
    }
    if let Some(value) = cli_args.get("generations") {
        config.evolution.generations = parse_cli("generations", value)?;
    }
    if let Some(value) = cli_args.get("log_level") {
        config.logging.level = value.clone();
    }
    Ok(())
}

fn parse_cli<T: std::str::FromStr>(key: &str, value: &str) -> ConfigResult<T> {
    value
        .parse::<T>()
        .map_err(|_| ConfigError::InvalidValue(format!("--{} expects a number, got '{}'", key.replace('_', "-"), value)))
}
