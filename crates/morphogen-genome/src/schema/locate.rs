// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Locating the genome schema document on disk.

use std::env;
use std::path::{Path, PathBuf};

use crate::{EvoError, EvoResult};

/// Environment variable naming the schema file
pub const SCHEMA_PATH_ENV: &str = "MORPHOGEN_GENOME_SCHEMA";

/// Conventional location relative to a project directory
pub const SCHEMA_RELATIVE_PATH: &str = "schemas/genome.schema.json";

/// Parent levels searched above the working directory
const SEARCH_DEPTH: usize = 5;

/// Find the genome schema file
///
/// Search order:
/// 1. `explicit`, when given
/// 2. `MORPHOGEN_GENOME_SCHEMA` environment variable
/// 3. `./schemas/genome.schema.json`, then the same path in up to 5 parent directories
///
/// An explicit or environment path that does not exist is an error rather than
/// a reason to keep searching.
pub fn find_schema_file(explicit: Option<&Path>) -> EvoResult<PathBuf> {
    if let Some(path) = explicit {
        return existing(path.to_path_buf(), "explicit schema path");
    }

    if let Ok(env_path) = env::var(SCHEMA_PATH_ENV) {
        return existing(PathBuf::from(env_path), SCHEMA_PATH_ENV);
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(SCHEMA_RELATIVE_PATH));
        let mut current = cwd.as_path();
        for _ in 0..SEARCH_DEPTH {
            match current.parent() {
                Some(parent) => {
                    search_paths.push(parent.join(SCHEMA_RELATIVE_PATH));
                    current = parent;
                }
                None => break,
            }
        }
    }

    if let Some(found) = search_paths.iter().find(|p| p.exists()) {
        return Ok(found.clone());
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");
    Err(EvoError::Precondition(format!(
        "genome schema '{}' not found in any of these locations:\n{}\nSet {} to specify a custom location.",
        SCHEMA_RELATIVE_PATH, search_list, SCHEMA_PATH_ENV
    )))
}

fn existing(path: PathBuf, origin: &str) -> EvoResult<PathBuf> {
    if path.exists() {
        Ok(path)
    } else {
        Err(EvoError::Precondition(format!(
            "schema file given by {} not found: {}",
            origin,
            path.display()
        )))
    }
}
