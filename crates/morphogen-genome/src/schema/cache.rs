// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Process-wide cache of compiled schemas, keyed by source location.
//!
//! A single mutex covers lookup and insert, so concurrent first uses of the
//! same location compile it exactly once.

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{CompiledSchema, GENOME_SCHEMA_JSON};
use crate::EvoResult;

/// Cache key used for the schema compiled into the crate
const EMBEDDED_KEY: &str = "<embedded>";

static SCHEMA_CACHE: Lazy<Mutex<HashMap<PathBuf, Arc<CompiledSchema>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Load and compile the schema at `path`, or return the cached copy
pub fn load_schema(path: &Path) -> EvoResult<Arc<CompiledSchema>> {
    let key = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    get_or_compile(key, |key| CompiledSchema::from_file(key))
}

/// The genome schema embedded at compile time
pub fn embedded_schema() -> EvoResult<Arc<CompiledSchema>> {
    get_or_compile(PathBuf::from(EMBEDDED_KEY), |_| {
        CompiledSchema::from_json_str(EMBEDDED_KEY, GENOME_SCHEMA_JSON)
    })
}

fn get_or_compile<F>(key: PathBuf, compile: F) -> EvoResult<Arc<CompiledSchema>>
where
    F: FnOnce(&Path) -> EvoResult<CompiledSchema>,
{
    let mut cache = SCHEMA_CACHE.lock();
    if let Some(schema) = cache.get(&key) {
        tracing::trace!("📐 [SCHEMA] Cache hit for {}", key.display());
        return Ok(Arc::clone(schema));
    }
    tracing::debug!("📐 [SCHEMA] Cache miss for {}, compiling", key.display());
    let schema = Arc::new(compile(&key)?);
    cache.insert(key, Arc::clone(&schema));
    Ok(schema)
}

/// Drop every cached schema; later loads recompile from source
pub fn clear_schema_cache() {
    SCHEMA_CACHE.lock().clear();
}

pub fn schema_cache_len() -> usize {
    SCHEMA_CACHE.lock().len()
}

#[cfg(test)]
pub(crate) static CACHE_TEST_LOCK: Mutex<()> = parking_lot::const_mutex(());
