// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Hand-rolled structural validation for genome documents.

A schema document is compiled once per location into a [`CompiledSchema`] and
held in a process-wide cache. Callers validate through a [`SchemaValidator`]
handle, which can be cloned and passed wherever validation is needed.
*/

pub mod cache;
pub mod compiled;
pub mod locate;
pub mod validator;

pub use cache::{clear_schema_cache, embedded_schema, load_schema, schema_cache_len};
pub use compiled::CompiledSchema;
pub use locate::{find_schema_file, SCHEMA_PATH_ENV, SCHEMA_RELATIVE_PATH};
pub use validator::SchemaValidator;

/// Genome schema document embedded at compile time
pub const GENOME_SCHEMA_JSON: &str = include_str!("../../schemas/genome.schema.json");
