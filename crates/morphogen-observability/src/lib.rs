// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # morphogen-observability
//!
//! Logging setup shared by Morphogen binaries, with per-crate debug flag
//! support. Library crates only emit `tracing` events; installing the
//! subscriber is left to whichever binary runs them.
//!
//! ## Features
//! - `file-logging`: additional JSON log file in a timestamped run folder

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod init;

pub use cli::*;
pub use init::*;

/// Known Morphogen crate names for debug flags
pub const KNOWN_CRATES: &[&str] = &[
    "morphogen",
    "morphogen-genome",
    "morphogen-evolution",
    "morphogen-config",
    "evolve-genomes",
];
