// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Core types and error handling for Morphogen genomes.

Every failure the genome and evolution crates can raise is an [`EvoError`].
Parsing and validation failures always carry enough context (row number,
JSON path, offending fragment) to locate the fault.
*/

use std::fmt;
use thiserror::Error;

/// Result type for genome and evolution operations
pub type EvoResult<T> = Result<T, EvoError>;

/// Longest fragment of offending input echoed back in a parse error
const FRAGMENT_LIMIT: usize = 80;

/// A single path-tagged schema violation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// `$`-rooted location of the offending value, e.g. `$.body.cells[2].area`
    pub path: String,
    /// Human readable description
    pub message: String,
}

impl Violation {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Error types for genome and evolution operations
#[derive(Error, Debug)]
pub enum EvoError {
    /// Malformed text or JSON
    #[error("Parse error in {context}: {message} (near `{fragment}`)")]
    Parse {
        context: String,
        message: String,
        fragment: String,
    },

    /// Aggregate of every violation found, never just the first
    #[error("Schema validation failed with {} violation(s): {}", .0.len(), join_violations(.0))]
    SchemaViolation(Vec<Violation>),

    /// Argument outside its documented domain
    #[error("Range error: {0}")]
    Range(String),

    /// Missing required argument or section
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// `$ref` pointing outside the schema document
    #[error("Unsupported schema reference: {0}")]
    UnsupportedReference(String),

    /// The schema document itself is unusable
    #[error("Invalid schema document: {0}")]
    InvalidSchema(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failure attributed to one data row (CSV) or line (JSONL), 1-based
    #[error("Row {row}: {source}")]
    Row {
        row: usize,
        #[source]
        source: Box<EvoError>,
    },
}

impl EvoError {
    /// Build a parse error, trimming the offending input to a short fragment
    pub fn parse(context: impl Into<String>, message: impl fmt::Display, input: &str) -> Self {
        EvoError::Parse {
            context: context.into(),
            message: message.to_string(),
            fragment: fragment_of(input),
        }
    }

    /// Attach a 1-based row number
    pub fn at_row(self, row: usize) -> Self {
        EvoError::Row {
            row,
            source: Box::new(self),
        }
    }

    /// Every violation carried by this error, looking through row wrappers
    pub fn violations(&self) -> &[Violation] {
        match self {
            EvoError::SchemaViolation(violations) => violations,
            EvoError::Row { source, .. } => source.violations(),
            _ => &[],
        }
    }
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

fn fragment_of(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.chars().count() <= FRAGMENT_LIMIT {
        return trimmed.to_string();
    }
    let mut fragment: String = trimmed.chars().take(FRAGMENT_LIMIT).collect();
    fragment.push('…');
    fragment
}

impl From<csv::Error> for EvoError {
    fn from(err: csv::Error) -> Self {
        let row = err.position().map(|p| p.record() as usize);
        let parse = EvoError::Parse {
            context: "csv".to_string(),
            message: err.to_string(),
            fragment: String::new(),
        };
        match row {
            // csv positions count the header as record 0
            Some(row) => parse.at_row(row),
            None => parse,
        }
    }
}
