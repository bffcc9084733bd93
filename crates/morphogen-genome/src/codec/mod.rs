// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Bulk genome import/export.

Two interchangeable forms are supported:
- **CSV** (tabular): one row per genome, each section stored as canonical
  JSON text in its own column under a fixed header.
- **JSONL** (expanded): one JSON object per line, sections as nested values.

Reading happens in two steps. Rows are first turned into raw
[`GenomeRecord`]s (malformed text or a wrong column count aborts the whole
read with the row number attached), then records are validated and decoded.
Every write canonicalises every section, so CSV → JSONL → CSV reproduces the
same field values byte for byte.
*/

pub mod jsonl;
pub mod tabular;

use serde_json::Value;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use tempfile::NamedTempFile;
use std::path::Path;

use crate::validation::validate_records;
use crate::{EvoError, EvoResult, Genome, SchemaValidator};

pub use tabular::{CSV_HEADER, FITNESS_COLUMN};

/// Header keys in the order both forms use
pub const HEADER_KEYS: [&str; 4] = ["version", "id", "name", "seed"];

/// Key of the optional placeholder fitness
pub const FITNESS_KEY: &str = "pre_eval_fitness";

/// A genome in expanded JSON form, tagged with the 1-based row it came from
#[derive(Debug, Clone, PartialEq)]
pub struct GenomeRecord {
    pub row: usize,
    pub value: Value,
}

impl GenomeRecord {
    pub fn decode(&self) -> EvoResult<Genome> {
        Genome::from_value(self.value.clone()).map_err(|e| e.at_row(self.row))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenomeFormat {
    Csv,
    Jsonl,
}

impl GenomeFormat {
    /// Pick a format from a file extension (`.csv`, `.jsonl`/`.ndjson`)
    pub fn from_path(path: &Path) -> EvoResult<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match extension.as_deref() {
            Some("csv") => Ok(GenomeFormat::Csv),
            Some("jsonl") | Some("ndjson") => Ok(GenomeFormat::Jsonl),
            _ => Err(EvoError::Precondition(format!(
                "cannot infer genome format from '{}' (expected .csv or .jsonl)",
                path.display()
            ))),
        }
    }
}

/// Read raw records from a file
pub fn read_records(path: &Path, format: GenomeFormat) -> EvoResult<Vec<GenomeRecord>> {
    let reader = BufReader::new(File::open(path)?);
    let records = match format {
        GenomeFormat::Csv => tabular::read_records(reader)?,
        GenomeFormat::Jsonl => jsonl::read_records(reader)?,
    };
    tracing::info!(
        "📂 [CODEC] Read {} genome row(s) from {}",
        records.len(),
        path.display()
    );
    Ok(records)
}

/// Read and decode genomes without schema validation
pub fn read_genomes(path: &Path, format: GenomeFormat) -> EvoResult<Vec<Genome>> {
    decode_records(&read_records(path, format)?)
}

/// Read, validate every row, then decode
///
/// Fails with one aggregate [`EvoError::SchemaViolation`] listing every
/// violation of every row when anything is invalid.
pub fn load_genomes(path: &Path, format: GenomeFormat, validator: &SchemaValidator) -> EvoResult<Vec<Genome>> {
    let records = read_records(path, format)?;
    validate_records(&records, validator).into_result()?;
    decode_records(&records)
}

pub fn decode_records(records: &[GenomeRecord]) -> EvoResult<Vec<Genome>> {
    records.iter().map(GenomeRecord::decode).collect()
}

/// Write genomes to a file, replacing it
///
/// The text goes to a temporary file next to `path` that is renamed into
/// place only once fully written; on failure `path` is left as it was.
pub fn write_genomes(path: &Path, format: GenomeFormat, genomes: &[Genome]) -> EvoResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let staged = NamedTempFile::new_in(dir)?;
    let mut writer = BufWriter::new(staged);
    match format {
        GenomeFormat::Csv => tabular::write_genomes(&mut writer, genomes)?,
        GenomeFormat::Jsonl => jsonl::write_genomes(&mut writer, genomes)?,
    }
    let staged = writer.into_inner().map_err(|e| EvoError::from(e.into_error()))?;
    staged.as_file().sync_all()?;
    staged.persist(path).map_err(|e| EvoError::from(e.error))?;
    tracing::info!(
        "💾 [CODEC] Wrote {} genome(s) to {}",
        genomes.len(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::create_minimal_genome;
    use tempfile::TempDir;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(GenomeFormat::from_path(Path::new("a/b.CSV")).unwrap(), GenomeFormat::Csv);
        assert_eq!(GenomeFormat::from_path(Path::new("pop.jsonl")).unwrap(), GenomeFormat::Jsonl);
        assert!(GenomeFormat::from_path(Path::new("pop.json")).is_err());
        assert!(GenomeFormat::from_path(Path::new("pop")).is_err());
    }

    #[test]
    fn test_file_round_trip_both_formats() {
        let dir = TempDir::new().unwrap();
        let genomes = vec![
            create_minimal_genome("g1", 11).unwrap(),
            create_minimal_genome("g2", 22).unwrap(),
        ];
        let validator = SchemaValidator::embedded().unwrap();

        for (name, format) in [("pop.csv", GenomeFormat::Csv), ("pop.jsonl", GenomeFormat::Jsonl)] {
            let path = dir.path().join(name);
            write_genomes(&path, format, &genomes).unwrap();
            let loaded = load_genomes(&path, format, &validator).unwrap();
            assert_eq!(loaded, genomes, "{name}");
        }
    }

    #[test]
    fn test_load_reports_every_invalid_row() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.jsonl");
        let mut first = create_minimal_genome("g1", 1).unwrap();
        first.brain.layers_used = 9;
        let second = create_minimal_genome("g1", 2).unwrap();
        write_genomes(&path, GenomeFormat::Jsonl, &[first, second]).unwrap();

        let err = load_genomes(&path, GenomeFormat::Jsonl, &SchemaValidator::embedded().unwrap()).unwrap_err();
        let paths: Vec<&str> = err.violations().iter().map(|v| v.path.as_str()).collect();
        assert_eq!(paths, vec!["row 1 $.brain.layers_used", "row 1 $.brain.layers_used", "row 2 $.id"]);
    }

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_write_replaces_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pop.jsonl");
        std::fs::write(&path, "stale\n".repeat(1000)).unwrap();

        write_genomes(&path, GenomeFormat::Jsonl, &[create_minimal_genome("g1", 1).unwrap()]).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(!text.contains("stale"));
        assert_eq!(entries(dir.path()), vec!["pop.jsonl"]);
    }

    #[test]
    fn test_failed_write_leaves_no_partial_file() {
        let dir = TempDir::new().unwrap();
        let blocked = dir.path().join("pop.csv");
        std::fs::create_dir(&blocked).unwrap();
        std::fs::write(blocked.join("keep.txt"), "kept").unwrap();

        let result = write_genomes(&blocked, GenomeFormat::Csv, &[create_minimal_genome("g1", 1).unwrap()]);
        assert!(matches!(result, Err(EvoError::Io(_))));
        assert!(blocked.is_dir());
        assert_eq!(entries(dir.path()), vec!["pop.csv"]);
        assert_eq!(std::fs::read_to_string(blocked.join("keep.txt")).unwrap(), "kept");

        let missing_dir = dir.path().join("absent").join("pop.csv");
        assert!(write_genomes(&missing_dir, GenomeFormat::Csv, &[]).is_err());
        assert!(!missing_dir.exists());
    }
}
