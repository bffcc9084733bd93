// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! CSV form: fixed, order-sensitive header; sections as canonical JSON text.

use csv::{ReaderBuilder, StringRecord, Terminator, WriterBuilder};
use serde_json::{Map, Number, Value};
use std::io::{Read, Write};

use super::{GenomeRecord, FITNESS_KEY};
use crate::canonical::{format_f64, parse_json};
use crate::{EvoError, EvoResult, Genome, Section};

/// Required columns, in order
pub const CSV_HEADER: [&str; 14] = [
    "version",
    "id",
    "name",
    "seed",
    "metadata_json",
    "body_json",
    "brain_json",
    "senses_json",
    "reproduction_json",
    "muscles_json",
    "pheromones_json",
    "nerves_json",
    "energy_json",
    "fitness_json",
];

/// Optional trailing column
pub const FITNESS_COLUMN: &str = "pre_eval_fitness";

const FIRST_SECTION_COLUMN: usize = 4;

/// Parse CSV text into raw records; row numbers count data rows from 1
pub fn read_records<R: Read>(reader: R) -> EvoResult<Vec<GenomeRecord>> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);
    let mut rows = csv_reader.records();

    let header = match rows.next() {
        Some(header) => header?,
        None => return Err(EvoError::parse("csv header", "input is empty", "")),
    };
    let with_fitness = check_header(&header)?;
    let width = CSV_HEADER.len() + usize::from(with_fitness);

    let mut records = Vec::new();
    for (index, row) in rows.enumerate() {
        let row_number = index + 1;
        let row = row?;
        if row.len() != width {
            return Err(EvoError::parse(
                "csv row",
                format!("expected {} columns, found {}", width, row.len()),
                &row.iter().collect::<Vec<_>>().join(","),
            )
            .at_row(row_number));
        }
        let value = row_to_value(&row, with_fitness).map_err(|e| e.at_row(row_number))?;
        records.push(GenomeRecord {
            row: row_number,
            value,
        });
    }
    Ok(records)
}

/// Returns whether the optional fitness column is present
fn check_header(header: &StringRecord) -> EvoResult<bool> {
    let found: Vec<&str> = header.iter().collect();
    let base = found.len() >= CSV_HEADER.len() && found[..CSV_HEADER.len()] == CSV_HEADER[..];
    match (base, found.len() - CSV_HEADER.len().min(found.len())) {
        (true, 0) => Ok(false),
        (true, 1) if found[CSV_HEADER.len()] == FITNESS_COLUMN => Ok(true),
        _ => Err(EvoError::parse(
            "csv header",
            format!("expected {}[,{}]", CSV_HEADER.join(","), FITNESS_COLUMN),
            &found.join(","),
        )),
    }
}

fn row_to_value(row: &StringRecord, with_fitness: bool) -> EvoResult<Value> {
    let mut object = Map::new();
    for (i, key) in ["version", "id", "name"].into_iter().enumerate() {
        object.insert(key.to_string(), Value::String(row[i].to_string()));
    }

    let seed_text = row[3].trim();
    let seed: u64 = seed_text
        .parse()
        .map_err(|e| EvoError::parse("seed", e, seed_text))?;
    object.insert("seed".to_string(), Value::from(seed));

    for (offset, section) in Section::ALL.into_iter().enumerate() {
        let text = &row[FIRST_SECTION_COLUMN + offset];
        object.insert(section.key().to_string(), parse_json(section.column(), text)?);
    }

    if with_fitness {
        object.insert(FITNESS_KEY.to_string(), parse_fitness(&row[CSV_HEADER.len()])?);
    }
    Ok(Value::Object(object))
}

/// Empty cell (or the literal `null`) is a present-but-empty fitness slot
fn parse_fitness(text: &str) -> EvoResult<Value> {
    let text = text.trim();
    if text.is_empty() || text == "null" {
        return Ok(Value::Null);
    }
    let parsed: f64 = text
        .parse()
        .map_err(|e| EvoError::parse(FITNESS_COLUMN, e, text))?;
    Number::from_f64(parsed)
        .map(Value::Number)
        .ok_or_else(|| EvoError::parse(FITNESS_COLUMN, "fitness must be finite", text))
}

/// Canonical CSV fields of one genome
pub fn genome_fields(genome: &Genome, with_fitness: bool) -> EvoResult<Vec<String>> {
    let mut fields = vec![
        genome.version.clone(),
        genome.id.clone(),
        genome.name.clone(),
        genome.seed.to_string(),
    ];
    for section in Section::ALL {
        fields.push(genome.section_text(section)?);
    }
    if with_fitness {
        fields.push(genome.pre_eval_fitness.map(format_f64).unwrap_or_default());
    }
    Ok(fields)
}

/// Write genomes as CSV; the fitness column is emitted only when some genome has a fitness slot
pub fn write_genomes<W: Write>(writer: W, genomes: &[Genome]) -> EvoResult<()> {
    let with_fitness = genomes.iter().any(Genome::has_fitness_slot);
    let mut csv_writer = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(writer);

    let mut header: Vec<&str> = CSV_HEADER.to_vec();
    if with_fitness {
        header.push(FITNESS_COLUMN);
    }
    csv_writer.write_record(&header)?;
    for genome in genomes {
        csv_writer.write_record(genome_fields(genome, with_fitness)?)?;
    }
    csv_writer.flush()?;
    Ok(())
}
