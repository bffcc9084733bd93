// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! JSONL form: one genome object per line, sections as nested JSON values.

use serde_json::Value;
use std::io::{BufRead, Write};

use super::{GenomeRecord, FITNESS_KEY};
use crate::canonical::{format_f64, parse_json, to_canonical_string};
use crate::{EvoError, EvoResult, Genome, Section};

/// Parse JSONL; blank lines are skipped but still counted in row numbers
pub fn read_records<R: BufRead>(reader: R) -> EvoResult<Vec<GenomeRecord>> {
    let mut records = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let row = index + 1;
        let line = line.map_err(|e| EvoError::from(e).at_row(row))?;
        if line.trim().is_empty() {
            continue;
        }
        let value = parse_json("jsonl", &line).map_err(|e| e.at_row(row))?;
        if !value.is_object() {
            return Err(EvoError::parse("jsonl", "each line must hold one JSON object", &line).at_row(row));
        }
        records.push(GenomeRecord { row, value });
    }
    Ok(records)
}

/// One genome as a single line, keys in header order, values canonical
pub fn genome_line(genome: &Genome) -> EvoResult<String> {
    let mut entries: Vec<(&str, Value)> = vec![
        ("version", Value::String(genome.version.clone())),
        ("id", Value::String(genome.id.clone())),
        ("name", Value::String(genome.name.clone())),
        ("seed", Value::from(genome.seed)),
    ];
    for section in Section::ALL {
        entries.push((section.key(), genome.section_value(section)?));
    }

    let mut line = String::from("{");
    for (i, (key, value)) in entries.iter().enumerate() {
        if i > 0 {
            line.push(',');
        }
        line.push_str(&to_canonical_string(&Value::String(key.to_string())));
        line.push(':');
        line.push_str(&to_canonical_string(value));
    }
    if let Some(fitness) = genome.pre_eval_fitness {
        line.push_str(&format!(",\"{}\":{}", FITNESS_KEY, format_f64(fitness)));
    } else if genome.has_null_fitness() {
        line.push_str(&format!(",\"{}\":null", FITNESS_KEY));
    }
    line.push('}');
    Ok(line)
}

pub fn write_genomes<W: Write>(mut writer: W, genomes: &[Genome]) -> EvoResult<()> {
    for genome in genomes {
        writeln!(writer, "{}", genome_line(genome)?)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::tabular;
    use crate::templates::create_minimal_genome;

    #[test]
    fn test_line_keeps_header_order() {
        let line = genome_line(&create_minimal_genome("g", 5).unwrap()).unwrap();
        assert!(line.starts_with(r#"{"version":"v0","id":"g","name":"Minimal crawler","seed":5,"metadata":{"#));
        let keys = ["\"body\":", "\"brain\":", "\"senses\":", "\"reproduction\":", "\"muscles\":",
            "\"pheromone_pairs\":", "\"nerves\":", "\"energy\":", "\"fitness_weights\":"];
        let positions: Vec<usize> = keys.iter().map(|k| line.find(k).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(!line.contains(FITNESS_KEY));
    }

    #[test]
    fn test_fitness_null_or_missing_reads_as_no_number() {
        let genome = create_minimal_genome("g", 5).unwrap();
        let line = genome_line(&genome).unwrap();
        let with_null = format!("{},\"pre_eval_fitness\":null}}", &line[..line.len() - 1]);
        let text = format!("{}\n\n{}\n", line, with_null);

        let records = read_records(text.as_bytes()).unwrap();
        assert_eq!(records.iter().map(|r| r.row).collect::<Vec<_>>(), vec![1, 3]);
        for record in &records {
            assert!(record.decode().unwrap().pre_eval_fitness.is_none());
        }
        assert!(!records[0].decode().unwrap().has_null_fitness());
        assert!(records[1].decode().unwrap().has_null_fitness());
        assert_eq!(genome_line(&records[1].decode().unwrap()).unwrap(), with_null);
    }

    #[test]
    fn test_non_object_line_is_fatal() {
        let err = read_records("[1, 2]\n".as_bytes()).unwrap_err();
        assert!(matches!(err, EvoError::Row { row: 1, .. }));

        let err = read_records("\n{\"id\": \n".as_bytes()).unwrap_err();
        assert!(matches!(err, EvoError::Row { row: 2, .. }));
    }

    #[test]
    fn test_csv_jsonl_csv_is_byte_identical() {
        let mut scored = create_minimal_genome("scored", 7).unwrap();
        scored.pre_eval_fitness = Some(1.25);
        let mut blank = create_minimal_genome("blank", 9).unwrap();
        blank.null_fitness = true;
        assert_csv_round_trip(&[scored, create_minimal_genome("plain", 8).unwrap()]);
        assert_csv_round_trip(&[blank, create_minimal_genome("other", 10).unwrap()]);
    }

    fn assert_csv_round_trip(genomes: &[Genome]) {
        let mut csv_text = Vec::new();
        tabular::write_genomes(&mut csv_text, genomes).unwrap();

        let from_csv = crate::codec::decode_records(&tabular::read_records(csv_text.as_slice()).unwrap()).unwrap();
        let mut jsonl_text = Vec::new();
        write_genomes(&mut jsonl_text, &from_csv).unwrap();
        let from_jsonl = crate::codec::decode_records(&read_records(jsonl_text.as_slice()).unwrap()).unwrap();
        let mut csv_again = Vec::new();
        tabular::write_genomes(&mut csv_again, &from_jsonl).unwrap();

        assert_eq!(String::from_utf8(csv_again).unwrap(), String::from_utf8(csv_text).unwrap());
    }
}
