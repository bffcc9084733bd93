// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! End-to-end runs of the file pipeline behind evolve_genomes

use std::fs;

use morphogen::genome::{create_minimal_genome, read_genomes, CSV_HEADER};
use morphogen::pipeline::{error_lines, evolve_file, EvolveRequest};
use morphogen::prelude::*;
use tempfile::TempDir;

fn founders(n: u64) -> Vec<Genome> {
    (0..n)
        .map(|i| {
            let mut genome = create_minimal_genome(&format!("founder{}", i), i).unwrap();
            genome.pre_eval_fitness = Some(i as f64 / 2.0);
            genome
        })
        .collect()
}

fn config(generations: u32) -> MorphogenConfig {
    let mut config = MorphogenConfig::default();
    config.evolution.generations = generations;
    config
}

#[test]
fn test_csv_in_jsonl_out_is_reproducible() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("founders.csv");
    write_genomes(&input, GenomeFormat::Csv, &founders(5)).unwrap();
    let validator = SchemaValidator::embedded().unwrap();

    let mut outputs = Vec::new();
    for name in ["a.jsonl", "b.jsonl"] {
        let request = EvolveRequest {
            input: input.clone(),
            input_format: GenomeFormat::Csv,
            output: dir.path().join(name),
            seed: 42,
        };
        let summary = evolve_file(&request, &config(3), &validator).unwrap();
        assert_eq!(summary.members, 5);
        assert_eq!(summary.output_format, GenomeFormat::Jsonl);
        outputs.push(fs::read_to_string(&request.output).unwrap());
    }
    assert_eq!(outputs[0], outputs[1]);
    assert_eq!(outputs[0].lines().count(), 5);
    for line in outputs[0].lines() {
        let value: serde_json::Value = serde_json::from_str(line).unwrap();
        assert!(value["body"].is_object());
        assert!(value["pre_eval_fitness"].is_number());
    }
}

#[test]
fn test_jsonl_in_csv_out() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("founders.jsonl");
    write_genomes(&input, GenomeFormat::Jsonl, &founders(3)).unwrap();
    let request = EvolveRequest {
        input,
        input_format: GenomeFormat::Jsonl,
        output: dir.path().join("next.csv"),
        seed: 7,
    };
    evolve_file(&request, &config(1), &SchemaValidator::embedded().unwrap()).unwrap();

    let text = fs::read_to_string(&request.output).unwrap();
    let header = text.lines().next().unwrap();
    assert!(header.starts_with(&CSV_HEADER.join(",")));
    assert!(header.ends_with(",pre_eval_fitness"));
    assert_eq!(read_genomes(&request.output, GenomeFormat::Csv).unwrap().len(), 3);
}

#[test]
fn test_invalid_rows_abort_without_output() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("broken.jsonl");
    let mut genomes = founders(2);
    genomes[1].muscles[0].strength = 0.0;
    genomes[1].senses.vision.as_mut().unwrap().range = 500;
    write_genomes(&input, GenomeFormat::Jsonl, &genomes).unwrap();

    let request = EvolveRequest {
        input,
        input_format: GenomeFormat::Jsonl,
        output: dir.path().join("never.csv"),
        seed: 1,
    };
    let err = evolve_file(&request, &config(1), &SchemaValidator::embedded().unwrap()).unwrap_err();
    let lines = error_lines(&err);
    assert_eq!(lines.len(), 2, "{:?}", lines);
    assert!(lines.iter().all(|l| l.starts_with("row 2 ")));
    assert!(!request.output.exists());
}

#[test]
fn test_unknown_output_extension_rejected() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("founders.csv");
    write_genomes(&input, GenomeFormat::Csv, &founders(1)).unwrap();
    let request = EvolveRequest {
        input,
        input_format: GenomeFormat::Csv,
        output: dir.path().join("next.txt"),
        seed: 1,
    };
    let err = evolve_file(&request, &config(1), &SchemaValidator::embedded().unwrap()).unwrap_err();
    assert!(matches!(err, EvoError::Precondition(_)));
}

#[test]
fn test_failed_write_leaves_no_stray_files() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("founders.jsonl");
    write_genomes(&input, GenomeFormat::Jsonl, &founders(3)).unwrap();
    let blocked = dir.path().join("out.csv");
    fs::create_dir(&blocked).unwrap();

    let request = EvolveRequest {
        input,
        input_format: GenomeFormat::Jsonl,
        output: blocked.clone(),
        seed: 3,
    };
    let err = evolve_file(&request, &config(2), &SchemaValidator::embedded().unwrap()).unwrap_err();
    assert!(matches!(err, EvoError::Io(_)));

    let mut names: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, vec!["founders.jsonl", "out.csv"]);
    assert!(blocked.is_dir());
    assert_eq!(fs::read_dir(&blocked).unwrap().count(), 0);
}
