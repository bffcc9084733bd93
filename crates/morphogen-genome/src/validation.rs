// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Genome validation: schema checks, cross-field invariants and population-level
rules (unique ids), reported row by row.
*/

use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

use crate::codec::GenomeRecord;
use crate::{EvoError, EvoResult, Genome, SchemaValidator, Violation};

/// A violation attributed to one row (CSV data row or JSONL line, 1-based)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowViolation {
    pub row: usize,
    pub genome_id: Option<String>,
    pub violation: Violation,
}

impl RowViolation {
    /// Flatten into a plain violation whose path names the row
    pub fn to_violation(&self) -> Violation {
        Violation::new(format!("row {} {}", self.row, self.violation.path), self.violation.message.clone())
    }
}

impl fmt::Display for RowViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.genome_id {
            Some(id) => write!(f, "row {} ({}): {}", self.row, id, self.violation),
            None => write!(f, "row {}: {}", self.row, self.violation),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub checked: usize,
    pub errors: Vec<RowViolation>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Collapse into one aggregate error carrying every violation
    pub fn into_result(self) -> EvoResult<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(EvoError::SchemaViolation(
                self.errors.iter().map(RowViolation::to_violation).collect(),
            ))
        }
    }
}

/// Schema violations of an expanded genome value, then invariant violations
/// once the value is structurally sound
pub fn validate_value(value: &Value, validator: &SchemaValidator) -> Vec<Violation> {
    let mut violations = validator.validate(value);
    if violations.is_empty() {
        match Genome::from_value(value.clone()) {
            Ok(genome) => violations.extend(genome.invariant_violations()),
            Err(err) => violations.push(Violation::new("$", err.to_string())),
        }
    }
    violations
}

pub fn validate_genome(genome: &Genome, validator: &SchemaValidator) -> EvoResult<Vec<Violation>> {
    let mut violations = validator.validate(&genome.to_value()?);
    violations.extend(genome.invariant_violations());
    Ok(violations)
}

/// Validate raw records as read by the codec, reporting every row
pub fn validate_records(records: &[GenomeRecord], validator: &SchemaValidator) -> ValidationReport {
    let mut report = ValidationReport::default();
    let mut first_seen: HashMap<String, usize> = HashMap::new();
    for record in records {
        report.checked += 1;
        let genome_id = record.value.get("id").and_then(Value::as_str).map(str::to_string);
        for violation in validate_value(&record.value, validator) {
            report.errors.push(RowViolation {
                row: record.row,
                genome_id: genome_id.clone(),
                violation,
            });
        }
        if let Some(id) = &genome_id {
            check_duplicate(&mut first_seen, &mut report, id, record.row);
        }
    }
    log_report(&report);
    report
}

/// Validate decoded genomes; rows are positions in `genomes`, 1-based
pub fn validate_genomes(genomes: &[Genome], validator: &SchemaValidator) -> EvoResult<ValidationReport> {
    let mut report = ValidationReport::default();
    let mut first_seen: HashMap<String, usize> = HashMap::new();
    for (index, genome) in genomes.iter().enumerate() {
        let row = index + 1;
        report.checked += 1;
        for violation in validate_genome(genome, validator)? {
            report.errors.push(RowViolation {
                row,
                genome_id: Some(genome.id.clone()),
                violation,
            });
        }
        check_duplicate(&mut first_seen, &mut report, &genome.id, row);
    }
    log_report(&report);
    Ok(report)
}

fn check_duplicate(first_seen: &mut HashMap<String, usize>, report: &mut ValidationReport, id: &str, row: usize) {
    match first_seen.get(id) {
        Some(first) => report.errors.push(RowViolation {
            row,
            genome_id: Some(id.to_string()),
            violation: Violation::new("$.id", format!("duplicate id '{}' (first seen in row {})", id, first)),
        }),
        None => {
            first_seen.insert(id.to_string(), row);
        }
    }
}

fn log_report(report: &ValidationReport) {
    if report.is_valid() {
        tracing::debug!("🧬 [VALIDATE] {} genome(s) valid", report.checked);
    } else {
        tracing::debug!(
            "🧬 [VALIDATE] {} violation(s) across {} genome(s)",
            report.errors.len(),
            report.checked
        );
    }
}
