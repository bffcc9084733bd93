// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
# Morphogen Genome

Handles the **genotype** side of Morphogen:

- Canonical JSON encoding (key-sorted, whitespace-free, stable numbers)
- Hand-rolled schema validation with a process-wide compiled-schema cache
- Typed genome model: header scalars plus ten sections
- CSV / JSONL bulk import and export
- Signatures and templates

## Separation of Concerns

```text
morphogen-genome (Data)       morphogen-evolution (Operators)
───────────────────────       ───────────────────────────────
│ Canonical encoding   │  →   │ Stream derivation         │
│ Schema validation    │      │ Mutation / crossover      │
│ Genome model + codec │      │ Selection / population    │
└──────────────────────┘      └───────────────────────────┘
```

Nothing in this crate draws random numbers or runs any simulation.
*/

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod canonical;
pub mod codec;
pub mod genome;
pub mod schema;
pub mod signatures;
pub mod templates;
pub mod types;
pub mod validation;

pub use canonical::{canonical_eq, canonicalize_str, format_f64, normalize, parse_json, to_canonical_string};
pub use codec::{
    decode_records, load_genomes, read_genomes, read_records, write_genomes, GenomeFormat, GenomeRecord,
    CSV_HEADER,
};
pub use genome::{
    Body, Brain, Cell, Coord, EdgeShape, EnergyBudget, FitnessWeights, Genome, Grid, Material, Metadata,
    Muscle, NerveCluster, NerveEnding, Nerves, PheromoneEnd, PheromonePair, PheromoneSense, PheromoneShape,
    Reproduction, ReproductionMode, Section, Senses, TissueType, Vision, GENOME_VERSION, MAX_ID_LENGTH,
};
pub use schema::{
    clear_schema_cache, find_schema_file, load_schema, schema_cache_len, CompiledSchema, SchemaValidator,
    GENOME_SCHEMA_JSON,
};
pub use signatures::{generate_signatures, genome_signature, hash_string, GenomeSignatures};
pub use templates::{create_minimal_genome, load_minimal_genome, MINIMAL_GENOME_JSON};
pub use types::{EvoError, EvoResult, Violation};
pub use validation::{
    validate_genome, validate_genomes, validate_records, validate_value, RowViolation, ValidationReport,
};
