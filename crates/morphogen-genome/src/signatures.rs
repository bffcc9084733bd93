// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Genome signature generation for comparison.

Signatures are SHA-256 hashes of canonical text, so two genomes that differ
only in key order or number spelling share a signature. They allow:
- Quick genome comparison without a full deep-equal
- Detecting which sections changed between parent and child
*/

use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

use crate::{EvoResult, Genome, Section};

/// Whole-genome signature plus one per section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenomeSignatures {
    pub genome: String,
    pub sections: BTreeMap<Section, String>,
}

impl GenomeSignatures {
    /// Sections whose signature differs from `other`
    pub fn changed_sections(&self, other: &GenomeSignatures) -> Vec<Section> {
        Section::ALL
            .into_iter()
            .filter(|s| self.sections.get(s) != other.sections.get(s))
            .collect()
    }
}

pub fn generate_signatures(genome: &Genome) -> EvoResult<GenomeSignatures> {
    let mut sections = BTreeMap::new();
    for section in Section::ALL {
        sections.insert(section, hash_string(&genome.section_text(section)?));
    }
    Ok(GenomeSignatures {
        genome: genome_signature(genome)?,
        sections,
    })
}

/// Signature of the whole canonical genome, header included
pub fn genome_signature(genome: &Genome) -> EvoResult<String> {
    Ok(hash_string(&genome.canonical_text()?))
}

/// SHA-256 of a string, first 16 hex chars
pub fn hash_string(s: &str) -> String {
    let digest = Sha256::digest(s.as_bytes());
    let mut hex = String::with_capacity(16);
    for byte in digest.iter().take(8) {
        hex.push_str(&format!("{:02x}", byte));
    }
    hex
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::load_minimal_genome;

    #[test]
    fn test_hash_string() {
        let hash1 = hash_string("test");
        let hash2 = hash_string("test");
        let hash3 = hash_string("different");

        assert_eq!(hash1, hash2);
        assert_ne!(hash1, hash3);
        assert_eq!(hash1.len(), 16);
        // sha256("test") = 9f86d081884c7d65...
        assert_eq!(hash1, "9f86d081884c7d65");
    }

    #[test]
    fn test_changed_sections() {
        let genome = load_minimal_genome().unwrap();
        let mut edited = genome.clone();
        edited.brain.hidden_used = 3;

        let before = generate_signatures(&genome).unwrap();
        let after = generate_signatures(&edited).unwrap();
        assert_ne!(before.genome, after.genome);
        assert_eq!(before.changed_sections(&after), vec![Section::Brain]);
    }

    #[test]
    fn test_seed_only_changes_genome_signature() {
        let genome = load_minimal_genome().unwrap();
        let mut reseeded = genome.clone();
        reseeded.seed += 1;

        let before = generate_signatures(&genome).unwrap();
        let after = generate_signatures(&reseeded).unwrap();
        assert_ne!(before.genome, after.genome);
        assert!(before.changed_sections(&after).is_empty());
    }
}
