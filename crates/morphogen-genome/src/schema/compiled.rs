// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! A schema document checked and prepared for repeated validation.
//!
//! Compilation walks the whole document once: every `pattern` is compiled,
//! every `$ref` must be a resolvable local fragment, and every `type` must
//! name a known kind. A schema that passes compilation cannot fail with a
//! fatal error during validation.

use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::canonical::parse_json;
use crate::{EvoError, EvoResult};

/// Primitive kinds accepted by the `type` keyword
pub const TYPE_NAMES: &[&str] = &["null", "boolean", "object", "array", "number", "integer", "string"];

/// Keywords whose values are data, not sub-schemas
const DATA_KEYWORDS: &[&str] = &["const", "enum", "default", "examples"];

/// Keywords whose values map arbitrary names to sub-schemas
const NAMED_SCHEMA_KEYWORDS: &[&str] = &["properties", "patternProperties", "definitions", "$defs"];

#[derive(Debug)]
pub struct CompiledSchema {
    source: String,
    root: Value,
    patterns: HashMap<String, Regex>,
}

impl CompiledSchema {
    /// Compile an already parsed schema document
    pub fn compile(source: impl Into<String>, root: Value) -> EvoResult<Self> {
        let mut schema = CompiledSchema {
            source: source.into(),
            root,
            patterns: HashMap::new(),
        };
        let mut patterns = HashMap::new();
        schema.prepare(&schema.root, "#", &mut patterns)?;
        schema.patterns = patterns;
        tracing::debug!(
            "📐 [SCHEMA] Compiled '{}' ({} patterns)",
            schema.source,
            schema.patterns.len()
        );
        Ok(schema)
    }

    pub fn from_json_str(source: impl Into<String>, text: &str) -> EvoResult<Self> {
        let source = source.into();
        let root = parse_json(&source, text)?;
        Self::compile(source, root)
    }

    pub fn from_file(path: &Path) -> EvoResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(path.display().to_string(), &text)
    }

    /// Where the document came from (file path or `<embedded>`)
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    pub(crate) fn pattern(&self, pattern: &str) -> Option<&Regex> {
        self.patterns.get(pattern)
    }

    /// Resolve a local `#/a/b/0` style reference against the document root
    pub fn resolve_ref(&self, reference: &str) -> EvoResult<&Value> {
        let Some(fragment) = reference.strip_prefix('#') else {
            return Err(EvoError::UnsupportedReference(format!(
                "'{}' in {} (only local '#/...' references are supported)",
                reference, self.source
            )));
        };
        if !fragment.is_empty() && !fragment.starts_with('/') {
            return Err(EvoError::UnsupportedReference(format!(
                "'{}' in {} (anchors are not supported)",
                reference, self.source
            )));
        }
        self.root.pointer(fragment).ok_or_else(|| {
            EvoError::InvalidSchema(format!("unresolvable reference '{}' in {}", reference, self.source))
        })
    }

    fn prepare(&self, node: &Value, location: &str, patterns: &mut HashMap<String, Regex>) -> EvoResult<()> {
        match node {
            Value::Object(map) => {
                if let Some(reference) = map.get("$ref") {
                    let reference = reference.as_str().ok_or_else(|| {
                        EvoError::InvalidSchema(format!("$ref at {} must be a string", location))
                    })?;
                    self.resolve_ref(reference)?;
                }
                if let Some(Value::String(pattern)) = map.get("pattern") {
                    if !patterns.contains_key(pattern) {
                        let regex = Regex::new(pattern).map_err(|e| {
                            EvoError::InvalidSchema(format!("bad pattern at {}: {}", location, e))
                        })?;
                        patterns.insert(pattern.clone(), regex);
                    }
                }
                if let Some(kind) = map.get("type") {
                    check_type_keyword(kind, location)?;
                }
                for (key, child) in map {
                    let child_location = format!("{}/{}", location, key);
                    if DATA_KEYWORDS.contains(&key.as_str()) {
                        continue;
                    }
                    match child {
                        // names here are data; only their values are schemas
                        Value::Object(named) if NAMED_SCHEMA_KEYWORDS.contains(&key.as_str()) => {
                            for (name, schema) in named {
                                self.prepare(schema, &format!("{}/{}", child_location, name), patterns)?;
                            }
                        }
                        _ => self.prepare(child, &child_location, patterns)?,
                    }
                }
                Ok(())
            }
            Value::Array(items) => {
                for (i, child) in items.iter().enumerate() {
                    self.prepare(child, &format!("{}/{}", location, i), patterns)?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

fn check_type_keyword(kind: &Value, location: &str) -> EvoResult<()> {
    let known = |name: &Value| name.as_str().map(|n| TYPE_NAMES.contains(&n)).unwrap_or(false);
    let ok = match kind {
        Value::String(_) => known(kind),
        Value::Array(names) => !names.is_empty() && names.iter().all(known),
        _ => false,
    };
    if ok {
        Ok(())
    } else {
        Err(EvoError::InvalidSchema(format!("unknown type {} at {}", kind, location)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resolves_local_pointer() {
        let schema = CompiledSchema::compile(
            "test",
            json!({"definitions": {"list": [{"type": "string"}, {"type": "number"}]}}),
        )
        .unwrap();
        assert_eq!(schema.resolve_ref("#/definitions/list/1").unwrap(), &json!({"type": "number"}));
        assert_eq!(schema.resolve_ref("#").unwrap(), schema.root());
    }

    #[test]
    fn test_remote_ref_is_fatal() {
        let err = CompiledSchema::compile("test", json!({"$ref": "http://example.com/other.json#/x"})).unwrap_err();
        assert!(matches!(err, EvoError::UnsupportedReference(_)));

        let err = CompiledSchema::compile("test", json!({"properties": {"a": {"$ref": "other.json"}}})).unwrap_err();
        assert!(matches!(err, EvoError::UnsupportedReference(_)));
    }

    #[test]
    fn test_dangling_ref_is_fatal() {
        let err = CompiledSchema::compile("test", json!({"$ref": "#/definitions/missing"})).unwrap_err();
        assert!(matches!(err, EvoError::InvalidSchema(_)));
    }

    #[test]
    fn test_bad_pattern_and_type_rejected() {
        assert!(CompiledSchema::compile("p", json!({"pattern": "(unclosed"})).is_err());
        assert!(CompiledSchema::compile("t", json!({"type": "float"})).is_err());
    }

    #[test]
    fn test_enum_values_are_not_walked() {
        let schema = CompiledSchema::compile("e", json!({"enum": [{"$ref": "nowhere"}]}));
        assert!(schema.is_ok());
    }

    #[test]
    fn test_property_names_are_not_keywords() {
        let schema = CompiledSchema::compile(
            "names",
            json!({
                "type": "object",
                "properties": {
                    "$ref": {"type": "string"},
                    "type": {"type": "object", "properties": {"pattern": {"type": "integer"}}},
                    "enum": {"$ref": "#/definitions/$ref"}
                },
                "definitions": {"$ref": {"type": "number"}}
            }),
        )
        .unwrap();
        assert!(schema.pattern("integer").is_none());

        let err = CompiledSchema::compile("names", json!({"properties": {"$ref": {"$ref": "#/nowhere"}}})).unwrap_err();
        assert!(matches!(err, EvoError::InvalidSchema(_)));
    }

    #[test]
    fn test_embedded_genome_schema_compiles() {
        let schema = CompiledSchema::from_json_str("<embedded>", crate::schema::GENOME_SCHEMA_JSON).unwrap();
        assert!(schema.pattern("^[A-Za-z0-9_.:-]+$").is_some());
    }
}
