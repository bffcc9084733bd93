// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Structural validation of JSON instances against a compiled schema.

Supported vocabulary: `type`, `const`, `enum`, `required`, `properties`,
`additionalProperties`, `items` (single or positional), `minItems`,
`maxItems`, `uniqueItems`, `minLength`, `maxLength`, `pattern`, `minimum`,
`maximum` and local `$ref`. Other keywords are ignored.

Validation never stops at the first problem; every violation is collected
with the `$`-rooted path of the offending value.
*/

use serde_json::{Map, Number, Value};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use super::cache::{embedded_schema, load_schema};
use super::locate::find_schema_file;
use super::CompiledSchema;
use crate::canonical::to_canonical_string;
use crate::{EvoError, EvoResult, Violation};

/// Consecutive `$ref` hops allowed without descending into the instance
const MAX_REF_HOPS: usize = 32;

/// Cheap, cloneable handle threaded through calls that need validation
#[derive(Debug, Clone)]
pub struct SchemaValidator {
    schema: Arc<CompiledSchema>,
}

impl SchemaValidator {
    pub fn new(schema: Arc<CompiledSchema>) -> Self {
        Self { schema }
    }

    /// Validator for a schema file, compiled once per location
    pub fn from_path(path: &Path) -> EvoResult<Self> {
        Ok(Self::new(load_schema(path)?))
    }

    /// Validator for the schema found by [`find_schema_file`]
    pub fn locate(explicit: Option<&Path>) -> EvoResult<Self> {
        let path = find_schema_file(explicit)?;
        Self::from_path(&path)
    }

    /// Validator for the genome schema compiled into this crate
    pub fn embedded() -> EvoResult<Self> {
        Ok(Self::new(embedded_schema()?))
    }

    pub fn schema(&self) -> &CompiledSchema {
        &self.schema
    }

    /// Collect every violation of `instance`
    pub fn validate(&self, instance: &Value) -> Vec<Violation> {
        let mut walker = Walker {
            schema: &self.schema,
            violations: Vec::new(),
        };
        walker.check(self.schema.root(), instance, "$", 0);
        if !walker.violations.is_empty() {
            tracing::debug!(
                "📐 [SCHEMA] {} violation(s) against '{}'",
                walker.violations.len(),
                self.schema.source()
            );
        }
        walker.violations
    }

    /// Like [`validate`](Self::validate) but as a single aggregate error
    pub fn check(&self, instance: &Value) -> EvoResult<()> {
        let violations = self.validate(instance);
        if violations.is_empty() {
            Ok(())
        } else {
            Err(EvoError::SchemaViolation(violations))
        }
    }
}

struct Walker<'s> {
    schema: &'s CompiledSchema,
    violations: Vec<Violation>,
}

impl<'s> Walker<'s> {
    fn report(&mut self, path: &str, message: impl Into<String>) {
        self.violations.push(Violation::new(path, message));
    }

    fn check(&mut self, node: &'s Value, instance: &Value, path: &str, ref_hops: usize) {
        let map = match node {
            Value::Bool(true) => return,
            Value::Bool(false) => {
                self.report(path, "no value is allowed here");
                return;
            }
            Value::Object(map) => map,
            // compilation only accepts object/boolean sub-schemas where it matters
            _ => return,
        };

        if let Some(Value::String(reference)) = map.get("$ref") {
            if ref_hops >= MAX_REF_HOPS {
                self.report(path, format!("reference cycle through '{}'", reference));
                return;
            }
            match self.schema.resolve_ref(reference) {
                Ok(target) => self.check(target, instance, path, ref_hops + 1),
                Err(err) => self.report(path, err.to_string()),
            }
        }

        if let Some(kind) = map.get("type") {
            if !matches_type(kind, instance) {
                self.report(path, format!("expected {}, found {}", describe_type(kind), kind_of(instance)));
                // keyword checks below would only repeat the mismatch
                return;
            }
        }

        if let Some(expected) = map.get("const") {
            if to_canonical_string(expected) != to_canonical_string(instance) {
                self.report(path, format!("must equal {}", to_canonical_string(expected)));
            }
        }

        if let Some(Value::Array(options)) = map.get("enum") {
            let encoded = to_canonical_string(instance);
            if !options.iter().any(|option| to_canonical_string(option) == encoded) {
                let allowed = options.iter().map(to_canonical_string).collect::<Vec<_>>().join(", ");
                self.report(path, format!("must be one of [{}], found {}", allowed, encoded));
            }
        }

        match instance {
            Value::Object(object) => self.check_object(map, object, path),
            Value::Array(items) => self.check_array(map, items, path),
            Value::String(text) => self.check_string(map, text, path),
            Value::Number(number) => self.check_number(map, number, path),
            _ => {}
        }
    }

    fn check_object(&mut self, keywords: &'s Map<String, Value>, object: &Map<String, Value>, path: &str) {
        if let Some(Value::Array(required)) = keywords.get("required") {
            for name in required.iter().filter_map(Value::as_str) {
                if !object.contains_key(name) {
                    self.report(path, format!("missing required property '{}'", name));
                }
            }
        }

        let declared = match keywords.get("properties") {
            Some(Value::Object(properties)) => Some(properties),
            _ => None,
        };
        let additional = keywords.get("additionalProperties");

        // iterate in byte order so violation lists are stable
        let mut keys: Vec<&String> = object.keys().collect();
        keys.sort();
        for key in keys {
            let child = &object[key.as_str()];
            let child_path = property_path(path, key);
            match declared.and_then(|properties| properties.get(key.as_str())) {
                Some(sub_schema) => self.check(sub_schema, child, &child_path, 0),
                None => match additional {
                    Some(Value::Bool(false)) => self.report(&child_path, "property is not allowed"),
                    Some(sub_schema @ Value::Object(_)) => self.check(sub_schema, child, &child_path, 0),
                    _ => {}
                },
            }
        }
    }

    fn check_array(&mut self, keywords: &'s Map<String, Value>, items: &[Value], path: &str) {
        if let Some(min) = keywords.get("minItems").and_then(Value::as_u64) {
            if (items.len() as u64) < min {
                self.report(path, format!("expected at least {} item(s), found {}", min, items.len()));
            }
        }
        if let Some(max) = keywords.get("maxItems").and_then(Value::as_u64) {
            if (items.len() as u64) > max {
                self.report(path, format!("expected at most {} item(s), found {}", max, items.len()));
            }
        }
        if let Some(Value::Bool(true)) = keywords.get("uniqueItems") {
            let mut seen: HashMap<String, usize> = HashMap::new();
            for (i, item) in items.iter().enumerate() {
                if let Some(first) = seen.insert(to_canonical_string(item), i) {
                    self.report(&index_path(path, i), format!("duplicate of item {}", first));
                }
            }
        }
        match keywords.get("items") {
            Some(Value::Array(positional)) => {
                for (i, (item, sub_schema)) in items.iter().zip(positional).enumerate() {
                    self.check(sub_schema, item, &index_path(path, i), 0);
                }
            }
            Some(sub_schema) => {
                for (i, item) in items.iter().enumerate() {
                    self.check(sub_schema, item, &index_path(path, i), 0);
                }
            }
            None => {}
        }
    }

    fn check_string(&mut self, keywords: &Map<String, Value>, text: &str, path: &str) {
        let length = text.chars().count() as u64;
        if let Some(min) = keywords.get("minLength").and_then(Value::as_u64) {
            if length < min {
                self.report(path, format!("length {} is shorter than {}", length, min));
            }
        }
        if let Some(max) = keywords.get("maxLength").and_then(Value::as_u64) {
            if length > max {
                self.report(path, format!("length {} is longer than {}", length, max));
            }
        }
        if let Some(Value::String(pattern)) = keywords.get("pattern") {
            if let Some(regex) = self.schema.pattern(pattern) {
                if !regex.is_match(text) {
                    self.report(path, format!("'{}' does not match pattern '{}'", text, pattern));
                }
            }
        }
    }

    fn check_number(&mut self, keywords: &Map<String, Value>, number: &Number, path: &str) {
        if let Some(Value::Number(min)) = keywords.get("minimum") {
            if compare_numbers(number, min) == Ordering::Less {
                self.report(path, format!("{} is less than minimum {}", number, min));
            }
        }
        if let Some(Value::Number(max)) = keywords.get("maximum") {
            if compare_numbers(number, max) == Ordering::Greater {
                self.report(path, format!("{} is greater than maximum {}", number, max));
            }
        }
    }
}

/// Exact for integers of either sign, f64 otherwise
fn compare_numbers(a: &Number, b: &Number) -> Ordering {
    match (as_i128(a), as_i128(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        _ => {
            let x = a.as_f64().unwrap_or(f64::NAN);
            let y = b.as_f64().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
    }
}

fn as_i128(n: &Number) -> Option<i128> {
    n.as_i64().map(i128::from).or_else(|| n.as_u64().map(i128::from))
}

fn matches_type(kind: &Value, instance: &Value) -> bool {
    match kind {
        Value::String(name) => matches_type_name(name, instance),
        Value::Array(names) => names
            .iter()
            .filter_map(Value::as_str)
            .any(|name| matches_type_name(name, instance)),
        _ => true,
    }
}

fn matches_type_name(name: &str, instance: &Value) -> bool {
    match name {
        "null" => instance.is_null(),
        "boolean" => instance.is_boolean(),
        "object" => instance.is_object(),
        "array" => instance.is_array(),
        "string" => instance.is_string(),
        "number" => instance.is_number(),
        "integer" => match instance {
            Value::Number(n) => n.is_i64() || n.is_u64() || n.as_f64().map(|f| f.fract() == 0.0).unwrap_or(false),
            _ => false,
        },
        _ => false,
    }
}

fn describe_type(kind: &Value) -> String {
    match kind {
        Value::String(name) => name.clone(),
        Value::Array(names) => names
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(" or "),
        other => other.to_string(),
    }
}

fn kind_of(instance: &Value) -> &'static str {
    match instance {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn property_path(parent: &str, key: &str) -> String {
    let simple = !key.is_empty()
        && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !key.starts_with(|c: char| c.is_ascii_digit());
    if simple {
        format!("{}.{}", parent, key)
    } else {
        format!("{}[{}]", parent, Value::String(key.to_string()))
    }
}

fn index_path(parent: &str, index: usize) -> String {
    format!("{}[{}]", parent, index)
}
