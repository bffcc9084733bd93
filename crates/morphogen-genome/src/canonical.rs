// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Canonical JSON encoding.

The canonical form of a value is its minimal JSON text with object keys sorted
by byte order at every level, arrays in original order, integral numbers
written without a fraction and other numbers in shortest round-trip form.
Two structurally equal values always encode to the same bytes, which makes the
canonical text usable both for storage and for equality/hash comparisons.
*/

use serde_json::{Number, Value};
use std::fmt::Write as _;

use crate::{EvoError, EvoResult};

/// Largest magnitude below which every integral f64 is exactly representable
const EXACT_INTEGER_LIMIT: f64 = 9_007_199_254_740_992.0;

/// Number of characters of context shown either side of a parse failure
const PARSE_CONTEXT: usize = 24;

/// Parse JSON text, reporting failures as [`EvoError::Parse`] with the offending fragment
pub fn parse_json(context: &str, text: &str) -> EvoResult<Value> {
    serde_json::from_str::<Value>(text).map_err(|err| EvoError::Parse {
        context: context.to_string(),
        message: err.to_string(),
        fragment: fragment_near(text, err.line(), err.column()),
    })
}

/// Encode a value in canonical form
pub fn to_canonical_string(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value);
    out
}

/// Parse arbitrary JSON text and return its canonical form
pub fn canonicalize_str(context: &str, text: &str) -> EvoResult<String> {
    Ok(to_canonical_string(&parse_json(context, text)?))
}

/// Structural equality ignoring key order, whitespace and `1` vs `1.0`
pub fn canonical_eq(left: &Value, right: &Value) -> bool {
    to_canonical_string(left) == to_canonical_string(right)
}

/// Rewrite integral floats as integers so typed decoding sees `5` for `5.0`
pub fn normalize(value: Value) -> Value {
    match value {
        Value::Number(number) => Value::Number(normalize_number(number)),
        Value::Array(items) => Value::Array(items.into_iter().map(normalize).collect()),
        Value::Object(map) => Value::Object(map.into_iter().map(|(k, v)| (k, normalize(v))).collect()),
        other => other,
    }
}

fn normalize_number(number: Number) -> Number {
    if number.is_f64() {
        if let Some(f) = number.as_f64() {
            if let Some(i) = exact_integer(f) {
                return Number::from(i);
            }
        }
    }
    number
}

fn exact_integer(f: f64) -> Option<i64> {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < EXACT_INTEGER_LIMIT {
        Some(f as i64)
    } else {
        None
    }
}

fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(true) => out.push_str("true"),
        Value::Bool(false) => out.push_str("false"),
        Value::Number(number) => write_number(out, number),
        Value::String(s) => write_string(out, s),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(out, item);
            }
            out.push(']');
        }
        Value::Object(map) => {
            // sort explicitly; the map's own order depends on serde_json features
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));
            out.push('{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_string(out, key);
                out.push(':');
                write_value(out, item);
            }
            out.push('}');
        }
    }
}

/// Canonical text of a single number
pub fn format_number(number: &Number) -> String {
    let mut out = String::new();
    write_number(&mut out, number);
    out
}

/// Canonical text of an f64; non-finite values have no JSON form and encode as `null`
pub fn format_f64(value: f64) -> String {
    match Number::from_f64(value) {
        Some(number) => format_number(&number),
        None => "null".to_string(),
    }
}

fn write_number(out: &mut String, number: &Number) {
    if let Some(i) = number.as_i64() {
        let _ = write!(out, "{}", i);
    } else if let Some(u) = number.as_u64() {
        let _ = write!(out, "{}", u);
    } else if let Some(f) = number.as_f64() {
        match exact_integer(f) {
            Some(i) => {
                let _ = write!(out, "{}", i);
            }
            // serde_json formats floats with ryu: shortest round-trip, locale independent
            None => {
                let _ = write!(out, "{}", number);
            }
        }
    }
}

fn write_string(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

fn fragment_near(text: &str, line: usize, column: usize) -> String {
    let Some(line_text) = text.lines().nth(line.saturating_sub(1)) else {
        return text.chars().take(PARSE_CONTEXT * 2).collect();
    };
    let chars: Vec<char> = line_text.chars().collect();
    let center = column.saturating_sub(1).min(chars.len());
    let start = center.saturating_sub(PARSE_CONTEXT);
    let end = (center + PARSE_CONTEXT).min(chars.len());
    chars[start..end].iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_keys_sorted_at_every_level() {
        let value = json!({"b": {"z": 1, "a": 2}, "a": [ {"y": true, "x": null} ]});
        assert_eq!(
            to_canonical_string(&value),
            r#"{"a":[{"x":null,"y":true}],"b":{"a":2,"z":1}}"#
        );
    }

    #[test]
    fn test_key_order_and_whitespace_do_not_matter() {
        let a = canonicalize_str("a", "{ \"k\": 1, \"j\": [1, 2] }").unwrap();
        let b = canonicalize_str("b", "{\"j\":[1,2],\n\"k\":1}").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_number_formatting() {
        assert_eq!(canonicalize_str("n", "[1.0, -0.0, 2.5, 1e-7, 100]").unwrap(), "[1,0,2.5,1e-7,100]");
        assert_eq!(format_f64(0.1), "0.1");
        assert_eq!(format_f64(198.0), "198");
        assert_eq!(format_f64(f64::NAN), "null");
    }

    #[test]
    fn test_jittered_floats_reencode_to_same_text() {
        let mut state: u64 = 0x853C_49E6_748F_EA9B;
        for _ in 0..5000 {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            let unit = (state >> 11) as f64 / (1u64 << 53) as f64;
            for value in [0.5 + (unit * 2.0 - 1.0) * 0.05, 180.0 * unit, unit * 1e-3] {
                let text = format_f64(value);
                assert_eq!(canonicalize_str("f", &text).unwrap(), text);
                let parsed = parse_json("f", &text).unwrap().as_f64().unwrap();
                assert_eq!(parsed.to_bits(), value.to_bits(), "{text} reparsed as {parsed}");
            }
        }
    }

    #[test]
    fn test_large_unsigned_preserved() {
        let text = canonicalize_str("n", "18446744073709551615").unwrap();
        assert_eq!(text, "18446744073709551615");
    }

    #[test]
    fn test_canonical_idempotence() {
        let once = canonicalize_str("x", r#"{"s":"tab\there \"q\" \u0001","n":[3.25,{"b":1,"a":0}]}"#).unwrap();
        let twice = canonicalize_str("x", &once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_byte_order_not_locale_order() {
        let text = canonicalize_str("x", r#"{"b":1,"B":2,"a":3,"_":4}"#).unwrap();
        assert_eq!(text, r#"{"B":2,"_":4,"a":3,"b":1}"#);
    }

    #[test]
    fn test_normalize_integral_floats() {
        let value = normalize(json!({"count": 5.0, "ratio": 0.5}));
        assert!(value["count"].is_i64());
        assert!(value["ratio"].is_f64());
    }

    #[test]
    fn test_parse_error_names_fragment() {
        let err = parse_json("body_json", r#"{"grid": {"width": 3,, "height": 2}}"#).unwrap_err();
        match err {
            EvoError::Parse { context, fragment, .. } => {
                assert_eq!(context, "body_json");
                assert!(fragment.contains(",,"), "fragment was {fragment}");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
