//! Serialization of parsed trees back to JSON text

use crate::value::{Value, ValueRef};

/// Render a value as compact JSON with no insignificant whitespace
pub fn compact(value: ValueRef<'_>) -> String {
    let mut out = String::new();
    write_compact(&mut out, value);
    out
}

/// Render a value as indented JSON, four spaces per nesting level
pub fn pretty(value: ValueRef<'_>) -> String {
    let mut out = String::new();
    write_pretty(&mut out, value, 0);
    out
}

fn write_compact(out: &mut String, value: ValueRef<'_>) {
    match value.value() {
        Value::Null => out.push_str("null"),
        Value::Bool(true) => out.push_str("true"),
        Value::Bool(false) => out.push_str("false"),
        Value::Number(n) => write_number(out, n),
        Value::String(_) => write_string(out, value.as_str().unwrap_or("")),
        Value::Array(_) => {
            out.push('[');
            for (i, element) in value.elements().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_compact(out, element);
            }
            out.push(']');
        }
        Value::Object(_) => {
            out.push('{');
            for (i, (name, field)) in value.entries().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_string(out, name.as_str().unwrap_or(""));
                out.push(':');
                write_compact(out, field);
            }
            out.push('}');
        }
    }
}

fn write_pretty(out: &mut String, value: ValueRef<'_>, level: usize) {
    match value.value() {
        Value::Array(_) if !value.is_empty() => {
            out.push_str("[\n");
            let count = value.len();
            for (i, element) in value.elements().enumerate() {
                indent(out, level + 1);
                write_pretty(out, element, level + 1);
                if i + 1 < count {
                    out.push(',');
                }
                out.push('\n');
            }
            indent(out, level);
            out.push(']');
        }
        Value::Object(_) if !value.is_empty() => {
            out.push_str("{\n");
            let count = value.len();
            for (i, (name, field)) in value.entries().enumerate() {
                indent(out, level + 1);
                write_string(out, name.as_str().unwrap_or(""));
                out.push_str(": ");
                write_pretty(out, field, level + 1);
                if i + 1 < count {
                    out.push(',');
                }
                out.push('\n');
            }
            indent(out, level);
            out.push('}');
        }
        _ => write_compact(out, value),
    }
}

fn indent(out: &mut String, level: usize) {
    for _ in 0..level {
        out.push_str("    ");
    }
}

fn write_number(out: &mut String, n: f64) {
    use std::fmt::Write as _;
    // f64 Display never emits an exponent, so printed numbers reparse
    let _ = write!(out, "{n}");
}

fn write_string(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            c if (c as u32) < 0x20 => {
                use std::fmt::Write as _;
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn roundtrip(input: &str) -> String {
        let (root, state) = parse(input);
        compact(state.value(root.unwrap()))
    }

    #[test]
    fn test_compact_scalars_and_nesting() {
        assert_eq!(
            roundtrip(r#"{ "a" : 1 , "b" : [ true , false , null ] }"#),
            r#"{"a":1,"b":[true,false,null]}"#
        );
    }

    #[test]
    fn test_compact_escapes_control_characters() {
        assert_eq!(
            roundtrip("{\"s\": \"a\\nb\\\"c\\u0001\"}"),
            r#"{"s":"a\nb\"c\u0001"}"#
        );
    }

    #[test]
    fn test_compact_empty_containers() {
        assert_eq!(roundtrip(r#"{"a":[],"b":{}}"#), r#"{"a":[],"b":{}}"#);
    }

    #[test]
    fn test_pretty_indents_four_spaces() {
        let (root, state) = parse(r#"{"a":[1,2],"b":{}}"#);
        let text = pretty(state.value(root.unwrap()));
        let expected = "{\n    \"a\": [\n        1,\n        2\n    ],\n    \"b\": {}\n}";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_numbers_print_without_exponent() {
        assert_eq!(roundtrip(r#"{"n": -3.5}"#), r#"{"n":-3.5}"#);
        assert_eq!(roundtrip(r#"{"n": 0}"#), r#"{"n":0}"#);
    }
}
