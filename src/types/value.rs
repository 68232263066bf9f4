//! Setting Values
//!
//! The closed set of literal values a settings document can hold.

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt::{self, Write};

/// A literal setting value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Tuple(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Human readable type name, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Tuple(_) => "tuple",
            Value::Map(_) => "mapping",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Lists and tuples are both ordered sequences
    pub fn as_seq(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) | Value::Tuple(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Nested lookup on a mapping value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map().and_then(|m| m.get(key))
    }

    /// Interpret a sequence of 2-element string sequences as (label, target) pairs.
    ///
    /// Returns `None` if any element has a different shape.
    pub fn pairs(&self) -> Option<Vec<(&str, &str)>> {
        self.as_seq()?
            .iter()
            .map(|item| match item.as_seq()? {
                [a, b] => Some((a.as_str()?, b.as_str()?)),
                _ => None,
            })
            .collect()
    }

    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;
        match self {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Int(i) => Json::from(*i),
            // Non-finite floats have no JSON form
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            Value::Str(s) => Json::String(s.clone()),
            Value::List(items) | Value::Tuple(items) => {
                Json::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Map(map) => Json::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }

    /// Render as a literal in settings-document syntax.
    ///
    /// Parsing the output yields a value equal to `self`.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out, 0);
        out
    }

    fn render_into(&self, out: &mut String, indent: usize) {
        match self {
            Value::Null => out.push_str("None"),
            Value::Bool(true) => out.push_str("True"),
            Value::Bool(false) => out.push_str("False"),
            Value::Int(i) => {
                let _ = write!(out, "{}", i);
            }
            Value::Float(f) => out.push_str(&render_float(*f)),
            Value::Str(s) => out.push_str(&quote(s)),
            Value::List(items) => render_seq(out, items, indent, '[', ']', false),
            Value::Tuple(items) => render_seq(out, items, indent, '(', ')', true),
            Value::Map(map) => {
                if map.is_empty() {
                    out.push_str("{}");
                    return;
                }
                out.push_str("{\n");
                for (key, value) in map {
                    push_indent(out, indent + 1);
                    out.push_str(&quote(key));
                    out.push_str(": ");
                    value.render_into(out, indent + 1);
                    out.push_str(",\n");
                }
                push_indent(out, indent);
                out.push('}');
            }
        }
    }
}

fn render_seq(
    out: &mut String,
    items: &[Value],
    indent: usize,
    open: char,
    close: char,
    tuple: bool,
) {
    out.push(open);
    match items {
        [] => {}
        // A one-element tuple needs its trailing comma
        [single] if tuple => {
            single.render_into(out, indent);
            out.push(',');
        }
        _ if items.iter().all(is_scalar) => {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                item.render_into(out, indent);
            }
        }
        _ => {
            out.push('\n');
            for item in items {
                push_indent(out, indent + 1);
                item.render_into(out, indent + 1);
                out.push_str(",\n");
            }
            push_indent(out, indent);
        }
    }
    out.push(close);
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::List(_) | Value::Tuple(_) | Value::Map(_))
}

fn push_indent(out: &mut String, level: usize) {
    out.push_str(&"    ".repeat(level));
}

fn render_float(f: f64) -> String {
    if f.is_nan() {
        return "float('nan')".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "float('inf')" } else { "-float('inf')" }.to_string();
    }
    // Debug keeps a fractional part or exponent, so the literal stays a float
    let s = format!("{:?}", f);
    if s.contains(['.', 'e', 'E']) { s } else { format!("{}.0", s) }
}

/// Double-quote a string, escaping what the document grammar requires
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Str(s) => serializer.serialize_str(s),
            Value::List(items) | Value::Tuple(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(map) => {
                let mut m = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    m.serialize_entry(k, v)?;
                }
                m.end()
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(a: &str, b: &str) -> Value {
        Value::Tuple(vec![a.into(), b.into()])
    }

    #[test]
    fn test_pairs() {
        let icons = Value::Tuple(vec![
            pair("github", "https://github.com/drorata"),
            pair("linkedin", "https://www.linkedin.com/in/atariah"),
        ]);
        let pairs = icons.pairs().unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0], ("github", "https://github.com/drorata"));

        let bad = Value::Tuple(vec![Value::Tuple(vec!["only-one".into()])]);
        assert!(bad.pairs().is_none());
    }

    #[test]
    fn test_nested_get() {
        let mut inner = BTreeMap::new();
        inner.insert("path".to_string(), Value::from("favicon.ico"));
        let mut outer = BTreeMap::new();
        outer.insert("extra/favicon.ico".to_string(), Value::Map(inner));
        let value = Value::Map(outer);

        assert_eq!(
            value
                .get("extra/favicon.ico")
                .and_then(|v| v.get("path"))
                .and_then(Value::as_str),
            Some("favicon.ico")
        );
        assert!(value.get("missing").is_none());
    }

    #[test]
    fn test_render_scalars() {
        assert_eq!(Value::Null.render(), "None");
        assert_eq!(Value::Bool(true).render(), "True");
        assert_eq!(Value::Int(-3).render(), "-3");
        assert_eq!(Value::Float(2.0).render(), "2.0");
        assert_eq!(Value::Float(1e300).render(), "1e300");
        assert_eq!(Value::from("a \"b\"\n").render(), r#""a \"b\"\n""#);
    }

    #[test]
    fn test_render_single_tuple() {
        let v = Value::Tuple(vec![Value::Int(1)]);
        assert_eq!(v.render(), "(1,)");
    }

    #[test]
    fn test_to_json() {
        let v = Value::List(vec![Value::from("images"), Value::Null, Value::Int(10)]);
        assert_eq!(v.to_json(), serde_json::json!(["images", null, 10]));
    }
}
