//! Settings Document Parser
//!
//! Parses the literal-only subset of the settings language with tree-sitter
//! and evaluates each top-level assignment into a [`Value`].
//!
//! Accepted statements:
//! - `NAME = literal` (an annotation such as `NAME: str = ...` is ignored)
//! - comments and a leading docstring
//! - `import x` / `from x import y` (ignored, no settings are imported)
//!
//! Everything else (expressions referencing other names, calls, control
//! flow, wildcard imports) is rejected. The one permitted call is
//! `open("file").read()`, which embeds a file relative to the document.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{debug, warn};
use tree_sitter::Node;

use super::Setting;
use crate::types::{ConfError, Result, Value};

/// Node kinds the grammar inserts anywhere; never part of a value
const EXTRAS: &[&str] = &["comment", "line_continuation"];

pub(super) fn create_ts_parser() -> Result<tree_sitter::Parser> {
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .map_err(|e| ConfError::Config(format!("Failed to set settings grammar: {}", e)))?;
    Ok(parser)
}

/// Parse `source` into its settings, in declaration order.
///
/// `path` is used for error messages only; `base_dir` resolves embedded files.
pub(super) fn parse_settings(source: &str, path: &Path, base_dir: &Path) -> Result<Vec<Setting>> {
    let mut parser = create_ts_parser()?;
    let tree = parser
        .parse(source, None)
        .ok_or_else(|| ConfError::parse(path, 1, 1, "parser produced no syntax tree"))?;
    let root = tree.root_node();

    let eval = Evaluator {
        source,
        path,
        base_dir,
    };

    if root.has_error() {
        return Err(eval.syntax_error(root));
    }

    let mut settings: Vec<Setting> = Vec::new();
    let mut seen: BTreeMap<String, usize> = BTreeMap::new();

    for (index, stmt) in named_children(root).into_iter().enumerate() {
        let Some(setting) = eval.statement(stmt, index == 0)? else {
            continue;
        };
        if let Some(first_line) = seen.get(&setting.name) {
            return Err(eval.error(
                stmt,
                format!(
                    "duplicate setting '{}' (first assigned on line {})",
                    setting.name, first_line
                ),
            ));
        }
        debug!(name = %setting.name, kind = setting.value.kind(), "parsed setting");
        seen.insert(setting.name.clone(), setting.line);
        settings.push(setting);
    }

    Ok(settings)
}

fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| !EXTRAS.contains(&child.kind()))
        .collect()
}

struct Evaluator<'a> {
    source: &'a str,
    path: &'a Path,
    base_dir: &'a Path,
}

impl<'a> Evaluator<'a> {
    fn text(&self, node: Node<'_>) -> &'a str {
        &self.source[node.start_byte()..node.end_byte()]
    }

    fn error(&self, node: Node<'_>, message: impl Into<String>) -> ConfError {
        let pos = node.start_position();
        ConfError::parse(self.path, pos.row + 1, pos.column + 1, message)
    }

    /// Locate the first ERROR or MISSING node and describe it
    fn syntax_error(&self, root: Node<'_>) -> ConfError {
        match first_error(root) {
            Some(node) if node.is_missing() => {
                self.error(node, format!("syntax error: missing '{}'", node.kind()))
            }
            Some(node) => {
                let snippet: String = self.text(node).chars().take(24).collect();
                let snippet = snippet.lines().next().unwrap_or_default();
                self.error(node, format!("syntax error near '{}'", snippet))
            }
            None => self.error(root, "syntax error"),
        }
    }

    fn statement(&self, stmt: Node<'_>, first: bool) -> Result<Option<Setting>> {
        match stmt.kind() {
            "future_import_statement" | "import_statement" => {
                debug!(line = stmt.start_position().row + 1, "ignoring import");
                Ok(None)
            }
            "import_from_statement" => {
                let mut cursor = stmt.walk();
                let wildcard = stmt
                    .named_children(&mut cursor)
                    .any(|c| c.kind() == "wildcard_import");
                if wildcard {
                    return Err(self.error(stmt, "wildcard imports would inject settings"));
                }
                warn!(
                    line = stmt.start_position().row + 1,
                    "ignoring import: '{}'",
                    self.text(stmt)
                );
                Ok(None)
            }
            "expression_statement" => self.expression_statement(stmt, first),
            other => Err(self.error(stmt, format!("unsupported statement: {}", other))),
        }
    }

    fn expression_statement(&self, stmt: Node<'_>, first: bool) -> Result<Option<Setting>> {
        let children = named_children(stmt);
        let [inner] = children.as_slice() else {
            return Err(self.error(stmt, "expected a single assignment"));
        };

        match inner.kind() {
            "assignment" => self.assignment(*inner).map(Some),
            "string" | "concatenated_string" if first => Ok(None),
            "augmented_assignment" => {
                Err(self.error(*inner, "augmented assignment derives from another value"))
            }
            other => Err(self.error(*inner, format!("expression has no effect: {}", other))),
        }
    }

    fn assignment(&self, node: Node<'_>) -> Result<Setting> {
        let left = node
            .child_by_field_name("left")
            .ok_or_else(|| self.error(node, "assignment without a target"))?;
        if left.kind() != "identifier" {
            return Err(self.error(left, "assignment target must be a single name"));
        }
        let right = node
            .child_by_field_name("right")
            .ok_or_else(|| self.error(node, "assignment without a value"))?;
        if right.kind() == "assignment" {
            return Err(self.error(right, "chained assignment is not supported"));
        }

        Ok(Setting {
            name: self.text(left).to_string(),
            value: self.value(right)?,
            line: node.start_position().row + 1,
        })
    }

    fn value(&self, node: Node<'_>) -> Result<Value> {
        match node.kind() {
            "none" => Ok(Value::Null),
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            "integer" => self.integer(node, false),
            "float" => self.float(node, false),
            "string" => self.string(node).map(Value::Str),
            "concatenated_string" => {
                let mut joined = String::new();
                for part in named_children(node) {
                    joined.push_str(&self.string(part)?);
                }
                Ok(Value::Str(joined))
            }
            "unary_operator" => self.unary(node),
            "parenthesized_expression" => match named_children(node).as_slice() {
                [inner] => self.value(*inner),
                _ => Err(self.error(node, "malformed parenthesized expression")),
            },
            "list" => self.sequence(node).map(Value::List),
            "tuple" | "expression_list" => self.sequence(node).map(Value::Tuple),
            "dictionary" => self.dictionary(node),
            "call" => self.embedded_file(node).map(Value::Str),
            "identifier" => Err(self.error(
                node,
                format!(
                    "'{}' refers to another name; settings must be literals",
                    self.text(node)
                ),
            )),
            other => Err(self.error(node, format!("unsupported value: {}", other))),
        }
    }

    fn sequence(&self, node: Node<'_>) -> Result<Vec<Value>> {
        named_children(node)
            .into_iter()
            .map(|item| self.value(item))
            .collect()
    }

    fn dictionary(&self, node: Node<'_>) -> Result<Value> {
        let mut map = BTreeMap::new();
        for entry in named_children(node) {
            if entry.kind() != "pair" {
                return Err(self.error(
                    entry,
                    format!("unsupported mapping entry: {}", entry.kind()),
                ));
            }
            let key_node = entry
                .child_by_field_name("key")
                .ok_or_else(|| self.error(entry, "mapping entry without a key"))?;
            let value_node = entry
                .child_by_field_name("value")
                .ok_or_else(|| self.error(entry, "mapping entry without a value"))?;

            let key = match self.value(key_node)? {
                Value::Str(key) => key,
                other => {
                    return Err(self.error(
                        key_node,
                        format!("mapping keys must be strings, found {}", other.kind()),
                    ));
                }
            };
            // Later keys win, like the source language
            map.insert(key, self.value(value_node)?);
        }
        Ok(Value::Map(map))
    }

    fn unary(&self, node: Node<'_>) -> Result<Value> {
        let operator = node
            .child_by_field_name("operator")
            .map(|op| self.text(op))
            .unwrap_or_default();
        let argument = node
            .child_by_field_name("argument")
            .ok_or_else(|| self.error(node, "unary operator without operand"))?;
        let negate = match operator {
            "-" => true,
            "+" => false,
            other => return Err(self.error(node, format!("unsupported operator '{}'", other))),
        };
        match argument.kind() {
            "integer" => self.integer(argument, negate),
            "float" => self.float(argument, negate),
            other => Err(self.error(node, format!("cannot apply '{}' to {}", operator, other))),
        }
    }

    fn integer(&self, node: Node<'_>, negate: bool) -> Result<Value> {
        let raw = self.text(node).replace('_', "");
        if raw.ends_with(['j', 'J']) {
            return Err(self.error(node, "imaginary numbers are not supported"));
        }
        let (digits, radix) = match raw.get(..2).map(str::to_ascii_lowercase).as_deref() {
            Some("0x") => (&raw[2..], 16),
            Some("0o") => (&raw[2..], 8),
            Some("0b") => (&raw[2..], 2),
            _ => (raw.as_str(), 10),
        };
        let legacy_octal = radix == 10
            && digits.len() > 1
            && digits.starts_with('0')
            && digits.contains(|c: char| c != '0');
        if legacy_octal {
            return Err(self.error(
                node,
                format!(
                    "leading zeros in decimal integer '{}' are not allowed; use 0o for octal",
                    self.text(node)
                ),
            ));
        }
        let signed = if negate {
            format!("-{}", digits)
        } else {
            digits.to_string()
        };
        i64::from_str_radix(&signed, radix)
            .map(Value::Int)
            .map_err(|e| self.error(node, format!("invalid integer '{}': {}", self.text(node), e)))
    }

    fn float(&self, node: Node<'_>, negate: bool) -> Result<Value> {
        let raw = self.text(node).replace('_', "");
        if raw.ends_with(['j', 'J']) {
            return Err(self.error(node, "imaginary numbers are not supported"));
        }
        let parsed: f64 = raw
            .parse()
            .map_err(|e| self.error(node, format!("invalid float '{}': {}", raw, e)))?;
        if !parsed.is_finite() {
            return Err(self.error(node, format!("float '{}' is out of range", raw)));
        }
        Ok(Value::Float(if negate { -parsed } else { parsed }))
    }

    fn string(&self, node: Node<'_>) -> Result<String> {
        if node.kind() != "string" {
            return Err(self.error(node, format!("expected a string, found {}", node.kind())));
        }
        let text = self.text(node);
        let quote_at = text
            .find(['"', '\''])
            .ok_or_else(|| self.error(node, "string without quotes"))?;
        let prefix = text[..quote_at].to_ascii_lowercase();
        if prefix.contains('f') {
            return Err(self.error(node, "formatted strings are not literals"));
        }
        if prefix.contains('b') {
            return Err(self.error(node, "byte strings are not supported"));
        }
        let raw = prefix.contains('r');

        let rest = &text[quote_at..];
        let delimiter = if rest.starts_with("\"\"\"") || rest.starts_with("'''") {
            3
        } else {
            1
        };
        if rest.len() < delimiter * 2 {
            return Err(self.error(node, "unterminated string"));
        }
        let body = &rest[delimiter..rest.len() - delimiter];

        if raw {
            Ok(body.to_string())
        } else {
            unescape(body).map_err(|msg| self.error(node, msg))
        }
    }

    /// `open("path"[, ...]).read()`: embed a file's contents as a string
    fn embedded_file(&self, node: Node<'_>) -> Result<String> {
        let unsupported = || self.error(node, "calls are not supported except open(...).read()");

        let function = node.child_by_field_name("function").ok_or_else(unsupported)?;
        if function.kind() != "attribute" {
            return Err(unsupported());
        }
        let method = function
            .child_by_field_name("attribute")
            .map(|a| self.text(a))
            .unwrap_or_default();
        let read_args = node
            .child_by_field_name("arguments")
            .map(named_children)
            .unwrap_or_default();
        if method != "read" || !read_args.is_empty() {
            return Err(unsupported());
        }

        let open_call = function.child_by_field_name("object").ok_or_else(unsupported)?;
        let is_open = open_call.kind() == "call"
            && open_call
                .child_by_field_name("function")
                .is_some_and(|f| f.kind() == "identifier" && self.text(f) == "open");
        if !is_open {
            return Err(unsupported());
        }

        let open_args = open_call
            .child_by_field_name("arguments")
            .map(named_children)
            .unwrap_or_default();
        let Some(first) = open_args.first() else {
            return Err(self.error(open_call, "open() needs a file name"));
        };
        let relative = match self.value(*first)? {
            Value::Str(s) => s,
            other => {
                return Err(self.error(
                    *first,
                    format!("open() file name must be a string, found {}", other.kind()),
                ));
            }
        };

        let resolved = self.base_dir.join(&relative);
        debug!(file = %resolved.display(), "embedding file contents");
        let bytes = std::fs::read(&resolved).map_err(|e| ConfError::from_io(&resolved, e))?;
        super::decode_utf8(&bytes, &resolved).map(str::to_string)
    }
}

fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}

/// Decode backslash escapes in a non-raw string body
fn unescape(body: &str) -> std::result::Result<String, String> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(esc) = chars.next() else {
            return Err("dangling backslash".to_string());
        };
        match esc {
            '\n' => {}
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'a' => out.push('\u{07}'),
            'b' => out.push('\u{08}'),
            'f' => out.push('\u{0c}'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'v' => out.push('\u{0b}'),
            '0'..='7' => {
                let mut code = esc.to_digit(8).unwrap_or_default();
                for _ in 0..2 {
                    match chars.peek().and_then(|d| d.to_digit(8)) {
                        Some(d) => {
                            code = code * 8 + d;
                            chars.next();
                        }
                        None => break,
                    }
                }
                out.push(char::from_u32(code).ok_or("invalid octal escape")?);
            }
            'x' => out.push(hex_escape(&mut chars, 'x', 2)?),
            'u' => out.push(hex_escape(&mut chars, 'u', 4)?),
            'U' => out.push(hex_escape(&mut chars, 'U', 8)?),
            'N' => return Err("named unicode escapes are not supported".to_string()),
            // Unknown escapes keep their backslash
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }

    Ok(out)
}

fn hex_escape(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    letter: char,
    width: usize,
) -> std::result::Result<char, String> {
    let digits: String = chars.by_ref().take(width).collect();
    if digits.chars().count() != width {
        return Err(format!("truncated \\{} escape: '{}'", letter, digits));
    }
    u32::from_str_radix(&digits, 16)
        .ok()
        .and_then(char::from_u32)
        .ok_or_else(|| format!("invalid escape sequence '{}'", digits))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Result<Vec<Setting>> {
        parse_settings(source, Path::new("test.py"), Path::new("."))
    }

    fn value_of(source: &str) -> Value {
        let settings = parse(source).unwrap();
        settings.into_iter().next().unwrap().value
    }

    #[test]
    fn test_scalars() {
        assert_eq!(value_of("X = 10"), Value::Int(10));
        assert_eq!(value_of("X = -0x1f"), Value::Int(-31));
        assert_eq!(value_of("X = 1_000"), Value::Int(1000));
        assert_eq!(value_of("X = 0b101"), Value::Int(5));
        assert_eq!(value_of("X = 2.5"), Value::Float(2.5));
        assert_eq!(value_of("X = True"), Value::Bool(true));
        assert_eq!(value_of("X = None"), Value::Null);
    }

    #[test]
    fn test_strings() {
        assert_eq!(
            value_of(r#"X = 'Foo is not just a "Bar"'"#),
            Value::from(r#"Foo is not just a "Bar""#)
        );
        assert_eq!(value_of(r#"X = "tab\there""#), Value::from("tab\there"));
        assert_eq!(value_of(r#"X = r"C:\path""#), Value::from(r"C:\path"));
        assert_eq!(value_of(r#"X = u"\u00e9""#), Value::from("é"));
        assert_eq!(value_of("X = \"\"\"multi\nline\"\"\""), Value::from("multi\nline"));
        assert_eq!(value_of(r#"X = ("a" "b")"#), Value::from("ab"));
    }

    #[test]
    fn test_containers_skip_comments() {
        let source = r#"
ICONS = (
    ("github", "https://github.com/drorata"),
    # ("fas fa-envelope", "mailto:someone@example.com"),
    ("linkedin", "https://www.linkedin.com/in/atariah"),
)
"#;
        let icons = value_of(source);
        assert_eq!(icons.pairs().unwrap().len(), 2);
    }

    #[test]
    fn test_header_and_imports_ignored() {
        let source = r#"#!/usr/bin/env python
# -*- coding: utf-8 -*- #
from __future__ import unicode_literals
import os

AUTHOR = "Dror Atariah"
"#;
        let settings = parse(source).unwrap();
        assert_eq!(settings.len(), 1);
        assert_eq!(settings[0].name, "AUTHOR");
        assert_eq!(settings[0].line, 6);
    }

    #[test]
    fn test_wildcard_import_rejected() {
        let err = parse("from pelicanconf import *\n").unwrap_err();
        assert!(matches!(err, ConfError::Parse { line: 1, .. }));
    }

    #[test]
    fn test_references_rejected() {
        let err = parse("A = 1\nB = A\n").unwrap_err();
        assert!(matches!(err, ConfError::Parse { line: 2, .. }));
        assert!(err.to_string().contains("refers to another name"));
    }

    #[test]
    fn test_calls_and_fstrings_rejected() {
        assert!(parse("X = len('abc')\n").is_err());
        assert!(parse("X = f\"{1}\"\n").is_err());
        assert!(parse("X = b\"raw\"\n").is_err());
        assert!(parse("X = 1 + 2\n").is_err());
    }

    #[test]
    fn test_non_string_key_rejected() {
        let err = parse("X = {1: 'a'}\n").unwrap_err();
        assert!(err.to_string().contains("mapping keys must be strings"));
    }

    #[test]
    fn test_duplicate_rejected() {
        let err = parse("X = 1\nX = 2\n").unwrap_err();
        assert!(err.to_string().contains("duplicate setting 'X'"));
    }

    #[test]
    fn test_control_flow_rejected() {
        let err = parse("if True:\n    X = 1\n").unwrap_err();
        assert!(err.to_string().contains("unsupported statement"));
    }

    #[test]
    fn test_overflow_rejected() {
        assert!(parse("X = 99999999999999999999\n").is_err());
    }

    #[test]
    fn test_leading_zero_integer_rejected() {
        let err = parse("X = 010\n").unwrap_err();
        assert!(err.to_string().contains("leading zeros"));
        assert!(parse("X = -007\n").is_err());
        assert_eq!(value_of("X = 000"), Value::Int(0));
        assert_eq!(value_of("X = 0o10"), Value::Int(8));
    }

    #[test]
    fn test_line_continuation_in_string() {
        assert_eq!(value_of("X = 'line\\\nnext'\n"), Value::from("linenext"));
        assert_eq!(value_of("X = 'line\\\r\nnext'\r\n"), Value::from("linenext"));
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape(r"a\nb").unwrap(), "a\nb");
        assert_eq!(unescape(r"\x41\101").unwrap(), "AA");
        assert_eq!(unescape(r"\d").unwrap(), r"\d");
        assert_eq!(unescape("a\\\r\nb").unwrap(), "ab");
        assert_eq!(unescape(r"\x4").unwrap_err(), r"truncated \x escape: '4'");
        assert_eq!(unescape(r"\u00e").unwrap_err(), r"truncated \u escape: '00e'");
        assert_eq!(unescape(r"\U0001F60").unwrap_err(), r"truncated \U escape: '0001F60'");
    }
}
