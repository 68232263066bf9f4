//! Settings Document
//!
//! An immutable snapshot of one settings file: a flat, ordered mapping from
//! setting name to literal [`Value`]. Loaded once, never mutated; callers
//! pass it explicitly to whatever consumes it.

mod diff;
mod parser;

pub use diff::{Change, DocumentDiff, diff};

use std::collections::BTreeMap;
use std::fmt::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::types::{ConfError, Result, Value};

/// Synthetic name used when parsing a lone literal
const LITERAL_SLOT: &str = "__literal__";

/// One named setting
#[derive(Debug, Clone, PartialEq)]
pub struct Setting {
    pub name: String,
    pub value: Value,
    /// 1-based line of the assignment
    pub line: usize,
}

#[derive(Debug, Clone)]
pub struct Document {
    path: Option<PathBuf>,
    settings: Vec<Setting>,
}

impl Document {
    /// Read and parse the document at `path`.
    ///
    /// Fails with `NotFound` if the file does not exist and `Parse` if its
    /// content is not a well-formed literal settings file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading settings document from: {}", path.display());
        let bytes = std::fs::read(path).map_err(|e| ConfError::from_io(path, e))?;
        let source = decode_utf8(&bytes, path)?;

        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        let settings = parser::parse_settings(source, path, base_dir)?;
        debug!(count = settings.len(), "Loaded settings document");

        Ok(Self {
            path: Some(path.to_path_buf()),
            settings,
        })
    }

    /// Parse a document held in memory. Embedded files resolve against `base_dir`.
    pub fn parse(source: &str, base_dir: impl AsRef<Path>) -> Result<Self> {
        let settings = parser::parse_settings(source, Path::new("<memory>"), base_dir.as_ref())?;
        Ok(Self {
            path: None,
            settings,
        })
    }

    /// Parse a single literal, e.g. a command-line override value
    pub fn parse_literal(literal: &str) -> Result<Value> {
        let source = format!("{} = {}\n", LITERAL_SLOT, literal);
        let settings = parser::parse_settings(&source, Path::new("<literal>"), Path::new("."))?;
        settings
            .into_iter()
            .next()
            .map(|s| s.value)
            .ok_or_else(|| ConfError::parse("<literal>", 1, 1, "empty literal"))
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.setting(name).map(|s| &s.value)
    }

    pub fn setting(&self, name: &str) -> Option<&Setting> {
        self.settings.iter().find(|s| s.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.setting(name).is_some()
    }

    /// Setting names in declaration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.settings.iter().map(|s| s.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Setting> {
        self.settings.iter()
    }

    pub fn len(&self) -> usize {
        self.settings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }

    /// Name → value view, independent of declaration order
    pub fn to_map(&self) -> BTreeMap<String, Value> {
        self.settings
            .iter()
            .map(|s| (s.name.clone(), s.value.clone()))
            .collect()
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.settings
                .iter()
                .map(|s| (s.name.clone(), s.value.to_json()))
                .collect(),
        )
    }

    /// Re-serialize in document syntax, declaration order preserved
    pub fn render(&self) -> String {
        let mut out = String::new();
        for setting in &self.settings {
            let _ = writeln!(out, "{} = {}", setting.name, setting.value.render());
        }
        out
    }
}

impl PartialEq for Document {
    /// Two documents are equal when they hold the same settings; order,
    /// line numbers and origin are not compared.
    fn eq(&self, other: &Self) -> bool {
        self.to_map() == other.to_map()
    }
}

/// Decode file contents, reporting the first invalid byte as a parse error
fn decode_utf8<'a>(bytes: &'a [u8], path: &Path) -> Result<&'a str> {
    std::str::from_utf8(bytes).map_err(|e| {
        let valid = &bytes[..e.valid_up_to()];
        let line = valid.iter().filter(|&&b| b == b'\n').count() + 1;
        let line_start = valid
            .iter()
            .rposition(|&b| b == b'\n')
            .map_or(0, |i| i + 1);
        // Column counts characters; the valid prefix is known to decode
        let column = String::from_utf8_lossy(&valid[line_start..]).chars().count() + 1;
        ConfError::parse(path, line, column, "invalid UTF-8")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ErrorKind;
    use proptest::prelude::*;
    use std::fs;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"#!/usr/bin/env python
# -*- coding: utf-8 -*- #
from __future__ import unicode_literals

AUTHOR = "Dror Atariah"
SITENAME = "Dr. Dror"
SITESUBTITLE = 'Foo is not just a "Bar"'
SITEURL = "https://drorata.github.io"

TIMEZONE = "Europe/Paris"
DEFAULT_LANG = "en"

# Feed generation is usually not desired when developing
FEED_ALL_ATOM = None
CATEGORY_FEED_ATOM = None

ICONS = (
    ("github", "https://github.com/drorata"),
    ("linkedin", "https://www.linkedin.com/in/atariah"),
    # ("fas fa-envelope", "mailto:drorata@gmail.com"),
)

DEFAULT_PAGINATION = 10
DEFAULT_METADATA = {
    "status": "draft",
}
DISPLAY_PAGES_ON_MENU = True

ARTICLE_URL = "posts/{date:%Y}/{date:%b}/{date:%d}/{slug}/"
STATIC_PATHS = ['images', 'extra/favicon.ico']
EXTRA_PATH_METADATA = {'extra/favicon.ico': {'path': 'favicon.ico'}}

MARKDOWN = {
    "extension_configs": {
        "markdown.extensions.codehilite": {"css_class": "highlight"},
        "markdown.extensions.extra": {},
    },
    "output_format": "html5",
}
"#;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_sample() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "pelicanconf.py", SAMPLE);

        let doc = Document::load(&path).unwrap();
        assert_eq!(doc.path(), Some(path.as_path()));
        assert_eq!(doc.get("AUTHOR"), Some(&Value::from("Dror Atariah")));
        assert_eq!(doc.get("FEED_ALL_ATOM"), Some(&Value::Null));
        assert_eq!(doc.get("DISPLAY_PAGES_ON_MENU"), Some(&Value::Bool(true)));
        assert_eq!(doc.names().next(), Some("AUTHOR"));
        assert!(!doc.contains("LINKS"));
    }

    #[test]
    fn test_pagination_is_integer() {
        let doc = Document::parse("DEFAULT_PAGINATION = 10", ".").unwrap();
        assert_eq!(doc.get("DEFAULT_PAGINATION"), Some(&Value::Int(10)));
    }

    #[test]
    fn test_static_paths_sequence() {
        let doc = Document::parse("STATIC_PATHS = ['images', 'extra/favicon.ico']", ".").unwrap();
        let paths: Vec<&str> = doc
            .get("STATIC_PATHS")
            .and_then(Value::as_seq)
            .unwrap()
            .iter()
            .filter_map(Value::as_str)
            .collect();
        assert_eq!(paths, vec!["images", "extra/favicon.ico"]);
    }

    #[test]
    fn test_extra_path_metadata_nested_lookup() {
        let doc = Document::parse(
            "EXTRA_PATH_METADATA = {'extra/favicon.ico': {'path': 'favicon.ico'}}",
            ".",
        )
        .unwrap();
        let target = doc
            .get("EXTRA_PATH_METADATA")
            .and_then(|v| v.get("extra/favicon.ico"))
            .and_then(|v| v.get("path"))
            .and_then(Value::as_str);
        assert_eq!(target, Some("favicon.ico"));
    }

    #[test]
    fn test_missing_path_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = Document::load(dir.path().join("nope.py")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_invalid_utf8_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pelicanconf.py");
        fs::write(&path, b"SITENAME = 'ok'\nAUTHOR = '\xff'\n").unwrap();

        let err = Document::load(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParseError);
        match err {
            ConfError::Parse { line, column, .. } => assert_eq!((line, column), (2, 11)),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_utf8_embedded_file_is_parse_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("blob.html"), b"\xfe\xff").unwrap();
        let path = write(&dir, "pelicanconf.py", "HEADER = open('blob.html').read()\n");
        let err = Document::load(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParseError);
    }

    #[test]
    fn test_unterminated_literal_is_parse_error() {
        let err = Document::parse("SITENAME = \"Dr. Dror\n", ".").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParseError);
    }

    #[test]
    fn test_mismatched_delimiter_is_parse_error() {
        let err = Document::parse("STATIC_PATHS = ['images', 'files')\n", ".").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParseError);

        let err = Document::parse("MARKDOWN = {'a': [1, 2}\n", ".").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParseError);
    }

    #[test]
    fn test_embedded_file() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("extra")).unwrap();
        write(&dir, "extra/header.html", "<meta name=\"x\">\n");
        let path = write(
            &dir,
            "pelicanconf.py",
            "HEADER = open(\"extra/header.html\", encoding=\"utf-8\").read()\n",
        );

        let doc = Document::load(&path).unwrap();
        assert_eq!(doc.get("HEADER"), Some(&Value::from("<meta name=\"x\">\n")));
    }

    #[test]
    fn test_missing_embedded_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "pelicanconf.py", "HEADER = open('missing.html').read()\n");
        let err = Document::load(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_render_reparse_sample() {
        let doc = Document::parse(SAMPLE, ".").unwrap();
        let reparsed = Document::parse(&doc.render(), ".").unwrap();
        assert_eq!(doc, reparsed);
        assert_eq!(reparsed.names().collect::<Vec<_>>(), doc.names().collect::<Vec<_>>());
    }

    #[test]
    fn test_parse_literal() {
        assert_eq!(Document::parse_literal("20").unwrap(), Value::Int(20));
        assert_eq!(
            Document::parse_literal("'https://example.org'").unwrap(),
            Value::from("https://example.org")
        );
        assert!(Document::parse_literal("(1,").is_err());
    }

    #[test]
    fn test_to_json() {
        let doc = Document::parse("A = (('x', 'y'),)\nB = None\n", ".").unwrap();
        assert_eq!(
            doc.to_json(),
            serde_json::json!({"A": [["x", "y"]], "B": null})
        );
    }

    fn arb_value() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::Int),
            (-1.0e12f64..1.0e12).prop_map(Value::Float),
            r"[ -~\t\né☃]{0,12}".prop_map(Value::Str),
        ];
        leaf.prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::List),
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Tuple),
                prop::collection::btree_map("[a-z/._]{0,8}", inner, 0..4).prop_map(Value::Map),
            ]
        })
    }

    proptest! {
        #[test]
        fn prop_render_roundtrip(
            values in prop::collection::btree_map("[A-Z][A-Z0-9_]{0,10}", arb_value(), 0..6)
        ) {
            let source: String = values
                .iter()
                .map(|(name, value)| format!("{} = {}\n", name, value.render()))
                .collect();
            let doc = Document::parse(&source, ".").unwrap();
            prop_assert_eq!(doc.to_map(), values);
        }
    }
}
