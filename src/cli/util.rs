//! CLI Common Utilities
//!
//! Shared path resolution and output-format handling for CLI commands.

use std::path::PathBuf;
use std::str::FromStr;

use serde::Serialize;

use crate::config::ConfigLoader;
use crate::types::{ConfError, Result};

/// Output formats accepted by `--format`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Toml,
    Yaml,
    /// Settings-document syntax
    Source,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "toml" => Ok(OutputFormat::Toml),
            "yaml" => Ok(OutputFormat::Yaml),
            "source" | "py" => Ok(OutputFormat::Source),
            _ => Err(format!(
                "Invalid format '{}'. Valid values: text, json, toml, yaml, source",
                s
            )),
        }
    }
}

/// Use the given settings file or fall back to the default lookup
pub fn resolve_document_path(path: Option<PathBuf>) -> PathBuf {
    path.unwrap_or_else(ConfigLoader::default_path)
}

/// Serialize `value` in a structured format
pub fn serialize<T: Serialize>(value: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Toml => {
            let value = without_nulls(serde_json::to_value(value)?);
            Ok(toml::to_string_pretty(&value)?)
        }
        OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
        OutputFormat::Text | OutputFormat::Source => Err(ConfError::Config(format!(
            "{:?} is not a structured output format",
            format
        ))),
    }
}

/// TOML has no null; unset map entries are left out instead
fn without_nulls(value: serde_json::Value) -> serde_json::Value {
    use serde_json::Value;

    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, without_nulls(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(without_nulls).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    #[test]
    fn test_output_format_parse() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("py".parse::<OutputFormat>(), Ok(OutputFormat::Source));
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_serialize_json() {
        let out = serialize(&serde_json::json!({"A": 1}), OutputFormat::Json).unwrap();
        assert_eq!(out, "{\n  \"A\": 1\n}");
        assert!(serialize(&1, OutputFormat::Text).is_err());
    }

    #[test]
    fn test_typed_toml_skips_unset_markdown_options() {
        let doc = Document::parse(
            "AUTHOR = 'a'\nSITENAME = 'b'\nMARKDOWN = {'x': None, 'y': 1}\n",
            ".",
        )
        .unwrap();
        let site = ConfigLoader::resolve(&doc, &[]).unwrap();

        let out = serialize(&site, OutputFormat::Toml).unwrap();
        let table: toml::Table = toml::from_str(&out).unwrap();
        let markdown = table["MARKDOWN"].as_table().unwrap();
        assert_eq!(markdown.get("y").and_then(toml::Value::as_integer), Some(1));
        assert!(!markdown.contains_key("x"));
        assert!(!table.contains_key("THEME"));
    }

    #[test]
    fn test_document_toml_skips_none_settings() {
        let doc = Document::parse("SITENAME = 'b'\nFEED_ALL_ATOM = None\n", ".").unwrap();
        let out = serialize(&doc.to_json(), OutputFormat::Toml).unwrap();
        assert_eq!(out.trim_end(), "SITENAME = \"b\"");
    }
}
