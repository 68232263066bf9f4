//! Get Command
//!
//! Print a single setting from a document.

use std::path::PathBuf;

use crate::cli::util::{OutputFormat, resolve_document_path, serialize};
use crate::document::Document;
use crate::types::{ConfError, Result};

pub fn run(name: &str, path: Option<PathBuf>, format: OutputFormat) -> Result<()> {
    let path = resolve_document_path(path);
    let document = Document::load(&path)?;

    let value = document.get(name).ok_or_else(|| {
        ConfError::Config(format!("'{}' is not set in {}", name, path.display()))
    })?;

    match format {
        // Plain strings print bare so shell scripts can use them directly
        OutputFormat::Text => match value.as_str() {
            Some(s) => println!("{}", s),
            None => println!("{}", value),
        },
        OutputFormat::Source => println!("{}", value),
        structured => println!("{}", serialize(&value.to_json(), structured)?.trim_end()),
    }
    Ok(())
}
