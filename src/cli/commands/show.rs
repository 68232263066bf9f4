//! Show Command
//!
//! Print a settings document, either as written or as the resolved typed
//! configuration (defaults, environment and overrides applied).
//!
//! Usage:
//!   siteconf show [PATH] [-f text|json|toml|yaml|source] [--typed]

use std::path::PathBuf;

use crate::cli::util::{OutputFormat, resolve_document_path, serialize};
use crate::config::{ConfigLoader, Override};
use crate::document::Document;
use crate::types::Result;

pub fn run(
    path: Option<PathBuf>,
    format: OutputFormat,
    typed: bool,
    overrides: &[Override],
) -> Result<()> {
    let path = resolve_document_path(path);

    if typed {
        let loaded = ConfigLoader::load(&path, overrides)?;
        let rendered = match format {
            // Typed view has no document syntax; fall back to TOML for text
            OutputFormat::Text | OutputFormat::Source => {
                serialize(&loaded.site, OutputFormat::Toml)?
            }
            structured => serialize(&loaded.site, structured)?,
        };
        println!("{}", rendered.trim_end());
        return Ok(());
    }

    let document = Document::load(&path)?;
    match format {
        OutputFormat::Source => print!("{}", document.render()),
        OutputFormat::Text => {
            println!("# {}\n", path.display());
            for setting in document.iter() {
                println!("{:>4}  {} = {}", setting.line, setting.name, setting.value);
            }
        }
        structured => println!("{}", serialize(&document.to_json(), structured)?.trim_end()),
    }
    Ok(())
}
