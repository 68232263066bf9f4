//! Diff Command
//!
//! Compare two snapshots of a settings document.

use std::path::Path;

use console::style;

use crate::cli::util::{OutputFormat, serialize};
use crate::document::{Change, Document, diff};
use crate::types::Result;

pub fn run(old: &Path, new: &Path, format: OutputFormat) -> Result<()> {
    let old_doc = Document::load(old)?;
    let new_doc = Document::load(new)?;
    let result = diff(&old_doc, &new_doc);

    if !matches!(format, OutputFormat::Text | OutputFormat::Source) {
        println!("{}", serialize(&result, format)?.trim_end());
        return Ok(());
    }

    if result.is_empty() {
        println!("No differences between {} and {}", old.display(), new.display());
        return Ok(());
    }

    for change in &result.changes {
        match change {
            Change::Added { name, value } => {
                println!("{}", style(format!("+ {} = {}", name, value)).green());
            }
            Change::Removed { name, value } => {
                println!("{}", style(format!("- {} = {}", name, value)).red());
            }
            Change::Changed { name, old, new } => {
                println!("{}", style(format!("- {} = {}", name, old)).red());
                println!("{}", style(format!("+ {} = {}", name, new)).green());
            }
        }
    }
    Ok(())
}
