pub mod commands;
pub mod ui;
pub mod util;

pub use util::{OutputFormat, resolve_document_path};
