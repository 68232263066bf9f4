//! Site Configuration
//!
//! Typed configuration with hierarchical resolution:
//! 1. Built-in defaults
//! 2. Settings document (pelicanconf.py)
//! 3. Environment variables (SITECONF_*)
//! 4. CLI overrides (highest priority)

mod loader;
mod types;
pub mod url;

pub use loader::{ConfigLoader, LoadedConfig, Override};
pub use types::*;
pub use url::{UrlContext, UrlTemplate};
