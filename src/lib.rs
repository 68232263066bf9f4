//! siteconf - Static-Site Settings Loader
//!
//! Loads the settings document of a static-site generator (a file of
//! `NAME = literal` assignments) into an immutable snapshot, and resolves it
//! into a strongly typed configuration with explicit defaults.
//!
//! ## Quick Start
//!
//! ```ignore
//! use siteconf::{ConfigLoader, Document};
//!
//! let doc = Document::load("pelicanconf.py")?;
//! assert_eq!(doc.get("DEFAULT_PAGINATION").and_then(|v| v.as_int()), Some(10));
//!
//! let site = ConfigLoader::resolve(&doc, &[])?;
//! println!("{} by {}", site.sitename, site.author);
//! ```
//!
//! ## Modules
//!
//! - [`document`]: parsing, rendering and comparing settings documents
//! - [`config`]: typed configuration, precedence layers, URL templates
//! - [`types`]: setting values and the error type
//! - [`cli`]: command implementations for the `siteconf` binary

pub mod cli;
pub mod config;
pub mod constants;
pub mod document;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Documents
pub use document::{Change, Document, DocumentDiff, Setting, diff};

// Configuration
pub use config::{
    ConfigLoader, FeedKind, LoadedConfig, Override, Pagination, PathMetadata, SiteConfig,
    UrlContext, UrlTemplate,
};

// Error Types
pub use types::{ConfError, ErrorKind, Result, ValidationError, ValidationErrorKind, Value};
