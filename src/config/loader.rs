//! Configuration Loader (Figment-based)
//!
//! Builds the typed [`SiteConfig`] from these layers, lowest precedence first:
//! 1. Built-in defaults (Serialized)
//! 2. The settings document
//! 3. Environment variables (SITECONF_* prefix, e.g. SITECONF_SITEURL)
//! 4. Command-line overrides (`-e NAME=literal`)
//!
//! The document itself is never modified; layering only shapes the typed view.

use figment::{
    Figment,
    providers::{Env, Serialized},
};
use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::debug;

use super::types::SiteConfig;
use crate::constants::{DEFAULT_DOCUMENT, env as env_vars};
use crate::document::Document;
use crate::types::{ConfError, Result, Value};

/// A `NAME=literal` override supplied on the command line
#[derive(Debug, Clone, PartialEq)]
pub struct Override {
    pub name: String,
    pub value: Value,
}

impl FromStr for Override {
    type Err = ConfError;

    fn from_str(s: &str) -> Result<Self> {
        let (name, literal) = s
            .split_once('=')
            .ok_or_else(|| ConfError::Config(format!("Override '{}' is not NAME=VALUE", s)))?;
        let name = name.trim();
        let valid_name = name
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid_name {
            return Err(ConfError::Config(format!(
                "Override name '{}' is not a valid setting name",
                name
            )));
        }
        Ok(Self {
            name: name.to_string(),
            value: Document::parse_literal(literal.trim())?,
        })
    }
}

/// A document together with its validated, layered typed view
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub document: Document,
    pub site: SiteConfig,
}

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load the document at `path` and resolve it with full precedence:
    /// defaults → document → env vars → overrides
    pub fn load(path: &Path, overrides: &[Override]) -> Result<LoadedConfig> {
        let document = Document::load(path)?;
        let site = Self::resolve(&document, overrides)?;
        Ok(LoadedConfig { document, site })
    }

    /// Resolve an already loaded document into a validated [`SiteConfig`]
    pub fn resolve(document: &Document, overrides: &[Override]) -> Result<SiteConfig> {
        let mut figment = Figment::new()
            .merge(Serialized::defaults(SiteConfig::default()))
            .merge(Serialized::defaults(document.to_map()));

        // Environment variables keep the setting's case (SITECONF_SITEURL -> SITEURL)
        // `filter` resets key lowercasing, so `lowercase(false)` must come last
        figment = figment.merge(
            Env::prefixed(env_vars::PREFIX)
                .filter(|key| !key.as_str().eq_ignore_ascii_case(env_vars::FILE_KEY))
                .lowercase(false),
        );

        if !overrides.is_empty() {
            debug!(count = overrides.len(), "Applying command-line overrides");
            let layer: BTreeMap<&str, &Value> = overrides
                .iter()
                .map(|o| (o.name.as_str(), &o.value))
                .collect();
            figment = figment.merge(Serialized::defaults(layer));
        }

        let config: SiteConfig = figment.extract()?;

        // Validate configuration after loading
        config.validate()?;

        Ok(config)
    }

    /// Settings file to use when none is given: `SITECONF_FILE`, else
    /// `pelicanconf.py` in the working directory
    pub fn default_path() -> PathBuf {
        env::var(env_vars::FILE_VAR)
            .ok()
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DOCUMENT))
    }
}
