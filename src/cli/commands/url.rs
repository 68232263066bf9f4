//! URL Command
//!
//! Preview the public URL and output path a piece of content would get.
//!
//! Usage:
//!   siteconf url [PATH] --slug hello-world [--date 2023-03-07] [--page]

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveTime, Utc};

use crate::cli::ui::Output;
use crate::cli::util::resolve_document_path;
use crate::config::{ConfigLoader, Override, UrlContext};
use crate::types::{ConfError, Result};

pub struct UrlOptions {
    pub path: Option<PathBuf>,
    pub slug: String,
    pub date: Option<String>,
    pub category: Option<String>,
    pub page: bool,
}

pub fn run(options: UrlOptions, overrides: &[Override]) -> Result<()> {
    let path = resolve_document_path(options.path);
    let site = ConfigLoader::load(&path, overrides)?.site;

    let date = match options.date.as_deref() {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|e| ConfError::Config(format!("Invalid --date '{}': {}", raw, e)))?,
        None => Utc::now().date_naive(),
    };
    let ctx = UrlContext {
        slug: options.slug,
        date: date.and_time(NaiveTime::default()),
        category: options
            .category
            .unwrap_or_else(|| site.default_category.clone()),
        lang: site.default_lang.clone(),
        author: site.author.clone(),
    };

    let (url, save_as) = site.content_paths(options.page, &ctx)?;
    let public = if site.siteurl.is_empty() {
        format!("/{}", url)
    } else {
        format!("{}/{}", site.siteurl.trim_end_matches('/'), url)
    };

    let out = Output::new();
    out.field("URL", &public);
    out.field("Saved as", &save_as);
    Ok(())
}
