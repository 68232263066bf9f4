//! Check Command
//!
//! Load and validate a settings document, then summarise it.
//!
//! Usage:
//!   siteconf check [PATH] [-e NAME=VALUE]...

use std::path::PathBuf;

use crate::cli::ui::Output;
use crate::cli::util::resolve_document_path;
use crate::config::{ConfigLoader, Override, SiteConfig};
use crate::types::Result;

pub fn run(path: Option<PathBuf>, overrides: &[Override]) -> Result<()> {
    let path = resolve_document_path(path);
    let loaded = ConfigLoader::load(&path, overrides)?;
    let site = &loaded.site;
    let out = Output::new();

    out.success(&format!(
        "{} settings loaded from {}",
        loaded.document.len(),
        path.display()
    ));

    out.header("Site");
    out.field("Name", &site.sitename);
    out.field("Author", &site.author);
    out.field(
        "URL",
        if site.siteurl.is_empty() {
            "(relative)"
        } else {
            site.siteurl.as_str()
        },
    );
    out.field("Theme", site.theme.as_deref().unwrap_or("(built-in)"));
    out.field(
        "Pagination",
        &site
            .default_pagination
            .per_page()
            .map(|n| format!("{} per page", n))
            .unwrap_or_else(|| "disabled".to_string()),
    );

    let feeds = site.enabled_feeds();
    out.field(
        "Feeds",
        &if feeds.is_empty() {
            "none".to_string()
        } else {
            feeds
                .iter()
                .map(|(kind, _)| kind.setting())
                .collect::<Vec<_>>()
                .join(", ")
        },
    );
    if !site.plugins.is_empty() {
        out.field("Plugins", &site.plugins.join(", "));
    }

    let unrecognized = SiteConfig::unrecognized(&loaded.document);
    let warnings = site.warnings();
    if !unrecognized.is_empty() || !warnings.is_empty() {
        out.header("Warnings");
        for name in unrecognized {
            out.warning(&format!("{} is not a recognized setting", name));
        }
        for warning in warnings {
            out.warning(&warning);
        }
    }

    Ok(())
}
