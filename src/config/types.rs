//! Configuration Types
//!
//! The typed view of a settings document. Every recognized option has an
//! explicit default matching the external generator's own, so an absent
//! setting and a defaulted field mean the same thing.

use std::collections::BTreeMap;
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::url::{UrlContext, UrlTemplate};
use crate::constants::settings;
use crate::document::Document;
use crate::types::{Result, ValidationError, ValidationErrorKind};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "SCREAMING_SNAKE_CASE")]
pub struct SiteConfig {
    // -------------------------------------------------------------------------
    // Identity
    // -------------------------------------------------------------------------
    pub author: String,
    pub sitename: String,
    pub sitesubtitle: Option<String>,
    /// Absolute site URL; empty for local development
    pub siteurl: String,
    /// Content directory
    pub path: String,

    // -------------------------------------------------------------------------
    // Localization
    // -------------------------------------------------------------------------
    pub timezone: String,
    pub default_lang: String,

    // -------------------------------------------------------------------------
    // Feeds (None or empty disables the feed)
    // -------------------------------------------------------------------------
    pub feed_all_atom: Option<String>,
    pub feed_all_rss: Option<String>,
    pub category_feed_atom: Option<String>,
    pub category_feed_rss: Option<String>,
    pub translation_feed_atom: Option<String>,
    pub translation_feed_rss: Option<String>,
    pub author_feed_atom: Option<String>,
    pub author_feed_rss: Option<String>,

    // -------------------------------------------------------------------------
    // Link lists: (label, target)
    // -------------------------------------------------------------------------
    pub links: Vec<(String, String)>,
    pub icons: Vec<(String, String)>,
    pub social: Vec<(String, String)>,

    // -------------------------------------------------------------------------
    // Listing & metadata defaults
    // -------------------------------------------------------------------------
    pub default_pagination: Pagination,
    pub default_category: String,
    pub default_metadata: BTreeMap<String, String>,
    pub display_pages_on_menu: bool,
    pub display_categories_on_menu: bool,

    // -------------------------------------------------------------------------
    // URL templates
    // -------------------------------------------------------------------------
    pub relative_urls: bool,
    pub article_url: String,
    pub article_save_as: String,
    pub page_url: String,
    pub page_save_as: String,

    // -------------------------------------------------------------------------
    // Static files
    // -------------------------------------------------------------------------
    pub static_paths: Vec<String>,
    pub extra_path_metadata: BTreeMap<String, PathMetadata>,

    // -------------------------------------------------------------------------
    // Rendering extensions
    // -------------------------------------------------------------------------
    pub markdown: BTreeMap<String, serde_json::Value>,
    pub theme: Option<String>,
    pub siteimage: Option<String>,
    pub plugin_paths: Vec<String>,
    pub plugins: Vec<String>,

    // -------------------------------------------------------------------------
    // Third-party services
    // -------------------------------------------------------------------------
    pub disqus_sitename: Option<String>,
    pub google_analytics: Option<String>,
    pub hide_authors: bool,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            author: String::new(),
            sitename: String::new(),
            sitesubtitle: None,
            siteurl: String::new(),
            path: "content".to_string(),
            timezone: "UTC".to_string(),
            default_lang: "en".to_string(),
            feed_all_atom: Some("feeds/all.atom.xml".to_string()),
            feed_all_rss: None,
            category_feed_atom: Some("feeds/{slug}.atom.xml".to_string()),
            category_feed_rss: None,
            translation_feed_atom: Some("feeds/all-{lang}.atom.xml".to_string()),
            translation_feed_rss: None,
            author_feed_atom: Some("feeds/{slug}.atom.xml".to_string()),
            author_feed_rss: Some("feeds/{slug}.rss.xml".to_string()),
            links: Vec::new(),
            icons: Vec::new(),
            social: Vec::new(),
            default_pagination: Pagination::Disabled,
            default_category: "misc".to_string(),
            default_metadata: BTreeMap::new(),
            display_pages_on_menu: true,
            display_categories_on_menu: true,
            relative_urls: false,
            article_url: "{slug}.html".to_string(),
            article_save_as: "{slug}.html".to_string(),
            page_url: "pages/{slug}.html".to_string(),
            page_save_as: "pages/{slug}.html".to_string(),
            static_paths: vec!["images".to_string()],
            extra_path_metadata: BTreeMap::new(),
            markdown: BTreeMap::new(),
            theme: None,
            siteimage: None,
            plugin_paths: Vec::new(),
            plugins: Vec::new(),
            disqus_sitename: None,
            google_analytics: None,
            hide_authors: false,
        }
    }
}

impl SiteConfig {
    /// Validate values that deserialization alone cannot check.
    /// Returns `ConfError::Validation` on the first failure.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            (settings::AUTHOR, &self.author),
            (settings::SITENAME, &self.sitename),
            (settings::TIMEZONE, &self.timezone),
            (settings::DEFAULT_LANG, &self.default_lang),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::missing(name).into());
            }
        }

        if !self.siteurl.is_empty() {
            let parsed = url::Url::parse(&self.siteurl).map_err(|e| {
                ValidationError::new(ValidationErrorKind::Format, e.to_string())
                    .with_field(settings::SITEURL)
                    .with_comparison("absolute http(s) URL", self.siteurl.clone())
            })?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(ValidationError::new(
                    ValidationErrorKind::Format,
                    "unsupported URL scheme",
                )
                .with_field(settings::SITEURL)
                .with_comparison("http or https", parsed.scheme())
                .into());
            }
        }

        for (name, _) in self.url_templates() {
            self.url_template(name)?;
        }

        if let Some(empty) = self.plugins.iter().position(|p| p.trim().is_empty()) {
            return Err(ValidationError::new(
                ValidationErrorKind::Format,
                format!("plugin name at position {} is empty", empty),
            )
            .with_field(settings::PLUGINS)
            .into());
        }

        for warning in self.warnings() {
            warn!("{}", warning);
        }

        Ok(())
    }

    /// Suspicious but accepted values
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.siteurl.ends_with('/') {
            warnings.push(format!(
                "{} ends with '/'; generated links will contain '//'",
                settings::SITEURL
            ));
        }

        for source in self.extra_path_metadata.keys() {
            if !self.is_static(source) {
                warnings.push(format!(
                    "{} entry '{}' is not under any STATIC_PATHS entry",
                    settings::EXTRA_PATH_METADATA,
                    source
                ));
            }
        }

        warnings
    }

    /// Template settings by name
    pub fn url_templates(&self) -> [(&'static str, &str); 4] {
        [
            ("ARTICLE_URL", self.article_url.as_str()),
            ("ARTICLE_SAVE_AS", self.article_save_as.as_str()),
            ("PAGE_URL", self.page_url.as_str()),
            ("PAGE_SAVE_AS", self.page_save_as.as_str()),
        ]
    }

    /// Parse one of the URL template settings
    pub fn url_template(&self, name: &str) -> std::result::Result<UrlTemplate, ValidationError> {
        let raw = self
            .url_templates()
            .into_iter()
            .find_map(|(n, raw)| (n == name).then_some(raw))
            .ok_or_else(|| {
                ValidationError::new(ValidationErrorKind::Consistency, "not a URL template")
                    .with_field(name)
            })?;
        UrlTemplate::parse(name, raw)
    }

    /// Expand the URL and save-as paths for an article or page
    pub fn content_paths(&self, page: bool, ctx: &UrlContext) -> Result<(String, String)> {
        let (url, save_as) = if page {
            ("PAGE_URL", "PAGE_SAVE_AS")
        } else {
            ("ARTICLE_URL", "ARTICLE_SAVE_AS")
        };
        Ok((
            self.url_template(url)?.expand(ctx)?,
            self.url_template(save_as)?.expand(ctx)?,
        ))
    }

    /// Configured feed path, or `None` when the feed is disabled
    pub fn feed(&self, kind: FeedKind) -> Option<&str> {
        let value = match kind {
            FeedKind::AllAtom => &self.feed_all_atom,
            FeedKind::AllRss => &self.feed_all_rss,
            FeedKind::CategoryAtom => &self.category_feed_atom,
            FeedKind::CategoryRss => &self.category_feed_rss,
            FeedKind::TranslationAtom => &self.translation_feed_atom,
            FeedKind::TranslationRss => &self.translation_feed_rss,
            FeedKind::AuthorAtom => &self.author_feed_atom,
            FeedKind::AuthorRss => &self.author_feed_rss,
        };
        value.as_deref().filter(|path| !path.trim().is_empty())
    }

    pub fn enabled_feeds(&self) -> Vec<(FeedKind, &str)> {
        FeedKind::ALL
            .iter()
            .filter_map(|kind| self.feed(*kind).map(|path| (*kind, path)))
            .collect()
    }

    fn is_static(&self, path: &str) -> bool {
        self.static_paths.iter().any(|root| {
            let root = root.trim_end_matches('/');
            path == root
                || path
                    .strip_prefix(root)
                    .is_some_and(|rest| rest.starts_with('/'))
        })
    }

    /// Output location of a static file, honouring EXTRA_PATH_METADATA remaps
    pub fn static_output_path<'a>(&'a self, source: &'a str) -> &'a str {
        self.extra_path_metadata
            .get(source)
            .and_then(|meta| meta.path.as_deref())
            .unwrap_or(source)
    }

    /// Names in `doc` the typed configuration does not know
    pub fn unrecognized(doc: &Document) -> Vec<&str> {
        doc.names()
            .filter(|name| !settings::RECOGNIZED.contains(name))
            .collect()
    }
}

// =============================================================================
// Pagination
// =============================================================================

/// Items per listing page; `False`/`None` turns pagination off
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "Option<PaginationRepr>", into = "PaginationRepr")]
pub enum Pagination {
    #[default]
    Disabled,
    PerPage(NonZeroU32),
}

impl Pagination {
    pub fn per_page(&self) -> Option<u32> {
        match self {
            Pagination::Disabled => None,
            Pagination::PerPage(n) => Some(n.get()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum PaginationRepr {
    Flag(bool),
    Size(i64),
}

impl TryFrom<Option<PaginationRepr>> for Pagination {
    type Error = String;

    fn try_from(value: Option<PaginationRepr>) -> std::result::Result<Self, Self::Error> {
        match value {
            None | Some(PaginationRepr::Flag(false)) => Ok(Pagination::Disabled),
            Some(PaginationRepr::Flag(true)) => Err(format!(
                "{} must be a page size or False, got True",
                settings::DEFAULT_PAGINATION
            )),
            Some(PaginationRepr::Size(n)) => u32::try_from(n)
                .ok()
                .and_then(NonZeroU32::new)
                .map(Pagination::PerPage)
                .ok_or_else(|| {
                    format!(
                        "{} must be a positive page size, got {}",
                        settings::DEFAULT_PAGINATION,
                        n
                    )
                }),
        }
    }
}

impl From<Pagination> for PaginationRepr {
    fn from(value: Pagination) -> Self {
        match value {
            Pagination::Disabled => PaginationRepr::Flag(false),
            Pagination::PerPage(n) => PaginationRepr::Size(i64::from(n.get())),
        }
    }
}

// =============================================================================
// Static path metadata
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathMetadata {
    /// Output path the static file is copied to
    pub path: Option<String>,
}

// =============================================================================
// Feeds
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedKind {
    AllAtom,
    AllRss,
    CategoryAtom,
    CategoryRss,
    TranslationAtom,
    TranslationRss,
    AuthorAtom,
    AuthorRss,
}

impl FeedKind {
    pub const ALL: [FeedKind; 8] = [
        FeedKind::AllAtom,
        FeedKind::AllRss,
        FeedKind::CategoryAtom,
        FeedKind::CategoryRss,
        FeedKind::TranslationAtom,
        FeedKind::TranslationRss,
        FeedKind::AuthorAtom,
        FeedKind::AuthorRss,
    ];

    /// Setting that controls this feed
    pub fn setting(&self) -> &'static str {
        match self {
            FeedKind::AllAtom => "FEED_ALL_ATOM",
            FeedKind::AllRss => "FEED_ALL_RSS",
            FeedKind::CategoryAtom => "CATEGORY_FEED_ATOM",
            FeedKind::CategoryRss => "CATEGORY_FEED_RSS",
            FeedKind::TranslationAtom => "TRANSLATION_FEED_ATOM",
            FeedKind::TranslationRss => "TRANSLATION_FEED_RSS",
            FeedKind::AuthorAtom => "AUTHOR_FEED_ATOM",
            FeedKind::AuthorRss => "AUTHOR_FEED_RSS",
        }
    }
}

impl std::fmt::Display for FeedKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.setting())
    }
}

// =============================================================================
// Tests
// =============================================================================
