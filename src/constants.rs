//! Global Constants
//!
//! Setting names, file names and environment variables in one place.

/// Settings file looked up in the working directory when none is given
pub const DEFAULT_DOCUMENT: &str = "pelicanconf.py";

/// Environment variable configuration
pub mod env {
    /// Prefix for per-setting overrides (e.g. `SITECONF_SITEURL`)
    pub const PREFIX: &str = "SITECONF_";

    /// Overrides the settings file path
    pub const FILE_VAR: &str = "SITECONF_FILE";

    /// Key left after stripping [`PREFIX`] from [`FILE_VAR`]; never a setting
    pub const FILE_KEY: &str = "FILE";
}

/// Setting names understood by the typed configuration
pub mod settings {
    pub const AUTHOR: &str = "AUTHOR";
    pub const SITENAME: &str = "SITENAME";
    pub const SITEURL: &str = "SITEURL";
    pub const TIMEZONE: &str = "TIMEZONE";
    pub const DEFAULT_LANG: &str = "DEFAULT_LANG";
    pub const DEFAULT_PAGINATION: &str = "DEFAULT_PAGINATION";
    pub const EXTRA_PATH_METADATA: &str = "EXTRA_PATH_METADATA";
    pub const PLUGINS: &str = "PLUGINS";

    /// Every recognized option; anything else is passed through untyped
    pub const RECOGNIZED: &[&str] = &[
        "AUTHOR",
        "SITENAME",
        "SITESUBTITLE",
        "SITEURL",
        "PATH",
        "TIMEZONE",
        "DEFAULT_LANG",
        "FEED_ALL_ATOM",
        "FEED_ALL_RSS",
        "CATEGORY_FEED_ATOM",
        "CATEGORY_FEED_RSS",
        "TRANSLATION_FEED_ATOM",
        "TRANSLATION_FEED_RSS",
        "AUTHOR_FEED_ATOM",
        "AUTHOR_FEED_RSS",
        "LINKS",
        "ICONS",
        "SOCIAL",
        "DEFAULT_PAGINATION",
        "DEFAULT_CATEGORY",
        "DEFAULT_METADATA",
        "DISPLAY_PAGES_ON_MENU",
        "DISPLAY_CATEGORIES_ON_MENU",
        "RELATIVE_URLS",
        "ARTICLE_URL",
        "ARTICLE_SAVE_AS",
        "PAGE_URL",
        "PAGE_SAVE_AS",
        "STATIC_PATHS",
        "EXTRA_PATH_METADATA",
        "MARKDOWN",
        "THEME",
        "SITEIMAGE",
        "PLUGIN_PATHS",
        "PLUGINS",
        "DISQUS_SITENAME",
        "GOOGLE_ANALYTICS",
        "HIDE_AUTHORS",
    ];
}

/// URL template placeholders
pub mod url_template {
    /// Placeholder fields an article or page URL may use
    pub const FIELDS: &[&str] = &["slug", "date", "category", "lang", "author"];
}
