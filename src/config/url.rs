//! URL Templates
//!
//! Output paths and public URLs are written as templates such as
//! `posts/{date:%Y}/{date:%b}/{slug}/`. A template is parsed once, which
//! rejects unknown placeholders and bad date formats up front.

use std::fmt::Write;
use std::sync::LazyLock;

use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDateTime;
use regex::Regex;

use crate::constants::url_template::FIELDS;
use crate::types::{ConfError, Result, ValidationError, ValidationErrorKind};

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{|\}\}|\{([A-Za-z_][A-Za-z0-9_]*)(?::([^{}]*))?\}")
        .expect("placeholder pattern is valid")
});

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Literal(String),
    Field(String),
    Date(Option<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct UrlTemplate {
    raw: String,
    segments: Vec<Segment>,
}

/// Values substituted into a template
#[derive(Debug, Clone)]
pub struct UrlContext {
    pub slug: String,
    pub date: NaiveDateTime,
    pub category: String,
    pub lang: String,
    pub author: String,
}

impl UrlTemplate {
    /// Parse `raw`; `setting` names the option in error messages
    pub fn parse(setting: &str, raw: &str) -> std::result::Result<Self, ValidationError> {
        let invalid = |message: String| {
            ValidationError::new(ValidationErrorKind::Format, message).with_field(setting)
        };

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut last = 0;

        for caps in PLACEHOLDER.captures_iter(raw) {
            let whole = caps.get(0).map(|m| m.range()).unwrap_or(0..0);
            let gap = &raw[last..whole.start];
            if gap.contains(['{', '}']) {
                return Err(invalid(format!("unbalanced brace in '{}'", raw)));
            }
            literal.push_str(gap);
            last = whole.end;

            let Some(name) = caps.get(1).map(|m| m.as_str()) else {
                // Escaped "{{" or "}}"
                literal.push_str(&raw[whole.start..whole.start + 1]);
                continue;
            };
            if !FIELDS.contains(&name) {
                return Err(invalid(format!(
                    "unknown placeholder '{{{}}}' (known: {})",
                    name,
                    FIELDS.join(", ")
                )));
            }

            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            let spec = caps.get(2).map(|m| m.as_str().to_string());
            match (name, spec) {
                ("date", Some(spec)) => {
                    if StrftimeItems::new(&spec).any(|item| matches!(item, Item::Error)) {
                        return Err(invalid(format!("invalid date format '{}'", spec)));
                    }
                    segments.push(Segment::Date(Some(spec)));
                }
                ("date", None) => segments.push(Segment::Date(None)),
                (name, Some(spec)) => {
                    return Err(invalid(format!(
                        "format spec '{}' is only supported for date, not '{}'",
                        spec, name
                    )));
                }
                (name, None) => segments.push(Segment::Field(name.to_string())),
            }
        }

        let tail = &raw[last..];
        if tail.contains(['{', '}']) {
            return Err(invalid(format!("unbalanced brace in '{}'", raw)));
        }
        literal.push_str(tail);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Placeholder names used, in order of appearance
    pub fn fields(&self) -> Vec<&str> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Field(name) => Some(name.as_str()),
                Segment::Date(_) => Some("date"),
                Segment::Literal(_) => None,
            })
            .collect()
    }

    pub fn expand(&self, ctx: &UrlContext) -> Result<String> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(name) => out.push_str(match name.as_str() {
                    "slug" => &ctx.slug,
                    "category" => &ctx.category,
                    "lang" => &ctx.lang,
                    "author" => &ctx.author,
                    _ => "",
                }),
                Segment::Date(None) => {
                    let _ = write!(out, "{}", ctx.date.format("%Y-%m-%d %H:%M:%S"));
                }
                Segment::Date(Some(spec)) => {
                    write!(out, "{}", ctx.date.format_with_items(StrftimeItems::new(spec)))
                        .map_err(|_| {
                            ConfError::Config(format!(
                                "date format '{}' cannot be applied to {}",
                                spec, ctx.date
                            ))
                        })?;
                }
            }
        }
        Ok(out)
    }
}

impl std::fmt::Display for UrlTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ctx() -> UrlContext {
        UrlContext {
            slug: "hello-world".to_string(),
            date: NaiveDate::from_ymd_opt(2023, 3, 7)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            category: "general".to_string(),
            lang: "en".to_string(),
            author: "dror".to_string(),
        }
    }

    #[test]
    fn test_article_url_expansion() {
        let tpl = UrlTemplate::parse("ARTICLE_URL", "posts/{date:%Y}/{date:%b}/{date:%d}/{slug}/")
            .unwrap();
        assert_eq!(tpl.expand(&ctx()).unwrap(), "posts/2023/Mar/07/hello-world/");
        assert_eq!(tpl.fields(), vec!["date", "date", "date", "slug"]);
    }

    #[test]
    fn test_save_as_expansion() {
        let tpl = UrlTemplate::parse(
            "ARTICLE_SAVE_AS",
            "posts/{date:%Y}/{date:%b}/{date:%d}/{slug}/index.html",
        )
        .unwrap();
        assert_eq!(
            tpl.expand(&ctx()).unwrap(),
            "posts/2023/Mar/07/hello-world/index.html"
        );
    }

    #[test]
    fn test_escaped_braces() {
        let tpl = UrlTemplate::parse("PAGE_URL", "{{raw}}/{lang}/{slug}.html").unwrap();
        assert_eq!(tpl.expand(&ctx()).unwrap(), "{raw}/en/hello-world.html");
    }

    #[test]
    fn test_unknown_placeholder() {
        let err = UrlTemplate::parse("PAGE_URL", "pages/{title}.html").unwrap_err();
        assert_eq!(err.field.as_deref(), Some("PAGE_URL"));
        assert!(err.message.contains("unknown placeholder"));
    }

    #[test]
    fn test_unbalanced_brace() {
        assert!(UrlTemplate::parse("ARTICLE_URL", "posts/{slug").is_err());
        assert!(UrlTemplate::parse("ARTICLE_URL", "posts/slug}").is_err());
    }

    #[test]
    fn test_spec_on_non_date() {
        assert!(UrlTemplate::parse("ARTICLE_URL", "{slug:>10}").is_err());
    }

    #[test]
    fn test_invalid_date_format() {
        assert!(UrlTemplate::parse("ARTICLE_URL", "{date:%Q}/{slug}").is_err());
    }
}
