//! Open Graph metadata extraction from fetched HTML.

use chrono::{DateTime, Utc};
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

fn meta_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    SELECTOR.get_or_init(|| Selector::parse("meta").unwrap())
}

fn title_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    SELECTOR.get_or_init(|| Selector::parse("title").unwrap())
}

/// Open Graph metadata for one URL, plus when it was fetched.
///
/// `url` is the URL the record was requested for, not whatever `og:url` the
/// page declares about itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OgpRecord {
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub site_name: Option<String>,
    pub fetched_at: DateTime<Utc>,
}

impl OgpRecord {
    pub fn is_stale(&self, ttl: chrono::Duration, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.fetched_at) >= ttl
    }
}

/// Parse `og:*` properties out of a document.
///
/// Missing fields fall back the way aggregators expect: the document
/// `<title>` stands in for `og:title`, the plain `description` meta tag for
/// `og:description`. Empty or whitespace-only content is treated as absent.
pub fn parse_document(body: &str, url: &str) -> OgpRecord {
    let doc = Html::parse_document(body);

    let mut title = None;
    let mut description = None;
    let mut image_url = None;
    let mut site_name = None;
    let mut meta_description = None;

    for element in doc.select(meta_selector()) {
        let value = element.value();
        let Some(content) = value.attr("content") else {
            continue;
        };
        let content = content.trim();
        if content.is_empty() {
            continue;
        }

        match value.attr("property") {
            Some("og:title") => title = Some(content.to_string()),
            Some("og:description") => description = Some(content.to_string()),
            Some("og:image") => image_url = Some(content.to_string()),
            Some("og:site_name") => site_name = Some(content.to_string()),
            _ => {
                if value.attr("name") == Some("description") {
                    meta_description = Some(content.to_string());
                }
            }
        }
    }

    if title.is_none() {
        title = doc
            .select(title_selector())
            .next()
            .map(|t| t.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty());
    }
    if description.is_none() {
        description = meta_description;
    }

    OgpRecord {
        url: url.to_string(),
        title,
        description,
        image_url,
        site_name,
        fetched_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_PAGE: &str = r#"<!DOCTYPE html>
        <html><head>
            <title>Plain Title</title>
            <meta property="og:title" content="OGP Title">
            <meta property="og:description" content="An article about things.">
            <meta property="og:image" content="https://cdn.example.com/cover.jpg">
            <meta property="og:site_name" content="Example Blog">
            <meta name="description" content="Plain description">
        </head><body></body></html>"#;

    #[test]
    fn ogp_properties_win_over_fallbacks() {
        let record = parse_document(FULL_PAGE, "https://example.com/post");
        assert_eq!(record.url, "https://example.com/post");
        assert_eq!(record.title.as_deref(), Some("OGP Title"));
        assert_eq!(
            record.description.as_deref(),
            Some("An article about things.")
        );
        assert_eq!(
            record.image_url.as_deref(),
            Some("https://cdn.example.com/cover.jpg")
        );
        assert_eq!(record.site_name.as_deref(), Some("Example Blog"));
    }

    #[test]
    fn falls_back_to_title_tag_and_meta_description() {
        let body = r#"<html><head>
            <title>  Fallback Title  </title>
            <meta name="description" content="Fallback description">
        </head></html>"#;
        let record = parse_document(body, "https://example.com/");
        assert_eq!(record.title.as_deref(), Some("Fallback Title"));
        assert_eq!(record.description.as_deref(), Some("Fallback description"));
        assert_eq!(record.image_url, None);
        assert_eq!(record.site_name, None);
    }

    #[test]
    fn empty_content_counts_as_absent() {
        let body = r#"<html><head>
            <title>Real Title</title>
            <meta property="og:title" content="   ">
        </head></html>"#;
        let record = parse_document(body, "https://example.com/");
        assert_eq!(record.title.as_deref(), Some("Real Title"));
    }

    #[test]
    fn pathological_markup_yields_empty_record() {
        let record = parse_document("not really html at all", "https://example.com/x");
        assert_eq!(record.url, "https://example.com/x");
        assert_eq!(record.title, None);
        assert_eq!(record.description, None);
    }

    #[test]
    fn record_staleness_respects_ttl() {
        let mut record = parse_document(FULL_PAGE, "https://example.com/");
        let now = Utc::now();
        record.fetched_at = now - chrono::Duration::hours(23);
        assert!(!record.is_stale(chrono::Duration::hours(24), now));
        record.fetched_at = now - chrono::Duration::hours(25);
        assert!(record.is_stale(chrono::Duration::hours(24), now));
    }
}
