//! Platform-specific post/video identifier extraction.
//!
//! Every rule is total: a URL that does not carry an identifier in the
//! expected place yields `None`, never an error. Rendering tolerates a
//! detected platform with a missing identifier by falling back to a plain
//! link.

use super::platform::Platform;
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static TWITTER_STATUS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/status/(\d+)").expect("valid twitter pattern"));
static INSTAGRAM_POST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/p/([^/?#]+)").expect("valid instagram pattern"));
static THREADS_POST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/post/([^/?#]+)").expect("valid threads pattern"));
static FACEBOOK_POSTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/posts/(\d+)").expect("valid facebook posts pattern"));
static FACEBOOK_PERMALINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/permalink/(\d+)").expect("valid facebook permalink pattern"));
static FACEBOOK_STORY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"story_fbid=(\d+)").expect("valid facebook story pattern"));

/// Extract the canonical post/video identifier for a detected platform.
pub fn extract_identifier(url: &str, platform: Platform) -> Option<String> {
    match platform {
        Platform::Twitter => capture(&TWITTER_STATUS, url),
        Platform::Youtube => youtube_id(url),
        Platform::Instagram => capture(&INSTAGRAM_POST, url),
        Platform::Facebook => capture(&FACEBOOK_POSTS, url)
            .or_else(|| capture(&FACEBOOK_PERMALINK, url))
            .or_else(|| capture(&FACEBOOK_STORY, url)),
        Platform::Threads => capture(&THREADS_POST, url),
    }
}

fn capture(re: &Regex, url: &str) -> Option<String> {
    re.captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Short `youtu.be` links carry the id as the last path segment; long-form
/// URLs carry it in the `v` query parameter.
fn youtube_id(url: &str) -> Option<String> {
    if url.contains("youtu.be") {
        let before_query = url.split(['?', '#']).next().unwrap_or(url);
        let segment = before_query.trim_end_matches('/').rsplit('/').next()?;
        if segment.is_empty() || segment.contains("youtu.be") {
            return None;
        }
        return Some(segment.to_string());
    }

    let parsed = Url::parse(url).ok()?;
    parsed
        .query_pairs()
        .find(|(key, _)| key == "v")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}
