//! Social platform detection from URLs.
//!
//! Detection is a pure substring check against an ordered rule table; it
//! never fails, it just returns `None` for URLs the engine has no native
//! embed for. Callers then take the generic-link path.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A social platform the engine can render a native embed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Twitter,
    Facebook,
    Instagram,
    Threads,
    Youtube,
}

impl Platform {
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Twitter => "twitter",
            Platform::Facebook => "facebook",
            Platform::Instagram => "instagram",
            Platform::Threads => "threads",
            Platform::Youtube => "youtube",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered detection rules: the first platform with a matching substring
/// wins. The table is fixed at compile time; nothing mutates it.
const PLATFORM_RULES: &[(Platform, &[&str])] = &[
    (Platform::Twitter, &["twitter.com", "x.com"]),
    (Platform::Facebook, &["facebook.com", "fb.com"]),
    (Platform::Instagram, &["instagram.com"]),
    (Platform::Threads, &["threads.net", "threads.com"]),
    (Platform::Youtube, &["youtube.com", "youtu.be"]),
];

/// Detect which platform a URL belongs to.
pub fn detect(url: &str) -> Option<Platform> {
    if url.trim().is_empty() {
        return None;
    }
    let lowered = url.to_lowercase();
    for (platform, needles) in PLATFORM_RULES {
        if needles.iter().any(|needle| lowered.contains(needle)) {
            log::debug!("detected {platform} for {url}");
            return Some(*platform);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_each_platform() {
        assert_eq!(
            detect("https://twitter.com/user/status/123"),
            Some(Platform::Twitter)
        );
        assert_eq!(detect("https://x.com/user/status/123"), Some(Platform::Twitter));
        assert_eq!(
            detect("https://www.facebook.com/user/posts/456"),
            Some(Platform::Facebook)
        );
        assert_eq!(detect("https://fb.com/story"), Some(Platform::Facebook));
        assert_eq!(
            detect("https://www.instagram.com/p/ABC123/"),
            Some(Platform::Instagram)
        );
        assert_eq!(
            detect("https://www.threads.net/@user/post/XYZ"),
            Some(Platform::Threads)
        );
        assert_eq!(
            detect("https://www.threads.com/@user/post/XYZ"),
            Some(Platform::Threads)
        );
        assert_eq!(
            detect("https://www.youtube.com/watch?v=abc"),
            Some(Platform::Youtube)
        );
        assert_eq!(detect("https://youtu.be/abc"), Some(Platform::Youtube));
    }

    #[test]
    fn detection_is_case_insensitive() {
        assert_eq!(
            detect("HTTPS://TWITTER.COM/U/STATUS/1"),
            Some(Platform::Twitter)
        );
    }

    #[test]
    fn unknown_hosts_yield_none() {
        assert_eq!(detect("https://example.com/article"), None);
        assert_eq!(detect("https://news.ycombinator.com/item?id=1"), None);
        assert_eq!(detect(""), None);
        assert_eq!(detect("   "), None);
    }

    #[test]
    fn detection_is_deterministic() {
        let url = "https://youtu.be/dQw4w9WgXcQ";
        assert_eq!(detect(url), detect(url));
    }

    #[test]
    fn platform_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Platform::Youtube).unwrap(),
            "\"youtube\""
        );
        let back: Platform = serde_json::from_str("\"twitter\"").unwrap();
        assert_eq!(back, Platform::Twitter);
    }
}
