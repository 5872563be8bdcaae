//! Embed markup synthesis.
//!
//! Pure function of `(url, platform, identifier)` to markup. Twitter,
//! instagram and facebook get their script-widget containers; youtube gets a
//! fixed-aspect iframe; threads (no widget API) gets a link card. Anything
//! else — unknown platform, missing identifier — resolves to the plain
//! fallback link, so this module can always produce *something* for a block
//! that has a URL.

use super::platform::Platform;
use maud::{Markup, html};

/// Render the richest markup available for a URL.
pub fn render_embed(url: &str, platform: Option<Platform>, identifier: Option<&str>) -> Markup {
    match platform {
        Some(Platform::Twitter) => twitter_widget(url),
        Some(Platform::Youtube) => match identifier {
            Some(id) => youtube_frame(id),
            None => fallback_link(url),
        },
        Some(Platform::Instagram) => instagram_widget(url),
        Some(Platform::Facebook) => facebook_widget(url),
        Some(Platform::Threads) => threads_card(url),
        None => fallback_link(url),
    }
}

/// The minimal, always-producible rendering of a URL.
pub fn fallback_link(url: &str) -> Markup {
    html! {
        a href=(url) target="_blank" rel="noopener" { (url) }
    }
}

fn twitter_widget(url: &str) -> Markup {
    html! {
        blockquote.twitter-tweet {
            a href=(url) {}
        }
        script async src="https://platform.twitter.com/widgets.js" charset="utf-8" {}
    }
}

fn youtube_frame(id: &str) -> Markup {
    html! {
        div.youtube-embed {
            iframe width="560" height="315"
                src=(format!("https://www.youtube.com/embed/{id}"))
                title="YouTube video player"
                frameborder="0"
                allow="accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture"
                allowfullscreen {}
        }
    }
}

fn instagram_widget(url: &str) -> Markup {
    html! {
        blockquote.instagram-media data-instgrm-permalink=(url) {
            a href=(url) {}
        }
        script async src="//www.instagram.com/embed.js" {}
    }
}

fn facebook_widget(url: &str) -> Markup {
    html! {
        div.fb-post data-href=(url) {}
        div #fb-root {}
        script async defer crossorigin="anonymous"
            src="https://connect.facebook.net/en_US/sdk.js#xfbml=1&version=v18.0" {}
    }
}

/// Threads exposes no script widget; link out instead.
fn threads_card(url: &str) -> Markup {
    html! {
        div.threads-embed {
            a href=(url) target="_blank" rel="noopener" { "View on Threads" }
        }
    }
}
