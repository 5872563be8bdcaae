//! Display-side rendering of a block document.
//!
//! [`BlockRenderer`] walks the visible blocks in order and dispatches on the
//! payload tag. Every arm degrades instead of failing: an embed with no
//! platform renders the generic link, an external article whose metadata
//! cannot be resolved renders from its stored snapshot, a stale cache entry,
//! or as a URL-only card. Rendering never drops a visible block.
//!
//! Uses [maud](https://maud.lambda.xyz/) for templating; markup is escaped
//! by construction except where stored embed markup is deliberately passed
//! through.

use maud::{html, Markup, PreEscaped};
use pulldown_cmark::{html as md_html, Parser};

use crate::document::{ArticleBlock, ArticleDocument, BlockKind, BlockPayload, ExternalArticleData};
use crate::ogp::{OgpCache, OgpRecord, PageFetcher};
use crate::sns;

/// Renders blocks using the OGP cache for external article cards.
pub struct BlockRenderer<'a> {
    cache: &'a OgpCache,
    fetcher: &'a dyn PageFetcher,
}

impl<'a> BlockRenderer<'a> {
    pub fn new(cache: &'a OgpCache, fetcher: &'a dyn PageFetcher) -> Self {
        Self { cache, fetcher }
    }

    /// Render every visible block, in document order.
    ///
    /// At most one `featured_image` is emitted: the first visible one.
    /// Later ones are skipped with a warning, keeping the one-hero
    /// convention even if the stored data drifted.
    pub fn render_document(&self, document: &ArticleDocument) -> Markup {
        let mut rendered: Vec<Markup> = Vec::new();
        let mut featured_seen = false;

        for block in document.visible_blocks() {
            if block.payload.kind() == BlockKind::FeaturedImage {
                if featured_seen {
                    log::warn!(
                        "article {} has more than one visible featured image, skipping block {}",
                        document.article(),
                        block.id
                    );
                    continue;
                }
                featured_seen = true;
            }
            rendered.push(self.render_block(block));
        }

        html! {
            @for piece in &rendered {
                (piece)
            }
        }
    }

    /// Render one block.
    pub fn render_block(&self, block: &ArticleBlock) -> Markup {
        match &block.payload {
            BlockPayload::Text(data) => {
                let body = render_markdown(&data.body);
                html! {
                    div class="block block-text" {
                        (PreEscaped(body))
                    }
                }
            }
            BlockPayload::Image(data) => render_figure(data, "block block-image"),
            BlockPayload::FeaturedImage(data) => render_figure(data, "block block-featured"),
            BlockPayload::SnsEmbed(data) => match &data.embed_html {
                Some(stored) => html! {
                    div class="block block-sns" {
                        (PreEscaped(stored.clone()))
                    }
                },
                None => html! {
                    div class="block block-sns" {
                        (sns::render_embed(&data.url, data.platform, data.identifier.as_deref()))
                    }
                },
            },
            BlockPayload::ExternalArticle(data) => self.render_external(data),
        }
    }

    fn render_external(&self, data: &ExternalArticleData) -> Markup {
        let resolved = self.resolve_metadata(data);

        let title = data
            .title
            .clone()
            .or_else(|| resolved.as_ref().and_then(|r| r.title.clone()));
        let description = data
            .description
            .clone()
            .or_else(|| resolved.as_ref().and_then(|r| r.description.clone()));
        let site_name = data
            .site_name
            .clone()
            .or_else(|| resolved.as_ref().and_then(|r| r.site_name.clone()));
        let image = resolved.as_ref().and_then(|r| r.image_url.clone());

        html! {
            div class="block block-external-article" {
                a class="external-card" href=(data.url) target="_blank" rel="noopener" {
                    @if let Some(image) = &image {
                        img class="external-card-image" src=(image) alt="";
                    }
                    div class="external-card-body" {
                        p class="external-card-title" {
                            (title.as_deref().unwrap_or(&data.url))
                        }
                        @if let Some(description) = &description {
                            p class="external-card-description" { (description) }
                        }
                        @if let Some(site_name) = &site_name {
                            span class="external-card-site" { (site_name) }
                        }
                    }
                }
            }
        }
    }

    /// Metadata for an external card: live cache resolution first, then the
    /// block's save-time snapshot, then any stale cache entry.
    fn resolve_metadata(&self, data: &ExternalArticleData) -> Option<OgpRecord> {
        match self.cache.resolve(&data.url, self.fetcher) {
            Ok(record) => Some(record),
            Err(error) => {
                log::warn!("ogp resolution failed for {}: {error}", data.url);
                data.ogp.clone().or_else(|| self.cache.cached(&data.url))
            }
        }
    }
}

fn render_figure(data: &crate::document::ImageData, class: &str) -> Markup {
    html! {
        figure class=(class) {
            img src=(format!("/{}", data.image_path)) alt=(data.alt);
            @if let Some(caption) = &data.caption {
                figcaption { (caption) }
            }
        }
    }
}

fn render_markdown(body: &str) -> String {
    let parser = Parser::new(body);
    let mut html = String::new();
    md_html::push_html(&mut html, parser);
    html
}
