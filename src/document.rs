//! The typed block model and the ordered per-article document.
//!
//! A block is a tagged union: the `type` field selects the payload variant,
//! so an absent field is a deserialization error instead of a silent no-op.
//! [`ArticleDocument`] owns the blocks of one article and keeps `sort_order`
//! contiguous across mutations.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

use crate::imaging::CropRect;
use crate::ogp::OgpRecord;
use crate::sns::Platform;
use crate::store::PersistenceError;

pub type ArticleId = i64;
pub type BlockId = i64;

/// Errors fatal to a whole document operation. Per-block failures are
/// reported individually and never surface here.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("block {0} does not belong to this article")]
    BlockNotFound(BlockId),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// The closed set of block types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Text,
    Image,
    FeaturedImage,
    SnsEmbed,
    ExternalArticle,
}

impl BlockKind {
    pub const ALL: [BlockKind; 5] = [
        BlockKind::Text,
        BlockKind::Image,
        BlockKind::FeaturedImage,
        BlockKind::SnsEmbed,
        BlockKind::ExternalArticle,
    ];

    /// Identifier used as the serialized `type` tag.
    pub fn as_str(self) -> &'static str {
        match self {
            BlockKind::Text => "text",
            BlockKind::Image => "image",
            BlockKind::FeaturedImage => "featured_image",
            BlockKind::SnsEmbed => "sns_embed",
            BlockKind::ExternalArticle => "external_article",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "text" => Some(BlockKind::Text),
            "image" => Some(BlockKind::Image),
            "featured_image" => Some(BlockKind::FeaturedImage),
            "sns_embed" => Some(BlockKind::SnsEmbed),
            "external_article" => Some(BlockKind::ExternalArticle),
            _ => None,
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextData {
    /// Markdown source.
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageData {
    /// Storage-relative path of the processed image.
    pub image_path: String,
    #[serde(default)]
    pub alt: String,
    #[serde(default)]
    pub caption: Option<String>,
    /// Crop applied when the image was processed, in source pixel space.
    #[serde(default)]
    pub crop: Option<CropRect>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnsEmbedData {
    pub url: String,
    #[serde(default)]
    pub platform: Option<Platform>,
    #[serde(default)]
    pub identifier: Option<String>,
    /// Embed markup cached at save time, re-synthesized when absent.
    #[serde(default)]
    pub embed_html: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalArticleData {
    pub url: String,
    /// Author-supplied overrides; these win over any fetched OGP field.
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub site_name: Option<String>,
    /// OGP snapshot from the save-time prefetch, if it succeeded.
    #[serde(default)]
    pub ogp: Option<OgpRecord>,
}

/// Type-dependent block payload, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockPayload {
    Text(TextData),
    Image(ImageData),
    FeaturedImage(ImageData),
    SnsEmbed(SnsEmbedData),
    ExternalArticle(ExternalArticleData),
}

impl BlockPayload {
    pub fn kind(&self) -> BlockKind {
        match self {
            BlockPayload::Text(_) => BlockKind::Text,
            BlockPayload::Image(_) => BlockKind::Image,
            BlockPayload::FeaturedImage(_) => BlockKind::FeaturedImage,
            BlockPayload::SnsEmbed(_) => BlockKind::SnsEmbed,
            BlockPayload::ExternalArticle(_) => BlockKind::ExternalArticle,
        }
    }

    /// Stored image path for image-bearing payloads.
    pub fn image_path(&self) -> Option<&str> {
        match self {
            BlockPayload::Image(data) | BlockPayload::FeaturedImage(data) => {
                Some(data.image_path.as_str())
            }
            _ => None,
        }
    }
}

/// One unit of article content with a stable id and an ordered position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleBlock {
    pub id: BlockId,
    pub article: ArticleId,
    pub sort_order: u32,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(flatten)]
    pub payload: BlockPayload,
}

fn default_visible() -> bool {
    true
}

/// Ordered sequence of blocks for one article.
pub struct ArticleDocument {
    article: ArticleId,
    blocks: Vec<ArticleBlock>,
}

impl ArticleDocument {
    /// Build a document from stored blocks, sorting by `sort_order`.
    pub fn from_blocks(article: ArticleId, mut blocks: Vec<ArticleBlock>) -> Self {
        blocks.sort_by_key(|b| b.sort_order);
        Self { article, blocks }
    }

    pub fn article(&self) -> ArticleId {
        self.article
    }

    pub fn blocks(&self) -> &[ArticleBlock] {
        &self.blocks
    }

    pub fn block(&self, id: BlockId) -> Option<&ArticleBlock> {
        self.blocks.iter().find(|b| b.id == id)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Blocks that take part in rendering, in document order.
    pub fn visible_blocks(&self) -> impl Iterator<Item = &ArticleBlock> {
        self.blocks.iter().filter(|b| b.visible)
    }

    /// The block rendered as the article hero: the first visible
    /// `featured_image`, if any.
    pub fn featured_image(&self) -> Option<&ArticleBlock> {
        self.visible_blocks()
            .find(|b| b.payload.kind() == BlockKind::FeaturedImage)
    }

    /// Reassign `sort_order` 0..n-1 following `ids`.
    ///
    /// Ids listed take the leading positions in the given order; blocks not
    /// listed follow in their previous relative order, so a partial list is
    /// a valid request. An id that does not belong to the document fails the
    /// whole reorder with [`DocumentError::BlockNotFound`]; duplicates after
    /// the first occurrence are ignored.
    pub fn reorder(&mut self, ids: &[BlockId]) -> Result<(), DocumentError> {
        let known: HashSet<BlockId> = self.blocks.iter().map(|b| b.id).collect();
        for &id in ids {
            if !known.contains(&id) {
                return Err(DocumentError::BlockNotFound(id));
            }
        }

        let mut remaining = std::mem::take(&mut self.blocks);
        let mut ordered = Vec::with_capacity(remaining.len());
        let mut seen = HashSet::new();
        for &id in ids {
            if !seen.insert(id) {
                continue;
            }
            if let Some(pos) = remaining.iter().position(|b| b.id == id) {
                ordered.push(remaining.remove(pos));
            }
        }
        ordered.append(&mut remaining);

        for (index, block) in ordered.iter_mut().enumerate() {
            block.sort_order = index as u32;
        }
        self.blocks = ordered;
        Ok(())
    }
}
