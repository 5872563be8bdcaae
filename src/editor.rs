//! Save-side orchestration of the block editor.
//!
//! The authoring surface submits the whole document as an ordered list of
//! [`BlockSubmission`]s; [`BlockEditor::save_blocks`] turns that into store
//! mutations. The failure policy is per-block: a block that fails
//! validation, image processing or platform resolution is reported and
//! skipped (an existing block keeps its stored version), every other block
//! is saved, and `sort_order` comes out contiguous. Only storage failures
//! abort the whole save.
//!
//! Side work handled here so the rest of the engine stays pure:
//!
//! | Block type | At save time |
//! |------------|--------------|
//! | image / featured_image | staged upload through the [`ImagePipeline`], replaced files removed |
//! | sns_embed | platform detection, identifier extraction, embed markup cached |
//! | external_article | OGP prefetch through the cache; failure is a warning, not an error |

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::document::{
    ArticleBlock, ArticleDocument, ArticleId, BlockId, BlockKind, BlockPayload, DocumentError,
    ExternalArticleData, ImageData, SnsEmbedData, TextData,
};
use crate::imaging::{CropRect, ImageBackend, ImageError, ImagePipeline};
use crate::ogp::{OgpCache, PageFetcher};
use crate::registry::{BlockRegistry, BlockTypeDef, RegistryError};
use crate::sns;
use crate::store::BlockStore;

/// A required field was absent or blank.
#[derive(Error, Debug, PartialEq)]
#[error("missing required field `{field}` for {kind} block")]
pub struct ValidationError {
    pub kind: BlockKind,
    pub field: &'static str,
}

/// Everything that can fail one block without failing the document.
#[derive(Error, Debug)]
pub enum BlockError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("no supported platform recognized in {0}")]
    UnsupportedPlatform(String),
    #[error(transparent)]
    Image(#[from] ImageError),
    #[error("malformed submission: {0}")]
    Malformed(String),
}

/// One element of the submitted block list.
///
/// Flat on purpose: this is the shape an editing form posts. `id` is present
/// when editing an existing block; blocks in the store that no submission
/// references are deleted. Image-bearing types carry either a `staged`
/// upload path (runs the pipeline) or an already-stored `image_path`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlockSubmission {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub id: Option<BlockId>,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub image_path: Option<String>,
    #[serde(default)]
    pub staged: Option<PathBuf>,
    #[serde(default)]
    pub alt: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub crop: Option<CropRect>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub site_name: Option<String>,
}

fn default_visible() -> bool {
    true
}

impl BlockSubmission {
    pub fn new(kind: BlockKind) -> Self {
        Self {
            kind: kind.as_str().to_string(),
            visible: true,
            ..Self::default()
        }
    }

    pub fn text(body: &str) -> Self {
        Self {
            body: Some(body.to_string()),
            ..Self::new(BlockKind::Text)
        }
    }

    pub fn sns_embed(url: &str) -> Self {
        Self {
            url: Some(url.to_string()),
            ..Self::new(BlockKind::SnsEmbed)
        }
    }

    pub fn external_article(url: &str) -> Self {
        Self {
            url: Some(url.to_string()),
            ..Self::new(BlockKind::ExternalArticle)
        }
    }

    pub fn with_id(mut self, id: BlockId) -> Self {
        self.id = Some(id);
        self
    }
}

/// A submission that could not be saved, by list position.
#[derive(Debug)]
pub struct BlockFailure {
    pub index: usize,
    pub error: BlockError,
}

/// Outcome of a document save.
#[derive(Debug, Default)]
pub struct SaveReport {
    /// Ids of the blocks now making up the document, in order. Includes
    /// existing blocks kept in place after a failed edit.
    pub saved: Vec<BlockId>,
    pub failures: Vec<BlockFailure>,
    /// Non-fatal notes, e.g. an external article whose metadata fetch
    /// failed.
    pub warnings: Vec<String>,
}

impl SaveReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.warnings.is_empty()
    }
}

/// Editor-side engine facade: wires the store, registry, image pipeline and
/// OGP cache together for document mutations.
pub struct BlockEditor<'a, B: ImageBackend> {
    store: &'a dyn BlockStore,
    registry: &'a BlockRegistry,
    pipeline: ImagePipeline<B>,
    cache: &'a OgpCache,
    fetcher: &'a dyn PageFetcher,
}

impl<'a, B: ImageBackend> BlockEditor<'a, B> {
    pub fn new(
        store: &'a dyn BlockStore,
        registry: &'a BlockRegistry,
        pipeline: ImagePipeline<B>,
        cache: &'a OgpCache,
        fetcher: &'a dyn PageFetcher,
    ) -> Self {
        Self {
            store,
            registry,
            pipeline,
            cache,
            fetcher,
        }
    }

    /// Load the current document for an article.
    pub fn load_document(&self, article: ArticleId) -> Result<ArticleDocument, DocumentError> {
        Ok(ArticleDocument::from_blocks(
            article,
            self.store.blocks_for(article)?,
        ))
    }

    /// Replace the article's document with the submitted block list.
    ///
    /// Submissions are processed in order; see the module docs for the
    /// per-block failure policy. Stored blocks not referenced by any
    /// submission are deleted, along with their image files.
    pub fn save_blocks(
        &self,
        article: ArticleId,
        submissions: &[BlockSubmission],
    ) -> Result<SaveReport, DocumentError> {
        let stored: HashMap<BlockId, ArticleBlock> = self
            .store
            .blocks_for(article)?
            .into_iter()
            .map(|b| (b.id, b))
            .collect();

        let mut report = SaveReport::default();
        let mut referenced: HashSet<BlockId> = HashSet::new();
        let mut outgoing: Vec<ArticleBlock> = Vec::with_capacity(submissions.len());

        for (index, submission) in submissions.iter().enumerate() {
            let previous = match submission.id {
                Some(id) if !stored.contains_key(&id) => {
                    report.failures.push(BlockFailure {
                        index,
                        error: BlockError::Malformed(format!(
                            "block {id} does not belong to article {article}"
                        )),
                    });
                    continue;
                }
                Some(id) if !referenced.insert(id) => {
                    report.failures.push(BlockFailure {
                        index,
                        error: BlockError::Malformed(format!("block {id} referenced twice")),
                    });
                    continue;
                }
                Some(id) => stored.get(&id),
                None => None,
            };

            match self.prepare(article, submission, previous, &mut report.warnings) {
                Ok(block) => outgoing.push(block),
                Err(error) => {
                    log::warn!("block {index} of article {article} failed to save: {error}");
                    // A failed edit keeps the stored version in place.
                    if let Some(existing) = previous {
                        outgoing.push(existing.clone());
                    }
                    report.failures.push(BlockFailure { index, error });
                }
            }
        }

        for (id, block) in &stored {
            if !referenced.contains(id) {
                self.store.delete(article, *id)?;
                if let Some(path) = block.payload.image_path() {
                    self.pipeline.remove_stored(path);
                }
            }
        }

        for (position, mut block) in outgoing.into_iter().enumerate() {
            block.sort_order = position as u32;
            if block.id == 0 {
                let id = self.store.insert(block)?;
                report.saved.push(id);
            } else {
                let id = block.id;
                self.store.update(block)?;
                report.saved.push(id);
            }
        }

        Ok(report)
    }

    /// Delete one block, remove its stored image, and close the ordering
    /// gap.
    pub fn delete_block(&self, article: ArticleId, id: BlockId) -> Result<bool, DocumentError> {
        let blocks = self.store.blocks_for(article)?;
        let Some(target) = blocks.iter().find(|b| b.id == id) else {
            return Ok(false);
        };
        let image = target.payload.image_path().map(String::from);

        if !self.store.delete(article, id)? {
            return Ok(false);
        }
        if let Some(path) = image {
            self.pipeline.remove_stored(&path);
        }

        let orders: Vec<(BlockId, u32)> = blocks
            .iter()
            .filter(|b| b.id != id)
            .enumerate()
            .map(|(position, b)| (b.id, position as u32))
            .collect();
        self.store.set_order(article, &orders)?;
        Ok(true)
    }

    /// Apply a new block order and persist it. `ids` may be a partial list;
    /// an id not belonging to the article fails the whole operation.
    pub fn reorder_blocks(&self, article: ArticleId, ids: &[BlockId]) -> Result<(), DocumentError> {
        let mut document = self.load_document(article)?;
        document.reorder(ids)?;
        let orders: Vec<(BlockId, u32)> = document
            .blocks()
            .iter()
            .map(|b| (b.id, b.sort_order))
            .collect();
        self.store.set_order(article, &orders)?;
        Ok(())
    }

    fn prepare(
        &self,
        article: ArticleId,
        submission: &BlockSubmission,
        previous: Option<&ArticleBlock>,
        warnings: &mut Vec<String>,
    ) -> Result<ArticleBlock, BlockError> {
        let def = self.registry.resolve(&submission.kind)?;
        validate(submission, def)?;

        let payload = match def.kind {
            BlockKind::Text => BlockPayload::Text(TextData {
                body: submission.body.clone().unwrap_or_default(),
            }),
            BlockKind::Image => BlockPayload::Image(self.prepare_image(submission, def, previous)?),
            BlockKind::FeaturedImage => {
                BlockPayload::FeaturedImage(self.prepare_image(submission, def, previous)?)
            }
            BlockKind::SnsEmbed => BlockPayload::SnsEmbed(self.prepare_sns(submission)?),
            BlockKind::ExternalArticle => {
                BlockPayload::ExternalArticle(self.prepare_external(submission, warnings))
            }
        };

        Ok(ArticleBlock {
            id: submission.id.unwrap_or(0),
            article,
            sort_order: 0,
            visible: submission.visible,
            payload,
        })
    }

    fn prepare_image(
        &self,
        submission: &BlockSubmission,
        def: &BlockTypeDef,
        previous: Option<&ArticleBlock>,
    ) -> Result<ImageData, BlockError> {
        let image_path = match &submission.staged {
            Some(staged) => {
                let Some(geometry) = def.geometry.as_ref() else {
                    return Err(BlockError::Malformed(format!(
                        "{} blocks have no image geometry",
                        def.kind
                    )));
                };
                let stored =
                    self.pipeline
                        .process(staged, def.kind.as_str(), geometry, submission.crop)?;
                if let Some(old) = previous.and_then(|b| b.payload.image_path()) {
                    if old != stored {
                        self.pipeline.remove_stored(old);
                    }
                }
                stored
            }
            None => submission.image_path.clone().unwrap_or_default(),
        };

        Ok(ImageData {
            image_path,
            alt: submission.alt.clone().unwrap_or_default(),
            caption: clean(&submission.caption),
            crop: submission.crop,
        })
    }

    fn prepare_sns(&self, submission: &BlockSubmission) -> Result<SnsEmbedData, BlockError> {
        let url = submission.url.clone().unwrap_or_default();
        let Some(platform) = sns::detect(&url) else {
            return Err(BlockError::UnsupportedPlatform(url));
        };
        let identifier = sns::extract_identifier(&url, platform);
        let embed_html = sns::render_embed(&url, Some(platform), identifier.as_deref());

        Ok(SnsEmbedData {
            url,
            platform: Some(platform),
            identifier,
            embed_html: Some(embed_html.into_string()),
        })
    }

    fn prepare_external(
        &self,
        submission: &BlockSubmission,
        warnings: &mut Vec<String>,
    ) -> ExternalArticleData {
        let url = submission.url.clone().unwrap_or_default();
        let ogp = match self.cache.resolve(&url, self.fetcher) {
            Ok(record) => Some(record),
            Err(error) => {
                log::warn!("ogp prefetch failed for {url}: {error}");
                warnings.push(format!("could not fetch metadata for {url}: {error}"));
                self.cache.cached(&url)
            }
        };

        ExternalArticleData {
            url,
            title: clean(&submission.title),
            description: clean(&submission.description),
            site_name: clean(&submission.site_name),
            ogp,
        }
    }
}

fn validate(submission: &BlockSubmission, def: &BlockTypeDef) -> Result<(), ValidationError> {
    for &field in def.required {
        let present = match field {
            "body" => !is_blank(&submission.body),
            "url" => !is_blank(&submission.url),
            "image" => submission.staged.is_some() || !is_blank(&submission.image_path),
            _ => false,
        };
        if !present {
            return Err(ValidationError {
                kind: def.kind,
                field,
            });
        }
    }
    Ok(())
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(|v| v.trim().is_empty())
}

fn clean(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}
