//! End-to-end flows through the public editing and rendering API.
//!
//! Each test drives the engine the way an application would: build a
//! submission list, save it through `BlockEditor`, load the document back
//! from the store, and render it. The image pipeline runs for real against
//! a temp directory; network access is replaced with a canned fetcher.

use std::path::PathBuf;
use std::sync::Mutex;

use blockscribe::document::{BlockKind, BlockPayload};
use blockscribe::editor::{BlockEditor, BlockSubmission};
use blockscribe::imaging::{CropRect, ImagePipeline, PipelineConfig, Quality, RustBackend};
use blockscribe::ogp::{FetchError, FetchedPage, OgpCache, PageFetcher};
use blockscribe::registry;
use blockscribe::render::BlockRenderer;
use blockscribe::sns::Platform;
use blockscribe::store::MemoryStore;
use tempfile::TempDir;

const ARTICLE: i64 = 7;

const NEWS_PAGE: &str = r#"<html><head>
<meta property="og:title" content="Signals and Noise">
<meta property="og:description" content="A field guide to reading dashboards.">
<meta property="og:image" content="https://news.example.com/cover.jpg">
<meta property="og:site_name" content="Example News">
</head><body></body></html>"#;

/// Stands in for network access: serves one canned page for every URL, or
/// refuses to connect at all. Requested URLs are recorded either way.
struct StubFetcher {
    page: Option<&'static str>,
    calls: Mutex<Vec<String>>,
}

impl StubFetcher {
    fn serving(page: &'static str) -> Self {
        Self {
            page: Some(page),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn unreachable() -> Self {
        Self {
            page: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl PageFetcher for StubFetcher {
    fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        self.calls.lock().unwrap().push(url.to_string());
        match self.page {
            Some(body) => Ok(FetchedPage {
                url: url.to_string(),
                body: body.to_string(),
            }),
            None => Err(FetchError::Timeout),
        }
    }
}

fn pipeline(dir: &TempDir) -> ImagePipeline<RustBackend> {
    ImagePipeline::new(
        RustBackend::new(),
        PipelineConfig {
            storage_root: dir.path().to_path_buf(),
            block_dir: "uploads/blocks".to_string(),
            quality: Quality::default(),
        },
    )
}

/// Writes a solid-color JPEG to act as a staged upload.
fn stage_jpeg(dir: &TempDir, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.path().join(name);
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([180, 40, 40]));
    img.save(&path).unwrap();
    path
}

#[test]
fn text_and_embed_submission_round_trips() {
    let dir = TempDir::new().unwrap();
    let store = MemoryStore::new();
    let cache = OgpCache::default();
    let fetcher = StubFetcher::unreachable();
    let editor = BlockEditor::new(&store, registry::builtin(), pipeline(&dir), &cache, &fetcher);

    let submissions = vec![
        BlockSubmission::text("hello"),
        BlockSubmission::sns_embed("https://youtu.be/abc123"),
    ];
    let report = editor.save_blocks(ARTICLE, &submissions).unwrap();
    assert!(report.is_clean(), "save failed: {:?}", report.failures);
    assert_eq!(report.saved.len(), 2);

    let document = editor.load_document(ARTICLE).unwrap();
    assert_eq!(document.blocks().len(), 2);
    let BlockPayload::SnsEmbed(data) = &document.blocks()[1].payload else {
        panic!("expected an sns embed in position 1");
    };
    assert_eq!(data.platform, Some(Platform::Youtube));
    assert_eq!(data.identifier.as_deref(), Some("abc123"));

    let html = BlockRenderer::new(&cache, &fetcher)
        .render_document(&document)
        .into_string();
    assert!(html.contains("hello"));
    assert!(html.contains("https://www.youtube.com/embed/abc123"));
    assert_eq!(fetcher.call_count(), 0);
}

#[test]
fn unreachable_external_article_still_saves_and_renders() {
    let dir = TempDir::new().unwrap();
    let store = MemoryStore::new();
    let cache = OgpCache::default();
    let fetcher = StubFetcher::unreachable();
    let editor = BlockEditor::new(&store, registry::builtin(), pipeline(&dir), &cache, &fetcher);

    let submissions = vec![BlockSubmission::external_article("https://example.org/story")];
    let report = editor.save_blocks(ARTICLE, &submissions).unwrap();
    assert!(report.failures.is_empty());
    assert_eq!(report.saved.len(), 1);
    assert_eq!(report.warnings.len(), 1, "fetch failure should only warn");

    let document = editor.load_document(ARTICLE).unwrap();
    let BlockPayload::ExternalArticle(data) = &document.blocks()[0].payload else {
        panic!("expected an external article block");
    };
    assert!(data.ogp.is_none());

    // Rendering degrades to a bare link card instead of erroring.
    let html = BlockRenderer::new(&cache, &fetcher)
        .render_document(&document)
        .into_string();
    assert!(html.contains("https://example.org/story"));
    assert!(!html.contains("<img"));
}

#[test]
fn external_article_with_reachable_page_is_fetched_once() {
    let dir = TempDir::new().unwrap();
    let store = MemoryStore::new();
    let cache = OgpCache::default();
    let fetcher = StubFetcher::serving(NEWS_PAGE);
    let editor = BlockEditor::new(&store, registry::builtin(), pipeline(&dir), &cache, &fetcher);

    let submissions = vec![BlockSubmission::external_article(
        "https://news.example.com/signals",
    )];
    let report = editor.save_blocks(ARTICLE, &submissions).unwrap();
    assert!(report.is_clean());

    let document = editor.load_document(ARTICLE).unwrap();
    let BlockPayload::ExternalArticle(data) = &document.blocks()[0].payload else {
        panic!("expected an external article block");
    };
    let snapshot = data.ogp.as_ref().unwrap();
    assert_eq!(snapshot.title.as_deref(), Some("Signals and Noise"));

    let html = BlockRenderer::new(&cache, &fetcher)
        .render_document(&document)
        .into_string();
    assert!(html.contains("Signals and Noise"));
    assert!(html.contains("https://news.example.com/cover.jpg"));
    assert!(html.contains("Example News"));

    // The save populated the cache, so rendering does not hit the network.
    assert_eq!(fetcher.call_count(), 1);
}

#[test]
fn image_upload_is_processed_into_storage() {
    let dir = TempDir::new().unwrap();
    let store = MemoryStore::new();
    let cache = OgpCache::default();
    let fetcher = StubFetcher::unreachable();
    let editor = BlockEditor::new(&store, registry::builtin(), pipeline(&dir), &cache, &fetcher);
    let staged = stage_jpeg(&dir, "upload.jpg", 1400, 900);

    let submission = BlockSubmission {
        staged: Some(staged.clone()),
        alt: Some("studio".to_string()),
        caption: Some("The studio".to_string()),
        crop: Some(CropRect::new(100.0, 50.0, 800.0, 800.0)),
        ..BlockSubmission::new(BlockKind::Image)
    };
    let report = editor.save_blocks(ARTICLE, &[submission]).unwrap();
    assert!(report.is_clean(), "save failed: {:?}", report.failures);

    let document = editor.load_document(ARTICLE).unwrap();
    let BlockPayload::Image(data) = &document.blocks()[0].payload else {
        panic!("expected an image block");
    };
    assert!(data.image_path.starts_with("uploads/blocks/block_image_"));

    let stored = dir.path().join(&data.image_path);
    assert!(stored.exists());
    assert!(!staged.exists(), "staged upload should be consumed");
    let (width, height) = image::image_dimensions(&stored).unwrap();
    assert_eq!((width, height), (700, 700));

    let html = BlockRenderer::new(&cache, &fetcher)
        .render_document(&document)
        .into_string();
    assert!(html.contains(&format!("/{}", data.image_path)));
    assert!(html.contains("<figcaption>The studio</figcaption>"));
}

#[test]
fn editing_keeps_block_identity_across_saves() {
    let dir = TempDir::new().unwrap();
    let store = MemoryStore::new();
    let cache = OgpCache::default();
    let fetcher = StubFetcher::unreachable();
    let editor = BlockEditor::new(&store, registry::builtin(), pipeline(&dir), &cache, &fetcher);

    let first = editor
        .save_blocks(
            ARTICLE,
            &[
                BlockSubmission::text("draft copy"),
                BlockSubmission::sns_embed("https://youtu.be/abc123"),
            ],
        )
        .unwrap();
    let ids = first.saved.clone();

    // Resubmit the same document with one block edited in place.
    let second = editor
        .save_blocks(
            ARTICLE,
            &[
                BlockSubmission::text("final copy").with_id(ids[0]),
                BlockSubmission::sns_embed("https://youtu.be/abc123").with_id(ids[1]),
            ],
        )
        .unwrap();
    assert_eq!(second.saved, ids);

    let document = editor.load_document(ARTICLE).unwrap();
    assert_eq!(document.blocks().len(), 2);
    let BlockPayload::Text(data) = &document.blocks()[0].payload else {
        panic!("expected a text block in position 0");
    };
    assert_eq!(data.body, "final copy");
}
