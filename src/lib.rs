//! # Blockscribe
//!
//! The content-block engine of a blogging platform. An article is an ordered
//! sequence of typed blocks — text, images, social embeds, external-link
//! cards, a hero image — and this crate owns everything between the block
//! editor's submit button and the rendered markup: validation, image
//! processing, embed resolution, metadata caching, and display dispatch.
//!
//! # Architecture: Edit Side and Display Side
//!
//! The engine is two one-way flows meeting at the persistence seam:
//!
//! ```text
//! authoring → editor (validate, process uploads, resolve embeds) → store
//! display   ← render (markdown, figures, embeds, OGP cards)      ← store
//! ```
//!
//! The split exists for three reasons:
//!
//! - **Failure isolation**: the editor catches per-block failures so one bad
//!   block never loses the rest of a save; the renderer degrades per block so
//!   a dead third-party site never blanks a page.
//! - **Heavy work at save time**: image transforms and embed markup are
//!   produced once when the author saves, not on every page view.
//! - **Testability**: pixels, network, and storage sit behind traits
//!   ([`imaging::ImageBackend`], [`ogp::PageFetcher`], [`store::BlockStore`]),
//!   so the orchestration logic is exercised with recording mocks.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`document`] | Typed block payloads and the ordered per-article document |
//! | [`registry`] | The closed set of block types: required fields, image geometries |
//! | [`editor`] | Save orchestration — per-block validation, uploads, embed resolution |
//! | [`render`] | Display dispatch — markdown, figures, embeds, external-article cards |
//! | [`sns`] | Social URL handling: platform detection, id extraction, embed markup |
//! | [`ogp`] | Open Graph metadata: bounded HTTP fetch, parsing, TTL cache |
//! | [`imaging`] | Crop clamping and the deterministic crop/resize/encode pipeline |
//! | [`store`] | Persistence contract plus the in-memory reference store |
//! | [`config`] | TOML engine configuration with validation |
//!
//! # Design Decisions
//!
//! ## Tagged Payloads Over Attribute Probing
//!
//! Block data is a tagged union ([`document::BlockPayload`]) serialized with
//! an explicit `type` tag. A submission with a missing or misspelled field is
//! a visible error at the block boundary, never a silent no-op in some render
//! path. Dispatch is a `match` on the tag, so adding a variant fails loudly
//! everywhere it must be handled.
//!
//! ## Maud Over Template Engines
//!
//! Markup is generated with [Maud](https://maud.lambda.xyz/), a compile-time
//! HTML macro system:
//!
//! - **Compile-time checking**: malformed HTML is a build error.
//! - **XSS-safe by default**: interpolation is auto-escaped, which matters
//!   when the interpolated values are arbitrary third-party URLs.
//! - **Zero runtime files**: no template directory to ship or drift.
//!
//! Stored embed widgets are the one deliberate pass-through, marked as such
//! at the call site.
//!
//! ## Blocking Fetches Behind a TTL Cache
//!
//! Each render or edit request runs synchronously, so OGP metadata is
//! fetched with a blocking HTTP client — no async runtime for one bounded
//! GET. The [`ogp::OgpCache`] keeps that GET rare: a 24-hour freshness
//! window, capacity-bounded, and a failed refresh never erases the last
//! good snapshot.
//!
//! ## Temp-File-Then-Rename Image Writes
//!
//! Processed images are encoded to a random temp name in the destination
//! directory and renamed into place. An interrupted process leaves no
//! half-written file at a path a page might already reference, and two
//! concurrent writes of the same final path cannot interleave.

pub mod config;
pub mod document;
pub mod editor;
pub mod imaging;
pub mod ogp;
pub mod registry;
pub mod render;
pub mod sns;
pub mod store;
