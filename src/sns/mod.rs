//! Social URL resolution: platform detection, identifier extraction, embed
//! markup.
//!
//! The three pieces are independent pure functions; the editor composes them
//! at save time and the renderer composes them again when a stored block has
//! no cached markup.

mod embed;
mod identifier;
mod platform;

pub use embed::{fallback_link, render_embed};
pub use identifier::extract_identifier;
pub use platform::{Platform, detect};
