//! The closed registry of block types.
//!
//! Each entry declares what a block of that type needs from the author and
//! which image geometry its uploads are processed to. The built-in table is
//! an immutable static; [`BlockRegistry::register`] exists for hosts that
//! assemble their own set.

use std::sync::LazyLock;

use thiserror::Error;

use crate::document::BlockKind;
use crate::imaging::{ImageGeometry, FEATURED_WIDE, SQUARE_IMAGE};

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("block type `{0}` is already registered")]
    DuplicateType(String),
    #[error("unknown block type: {0}")]
    UnknownType(String),
}

/// Immutable description of one block type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockTypeDef {
    pub kind: BlockKind,
    pub label: &'static str,
    /// Fields the author must fill in; whitespace-only counts as missing.
    pub required: &'static [&'static str],
    /// Target geometry for uploads, for image-bearing types.
    pub geometry: Option<ImageGeometry>,
}

/// Ordered set of block type definitions.
pub struct BlockRegistry {
    entries: Vec<BlockTypeDef>,
}

impl BlockRegistry {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn register(&mut self, def: BlockTypeDef) -> Result<(), RegistryError> {
        if self.entries.iter().any(|e| e.kind == def.kind) {
            return Err(RegistryError::DuplicateType(def.kind.to_string()));
        }
        self.entries.push(def);
        Ok(())
    }

    /// Look a type up by its serialized name.
    pub fn resolve(&self, name: &str) -> Result<&BlockTypeDef, RegistryError> {
        BlockKind::parse(name)
            .and_then(|kind| self.definition(kind))
            .ok_or_else(|| RegistryError::UnknownType(name.to_string()))
    }

    pub fn definition(&self, kind: BlockKind) -> Option<&BlockTypeDef> {
        self.entries.iter().find(|e| e.kind == kind)
    }

    pub fn types(&self) -> &[BlockTypeDef] {
        &self.entries
    }
}

impl Default for BlockRegistry {
    fn default() -> Self {
        Self::new()
    }
}

static BUILTIN: LazyLock<BlockRegistry> = LazyLock::new(|| BlockRegistry {
    entries: vec![
        BlockTypeDef {
            kind: BlockKind::Text,
            label: "Text",
            required: &["body"],
            geometry: None,
        },
        BlockTypeDef {
            kind: BlockKind::Image,
            label: "Image",
            required: &["image"],
            geometry: Some(SQUARE_IMAGE),
        },
        BlockTypeDef {
            kind: BlockKind::FeaturedImage,
            label: "Featured image",
            required: &["image"],
            geometry: Some(FEATURED_WIDE),
        },
        BlockTypeDef {
            kind: BlockKind::SnsEmbed,
            label: "Social embed",
            required: &["url"],
            geometry: None,
        },
        BlockTypeDef {
            kind: BlockKind::ExternalArticle,
            label: "External article",
            required: &["url"],
            geometry: None,
        },
    ],
});

/// The stock registry holding the five built-in block types.
pub fn builtin() -> &'static BlockRegistry {
    &BUILTIN
}
