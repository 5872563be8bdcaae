//! Persistence seam for article blocks.
//!
//! Hosts bring their own storage; the engine only requires the [`BlockStore`]
//! contract: inserts hand back a stable id, reads come back in `sort_order`.
//! [`MemoryStore`] is the reference implementation, used by the test suite
//! and by in-process hosts.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use thiserror::Error;

use crate::document::{ArticleBlock, ArticleId, BlockId};

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("no block {0} in the store")]
    MissingBlock(BlockId),
    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Storage contract consumed by the editor and renderer.
pub trait BlockStore: Sync {
    /// All blocks of one article, ordered by `sort_order`.
    fn blocks_for(&self, article: ArticleId) -> Result<Vec<ArticleBlock>, PersistenceError>;

    /// Store a new block and return its assigned id. The id carried by
    /// `block` is ignored.
    fn insert(&self, block: ArticleBlock) -> Result<BlockId, PersistenceError>;

    /// Replace the stored block with the same id.
    fn update(&self, block: ArticleBlock) -> Result<(), PersistenceError>;

    /// Remove a block; `false` when no such block belonged to the article.
    fn delete(&self, article: ArticleId, id: BlockId) -> Result<bool, PersistenceError>;

    /// Persist new `sort_order` values after a reorder.
    fn set_order(
        &self,
        article: ArticleId,
        orders: &[(BlockId, u32)],
    ) -> Result<(), PersistenceError>;
}

#[derive(Default)]
struct StoreState {
    next_id: BlockId,
    blocks: HashMap<BlockId, ArticleBlock>,
}

/// In-memory [`BlockStore`].
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<StoreState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl BlockStore for MemoryStore {
    fn blocks_for(&self, article: ArticleId) -> Result<Vec<ArticleBlock>, PersistenceError> {
        let state = self.lock();
        let mut blocks: Vec<ArticleBlock> = state
            .blocks
            .values()
            .filter(|b| b.article == article)
            .cloned()
            .collect();
        blocks.sort_by_key(|b| b.sort_order);
        Ok(blocks)
    }

    fn insert(&self, mut block: ArticleBlock) -> Result<BlockId, PersistenceError> {
        let mut state = self.lock();
        state.next_id += 1;
        let id = state.next_id;
        block.id = id;
        state.blocks.insert(id, block);
        Ok(id)
    }

    fn update(&self, block: ArticleBlock) -> Result<(), PersistenceError> {
        let mut state = self.lock();
        match state.blocks.get_mut(&block.id) {
            Some(stored) => {
                *stored = block;
                Ok(())
            }
            None => Err(PersistenceError::MissingBlock(block.id)),
        }
    }

    fn delete(&self, article: ArticleId, id: BlockId) -> Result<bool, PersistenceError> {
        let mut state = self.lock();
        if state.blocks.get(&id).is_some_and(|b| b.article == article) {
            state.blocks.remove(&id);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn set_order(
        &self,
        article: ArticleId,
        orders: &[(BlockId, u32)],
    ) -> Result<(), PersistenceError> {
        let mut state = self.lock();
        for &(id, _) in orders {
            if !state.blocks.get(&id).is_some_and(|b| b.article == article) {
                return Err(PersistenceError::MissingBlock(id));
            }
        }
        for &(id, sort_order) in orders {
            if let Some(block) = state.blocks.get_mut(&id) {
                block.sort_order = sort_order;
            }
        }
        Ok(())
    }
}
