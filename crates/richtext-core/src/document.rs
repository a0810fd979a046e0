//! The document: an ordered sequence of blocks plus the entity registry.
//!
//! `Document` is an immutable value with structural sharing: blocks live
//! behind `Arc`s and a snapshot clone is a handful of reference bumps, which
//! keeps whole-document undo/redo cheap. Construction and query only; every
//! mutation goes through [`Document::with_blocks`] or the entity accessors
//! and produces a new value.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::block::{Block, BlockKey};
use crate::entity::{Entity, EntityKey, EntityMap};

/// An internal invariant breach: a stale or duplicate key reached a
/// structural operation.
///
/// Always fatal to the specific operation and never silently repaired; the
/// document is left untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructuralViolation {
    /// A referenced block key does not exist in the document.
    UnknownBlock(BlockKey),
    /// A referenced entity key does not exist in the registry.
    UnknownEntity(EntityKey),
    /// An operation would produce two blocks with the same key.
    DuplicateBlockKey(BlockKey),
    /// A range query named endpoints out of document order.
    OutOfOrderRange {
        /// The requested start key.
        start: BlockKey,
        /// The requested end key.
        end: BlockKey,
    },
}

impl fmt::Display for StructuralViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StructuralViolation::UnknownBlock(key) => {
                write!(f, "unknown block key: {}", key)
            }
            StructuralViolation::UnknownEntity(key) => {
                write!(f, "unknown entity key: {}", key)
            }
            StructuralViolation::DuplicateBlockKey(key) => {
                write!(f, "duplicate block key: {}", key)
            }
            StructuralViolation::OutOfOrderRange { start, end } => {
                write!(f, "block range out of document order: {}..{}", start, end)
            }
        }
    }
}

impl std::error::Error for StructuralViolation {}

/// An ordered sequence of content blocks plus the entity registry.
///
/// Invariants: at least one block; block keys unique. Entity references in
/// block ranges are *not* enforced transactionally — a dangling reference is
/// a caller error surfaced when the reference is used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    blocks: Arc<Vec<Arc<Block>>>,
    index: Arc<HashMap<BlockKey, usize>>,
    entities: EntityMap,
}

impl Document {
    /// Build a document from owned blocks and an entity registry.
    ///
    /// An empty block list is seeded with a single empty paragraph (a
    /// document never has zero blocks).
    pub fn new(blocks: Vec<Block>, entities: EntityMap) -> Result<Self, StructuralViolation> {
        Self::build(blocks.into_iter().map(Arc::new).collect(), entities)
    }

    /// A document holding a single empty paragraph.
    pub fn empty() -> Self {
        Self::build(vec![Arc::new(Block::empty_paragraph())], EntityMap::new())
            .expect("a single fresh block cannot collide")
    }

    fn build(
        mut blocks: Vec<Arc<Block>>,
        entities: EntityMap,
    ) -> Result<Self, StructuralViolation> {
        if blocks.is_empty() {
            blocks.push(Arc::new(Block::empty_paragraph()));
        }
        let mut index = HashMap::with_capacity(blocks.len());
        for (position, block) in blocks.iter().enumerate() {
            if index.insert(block.key().clone(), position).is_some() {
                return Err(StructuralViolation::DuplicateBlockKey(block.key().clone()));
            }
        }
        Ok(Self {
            blocks: Arc::new(blocks),
            index: Arc::new(index),
            entities,
        })
    }

    /// Exact block lookup.
    pub fn block_at(&self, key: &BlockKey) -> Option<&Block> {
        self.index.get(key).map(|&i| self.blocks[i].as_ref())
    }

    /// Exact block lookup, failing with [`StructuralViolation::UnknownBlock`].
    pub fn require_block(&self, key: &BlockKey) -> Result<&Block, StructuralViolation> {
        self.block_at(key)
            .ok_or_else(|| StructuralViolation::UnknownBlock(key.clone()))
    }

    /// Ordinal position of a block in the document.
    pub fn position_of(&self, key: &BlockKey) -> Option<usize> {
        self.index.get(key).copied()
    }

    /// Document-order slice of blocks, endpoints inclusive.
    ///
    /// Fails when either key is unknown, or when `start` occurs after `end`
    /// in document order.
    pub fn blocks_in_range(
        &self,
        start: &BlockKey,
        end: &BlockKey,
    ) -> Result<&[Arc<Block>], StructuralViolation> {
        let from = self
            .position_of(start)
            .ok_or_else(|| StructuralViolation::UnknownBlock(start.clone()))?;
        let to = self
            .position_of(end)
            .ok_or_else(|| StructuralViolation::UnknownBlock(end.clone()))?;
        if from > to {
            return Err(StructuralViolation::OutOfOrderRange {
                start: start.clone(),
                end: end.clone(),
            });
        }
        Ok(&self.blocks[from..=to])
    }

    /// Structural replace: the same entity registry over a new ordered block
    /// sequence. Fails on duplicate keys; an empty sequence is re-seeded
    /// with one empty paragraph.
    pub fn with_blocks<I>(&self, blocks: I) -> Result<Self, StructuralViolation>
    where
        I: IntoIterator<Item = Arc<Block>>,
    {
        Self::build(blocks.into_iter().collect(), self.entities.clone())
    }

    /// The same block sequence over a new entity registry.
    pub fn with_entities(&self, entities: EntityMap) -> Self {
        Self {
            blocks: Arc::clone(&self.blocks),
            index: Arc::clone(&self.index),
            entities,
        }
    }

    /// Register a new entity, returning the new document and assigned key.
    pub fn create_entity(&self, entity: Entity) -> (Self, EntityKey) {
        let (entities, key) = self.entities.create(entity);
        (self.with_entities(entities), key)
    }

    /// Document-order successor of a block, `None` at the last block.
    pub fn key_after(&self, key: &BlockKey) -> Option<&BlockKey> {
        let position = self.position_of(key)?;
        self.blocks.get(position + 1).map(|b| b.key())
    }

    /// Document-order predecessor of a block, `None` at the first block.
    pub fn key_before(&self, key: &BlockKey) -> Option<&BlockKey> {
        let position = self.position_of(key)?;
        position.checked_sub(1).map(|i| self.blocks[i].key())
    }

    /// The ordered block sequence.
    pub fn blocks(&self) -> &[Arc<Block>] {
        &self.blocks
    }

    /// Iterate blocks in document order.
    pub fn iter(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter().map(|b| b.as_ref())
    }

    /// The first block (a document always has one).
    pub fn first_block(&self) -> &Block {
        self.blocks.first().expect("document is never empty").as_ref()
    }

    /// The last block (a document always has one).
    pub fn last_block(&self) -> &Block {
        self.blocks.last().expect("document is never empty").as_ref()
    }

    /// Number of blocks.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// The entity registry.
    pub fn entities(&self) -> &EntityMap {
        &self.entities
    }

    /// Concatenated plain text of all blocks, blocks joined by `\n`.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for (i, block) in self.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push_str(block.text());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockType;

    fn doc(texts: &[(&str, &str)]) -> Document {
        let blocks = texts
            .iter()
            .map(|(key, text)| Block::new(BlockKey::new(*key), BlockType::Paragraph, *text))
            .collect();
        Document::new(blocks, EntityMap::new()).unwrap()
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let blocks = vec![
            Block::new(BlockKey::new("a"), BlockType::Paragraph, "one"),
            Block::new(BlockKey::new("a"), BlockType::Paragraph, "two"),
        ];
        let err = Document::new(blocks, EntityMap::new()).unwrap_err();
        assert_eq!(err, StructuralViolation::DuplicateBlockKey(BlockKey::new("a")));
    }

    #[test]
    fn empty_document_is_seeded() {
        let d = Document::new(Vec::new(), EntityMap::new()).unwrap();
        assert_eq!(d.block_count(), 1);
        assert!(d.first_block().is_empty());
    }

    #[test]
    fn neighbor_lookups() {
        let d = doc(&[("a", "1"), ("b", "2"), ("c", "3")]);
        assert_eq!(d.key_after(&BlockKey::new("a")), Some(&BlockKey::new("b")));
        assert_eq!(d.key_after(&BlockKey::new("c")), None);
        assert_eq!(d.key_before(&BlockKey::new("a")), None);
        assert_eq!(d.key_before(&BlockKey::new("c")), Some(&BlockKey::new("b")));
    }

    #[test]
    fn blocks_in_range_is_inclusive() {
        let d = doc(&[("a", "1"), ("b", "2"), ("c", "3")]);
        let slice = d
            .blocks_in_range(&BlockKey::new("a"), &BlockKey::new("b"))
            .unwrap();
        assert_eq!(slice.len(), 2);
        assert_eq!(slice[1].key(), &BlockKey::new("b"));
    }

    #[test]
    fn blocks_in_range_rejects_reversed_endpoints() {
        let d = doc(&[("a", "1"), ("b", "2")]);
        let err = d
            .blocks_in_range(&BlockKey::new("b"), &BlockKey::new("a"))
            .unwrap_err();
        assert!(matches!(err, StructuralViolation::OutOfOrderRange { .. }));
    }

    #[test]
    fn with_blocks_shares_untouched_blocks() {
        let d = doc(&[("a", "1"), ("b", "2")]);
        let kept = Arc::clone(&d.blocks()[0]);
        let d2 = d.with_blocks(vec![kept.clone()]).unwrap();
        assert!(Arc::ptr_eq(&d2.blocks()[0], &kept));
        assert_eq!(d2.block_count(), 1);
    }

    #[test]
    fn plain_text_joins_blocks() {
        let d = doc(&[("a", "abc"), ("b", "def")]);
        assert_eq!(d.plain_text(), "abc\ndef");
    }
}
