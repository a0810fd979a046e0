//! `richtext-core-raw` - Raw serialization snapshots for `richtext-core`.
//!
//! A raw snapshot is a plain, ordered representation of a document plus its
//! entity registry — no selection, no history — suitable for storage and
//! transport. The shape is a block list plus an entity map:
//!
//! ```json
//! {
//!   "blocks": [
//!     {
//!       "key": "a1",
//!       "type": "paragraph",
//!       "text": "Hello world",
//!       "depth": 0,
//!       "inlineStyleRanges": [{ "offset": 0, "length": 5, "style": "BOLD" }],
//!       "entityRanges": [{ "offset": 6, "length": 5, "key": "1" }]
//!     }
//!   ],
//!   "entityMap": {
//!     "1": { "type": "LINK", "mutability": "MUTABLE", "data": { "url": "..." } }
//!   }
//! }
//! ```
//!
//! All offsets and lengths count characters (Unicode scalar values), the
//! same unit the core uses, so conversions are exact.
//!
//! Loading canonicalizes annotation ranges the way the core does (adjacent
//! same-style ranges coalesce). [`to_raw`] always emits canonical
//! snapshots, and `to_raw(&from_raw(&raw)?)` reproduces any canonical
//! `raw` — block order, entity-map key order, and range boundaries
//! included.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use richtext_core::{
    Block, BlockKey, BlockType, Document, Entity, EntityKey, EntityMap, EntityRange, InlineStyle,
    Mutability, StructuralViolation, StyleRange,
};

/// Errors produced when a raw snapshot cannot be turned into a document.
#[derive(Debug, Error)]
pub enum RawError {
    /// The mutability tag is not one of `IMMUTABLE`/`MUTABLE`/`SEGMENTED`.
    #[error("entity '{key}' has unknown mutability tag '{tag}'")]
    UnknownMutability {
        /// The entity-map key.
        key: String,
        /// The offending tag.
        tag: String,
    },

    /// A style or entity range points past the end of its block's text.
    #[error(
        "block '{block}' has a range beyond its text: offset {offset} + length {length} > {len}"
    )]
    RangeOutOfBounds {
        /// The block key.
        block: String,
        /// Range start offset in characters.
        offset: usize,
        /// Range length in characters.
        length: usize,
        /// The block's text length in characters.
        len: usize,
    },

    /// The block list violates a document invariant (duplicate keys).
    #[error(transparent)]
    Structure(#[from] StructuralViolation),
}

/// One inline style range in offset/length form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawStyleRange {
    /// Start offset in characters.
    pub offset: usize,
    /// Length in characters.
    pub length: usize,
    /// The style tag (e.g. `BOLD`).
    pub style: String,
}

/// One entity range in offset/length form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEntityRange {
    /// Start offset in characters.
    pub offset: usize,
    /// Length in characters.
    pub length: usize,
    /// The referenced entity-map key.
    pub key: String,
}

/// One block of a raw snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBlock {
    /// The block's stable key.
    pub key: String,
    /// The block type tag (e.g. `paragraph`).
    #[serde(rename = "type")]
    pub block_type: String,
    /// The block's raw text.
    pub text: String,
    /// List nesting depth.
    #[serde(default)]
    pub depth: usize,
    /// Inline style ranges.
    #[serde(default)]
    pub inline_style_ranges: Vec<RawStyleRange>,
    /// Entity ranges.
    #[serde(default)]
    pub entity_ranges: Vec<RawEntityRange>,
}

/// One entity of a raw snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEntity {
    /// The entity type tag (e.g. `LINK`).
    #[serde(rename = "type")]
    pub entity_type: String,
    /// The mutability tag (`IMMUTABLE`/`MUTABLE`/`SEGMENTED`).
    pub mutability: String,
    /// Ordered opaque data pairs.
    #[serde(default)]
    pub data: IndexMap<String, String>,
}

/// A full raw snapshot: ordered blocks plus the entity map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDocument {
    /// Blocks in document order.
    pub blocks: Vec<RawBlock>,
    /// Entities keyed by their registry key, in registration order.
    pub entity_map: IndexMap<String, RawEntity>,
}

/// Serialize a document into a raw snapshot.
pub fn to_raw(document: &Document) -> RawDocument {
    let blocks = document
        .iter()
        .map(|block| RawBlock {
            key: block.key().as_str().to_string(),
            block_type: block.block_type().as_tag().to_string(),
            text: block.text().to_string(),
            depth: block.depth(),
            inline_style_ranges: block
                .style_ranges()
                .iter()
                .map(|r| RawStyleRange {
                    offset: r.start,
                    length: r.end - r.start,
                    style: r.style.as_tag().to_string(),
                })
                .collect(),
            entity_ranges: block
                .entity_ranges()
                .iter()
                .map(|r| RawEntityRange {
                    offset: r.start,
                    length: r.end - r.start,
                    key: r.key.as_str().to_string(),
                })
                .collect(),
        })
        .collect();

    let entity_map = document
        .entities()
        .iter()
        .map(|(key, entity)| {
            (
                key.as_str().to_string(),
                RawEntity {
                    entity_type: entity.entity_type().to_string(),
                    mutability: entity.mutability().as_tag().to_string(),
                    data: entity.data().clone(),
                },
            )
        })
        .collect();

    RawDocument { blocks, entity_map }
}

/// Deserialize a raw snapshot into a document.
pub fn from_raw(raw: &RawDocument) -> Result<Document, RawError> {
    let mut entities = EntityMap::new();
    for (key, raw_entity) in &raw.entity_map {
        let mutability = Mutability::from_tag(&raw_entity.mutability).ok_or_else(|| {
            RawError::UnknownMutability {
                key: key.clone(),
                tag: raw_entity.mutability.clone(),
            }
        })?;
        let mut entity = Entity::new(raw_entity.entity_type.clone(), mutability);
        for (k, v) in &raw_entity.data {
            entity = entity.with_data(k.clone(), v.clone());
        }
        entities = entities.insert(EntityKey::new(key.clone()), entity);
    }

    let mut blocks = Vec::with_capacity(raw.blocks.len());
    for raw_block in &raw.blocks {
        let len = raw_block.text.chars().count();
        for (offset, length) in raw_block
            .inline_style_ranges
            .iter()
            .map(|r| (r.offset, r.length))
            .chain(raw_block.entity_ranges.iter().map(|r| (r.offset, r.length)))
        {
            if offset + length > len {
                return Err(RawError::RangeOutOfBounds {
                    block: raw_block.key.clone(),
                    offset,
                    length,
                    len,
                });
            }
        }

        let block = Block::new(
            BlockKey::new(raw_block.key.clone()),
            BlockType::from_tag(&raw_block.block_type),
            raw_block.text.clone(),
        )
        .with_depth(raw_block.depth)
        .with_style_ranges(
            raw_block
                .inline_style_ranges
                .iter()
                .map(|r| {
                    StyleRange::new(
                        InlineStyle::from_tag(&r.style),
                        r.offset,
                        r.offset + r.length,
                    )
                })
                .collect(),
        )
        .with_entity_ranges(
            raw_block
                .entity_ranges
                .iter()
                .map(|r| EntityRange::new(EntityKey::new(r.key.clone()), r.offset, r.offset + r.length))
                .collect(),
        );
        blocks.push(block);
    }

    Ok(Document::new(blocks, entities)?)
}
