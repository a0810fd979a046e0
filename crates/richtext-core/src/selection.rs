//! The selection: an immutable description of the active caret or range.
//!
//! A selection is keyed to block identities: an anchor (where the selection
//! started) and a focus (where it currently ends), each a block key plus a
//! character offset. The `backward` flag records that the focus precedes the
//! anchor in document order, so start/end accessors can be derived without
//! consulting the document.

use std::fmt;

use crate::block::BlockKey;
use crate::document::Document;

/// A selection whose offsets or keys do not fit the paired document.
///
/// Rejected when the selection is validated, before it can reach the edit
/// pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    /// A referenced block key does not exist in the document.
    UnknownBlock(BlockKey),
    /// An offset lies outside `[0, block text length]`.
    OffsetOutOfBounds {
        /// The block the offset points into.
        key: BlockKey,
        /// The offending offset.
        offset: usize,
        /// The block's text length in characters.
        len: usize,
    },
}

impl fmt::Display for SelectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionError::UnknownBlock(key) => {
                write!(f, "selection references unknown block: {}", key)
            }
            SelectionError::OffsetOutOfBounds { key, offset, len } => {
                write!(
                    f,
                    "selection offset {} out of bounds for block {} (len {})",
                    offset, key, len
                )
            }
        }
    }
}

impl std::error::Error for SelectionError {}

/// Partial-field update for [`Selection::merge`].
#[derive(Debug, Clone, Default)]
pub struct SelectionUpdate {
    /// New anchor block key.
    pub anchor_key: Option<BlockKey>,
    /// New anchor offset.
    pub anchor_offset: Option<usize>,
    /// New focus block key.
    pub focus_key: Option<BlockKey>,
    /// New focus offset.
    pub focus_offset: Option<usize>,
    /// New backward flag.
    pub backward: Option<bool>,
    /// New has-focus flag.
    pub has_focus: Option<bool>,
}

/// The active caret or range, keyed to block identities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    anchor_key: BlockKey,
    anchor_offset: usize,
    focus_key: BlockKey,
    focus_offset: usize,
    backward: bool,
    has_focus: bool,
}

impl Selection {
    /// A range selection. `backward` must be true iff the focus precedes the
    /// anchor in document order (use [`Selection::spanning`] to derive it).
    pub fn new(
        anchor_key: BlockKey,
        anchor_offset: usize,
        focus_key: BlockKey,
        focus_offset: usize,
        backward: bool,
    ) -> Self {
        Self {
            anchor_key,
            anchor_offset,
            focus_key,
            focus_offset,
            backward,
            has_focus: true,
        }
    }

    /// A collapsed selection (a caret).
    pub fn collapsed(key: BlockKey, offset: usize) -> Self {
        Self {
            anchor_key: key.clone(),
            anchor_offset: offset,
            focus_key: key,
            focus_offset: offset,
            backward: false,
            has_focus: true,
        }
    }

    /// A range selection with the backward flag computed from document
    /// order, validated against `document`.
    pub fn spanning(
        document: &Document,
        anchor_key: BlockKey,
        anchor_offset: usize,
        focus_key: BlockKey,
        focus_offset: usize,
    ) -> Result<Self, SelectionError> {
        let anchor_position = document
            .position_of(&anchor_key)
            .ok_or_else(|| SelectionError::UnknownBlock(anchor_key.clone()))?;
        let focus_position = document
            .position_of(&focus_key)
            .ok_or_else(|| SelectionError::UnknownBlock(focus_key.clone()))?;
        let backward = (focus_position, focus_offset) < (anchor_position, anchor_offset);
        let selection = Self::new(anchor_key, anchor_offset, focus_key, focus_offset, backward);
        selection.validate(document)?;
        Ok(selection)
    }

    /// The anchor block key.
    pub fn anchor_key(&self) -> &BlockKey {
        &self.anchor_key
    }

    /// The anchor character offset.
    pub fn anchor_offset(&self) -> usize {
        self.anchor_offset
    }

    /// The focus block key.
    pub fn focus_key(&self) -> &BlockKey {
        &self.focus_key
    }

    /// The focus character offset.
    pub fn focus_offset(&self) -> usize {
        self.focus_offset
    }

    /// Whether the focus precedes the anchor in document order.
    pub fn is_backward(&self) -> bool {
        self.backward
    }

    /// Whether the host editor currently has focus.
    pub fn has_focus(&self) -> bool {
        self.has_focus
    }

    /// Whether anchor and focus coincide (a caret).
    pub fn is_collapsed(&self) -> bool {
        self.anchor_key == self.focus_key && self.anchor_offset == self.focus_offset
    }

    /// Key of whichever end comes first in document order.
    pub fn start_key(&self) -> &BlockKey {
        if self.backward {
            &self.focus_key
        } else {
            &self.anchor_key
        }
    }

    /// Offset of whichever end comes first in document order.
    pub fn start_offset(&self) -> usize {
        if self.backward {
            self.focus_offset
        } else {
            self.anchor_offset
        }
    }

    /// Key of whichever end comes last in document order.
    pub fn end_key(&self) -> &BlockKey {
        if self.backward {
            &self.anchor_key
        } else {
            &self.focus_key
        }
    }

    /// Offset of whichever end comes last in document order.
    pub fn end_offset(&self) -> usize {
        if self.backward {
            self.anchor_offset
        } else {
            self.focus_offset
        }
    }

    /// Produce a new selection with the given fields replaced.
    pub fn merge(&self, update: SelectionUpdate) -> Self {
        Self {
            anchor_key: update.anchor_key.unwrap_or_else(|| self.anchor_key.clone()),
            anchor_offset: update.anchor_offset.unwrap_or(self.anchor_offset),
            focus_key: update.focus_key.unwrap_or_else(|| self.focus_key.clone()),
            focus_offset: update.focus_offset.unwrap_or(self.focus_offset),
            backward: update.backward.unwrap_or(self.backward),
            has_focus: update.has_focus.unwrap_or(self.has_focus),
        }
    }

    /// The same selection with the has-focus flag replaced.
    pub fn with_focus(&self, has_focus: bool) -> Self {
        let mut selection = self.clone();
        selection.has_focus = has_focus;
        selection
    }

    /// Check this selection against a document: both keys must exist and
    /// both offsets must lie within `[0, block text length]`.
    pub fn validate(&self, document: &Document) -> Result<(), SelectionError> {
        for (key, offset) in [
            (&self.anchor_key, self.anchor_offset),
            (&self.focus_key, self.focus_offset),
        ] {
            let block = document
                .block_at(key)
                .ok_or_else(|| SelectionError::UnknownBlock(key.clone()))?;
            let len = block.len();
            if offset > len {
                return Err(SelectionError::OffsetOutOfBounds {
                    key: key.clone(),
                    offset,
                    len,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{Block, BlockType};
    use crate::entity::EntityMap;

    fn doc() -> Document {
        Document::new(
            vec![
                Block::new(BlockKey::new("a"), BlockType::Paragraph, "abc"),
                Block::new(BlockKey::new("b"), BlockType::Paragraph, "defgh"),
            ],
            EntityMap::new(),
        )
        .unwrap()
    }

    #[test]
    fn collapsed_selection_is_a_caret() {
        let s = Selection::collapsed(BlockKey::new("a"), 2);
        assert!(s.is_collapsed());
        assert_eq!(s.start_key(), &BlockKey::new("a"));
        assert_eq!(s.end_offset(), 2);
    }

    #[test]
    fn backward_flag_flips_start_and_end() {
        let s = Selection::new(BlockKey::new("b"), 4, BlockKey::new("a"), 1, true);
        assert_eq!(s.start_key(), &BlockKey::new("a"));
        assert_eq!(s.start_offset(), 1);
        assert_eq!(s.end_key(), &BlockKey::new("b"));
        assert_eq!(s.end_offset(), 4);
    }

    #[test]
    fn spanning_derives_backward_from_document_order() {
        let d = doc();
        let s = Selection::spanning(&d, BlockKey::new("b"), 2, BlockKey::new("a"), 1).unwrap();
        assert!(s.is_backward());
        assert_eq!(s.start_key(), &BlockKey::new("a"));

        let s = Selection::spanning(&d, BlockKey::new("a"), 3, BlockKey::new("a"), 1).unwrap();
        assert!(s.is_backward());
        assert_eq!(s.start_offset(), 1);
    }

    #[test]
    fn validate_rejects_out_of_bounds_offsets() {
        let d = doc();
        let s = Selection::collapsed(BlockKey::new("a"), 4);
        assert!(matches!(
            s.validate(&d),
            Err(SelectionError::OffsetOutOfBounds { .. })
        ));

        // Offset == length is the end-of-block caret and is valid.
        let s = Selection::collapsed(BlockKey::new("a"), 3);
        assert!(s.validate(&d).is_ok());
    }

    #[test]
    fn validate_rejects_unknown_keys() {
        let d = doc();
        let s = Selection::collapsed(BlockKey::new("zz"), 0);
        assert_eq!(
            s.validate(&d),
            Err(SelectionError::UnknownBlock(BlockKey::new("zz")))
        );
    }

    #[test]
    fn merge_replaces_only_given_fields() {
        let s = Selection::collapsed(BlockKey::new("a"), 2);
        let merged = s.merge(SelectionUpdate {
            focus_key: Some(BlockKey::new("b")),
            focus_offset: Some(1),
            ..Default::default()
        });
        assert_eq!(merged.anchor_key(), &BlockKey::new("a"));
        assert_eq!(merged.anchor_offset(), 2);
        assert_eq!(merged.focus_key(), &BlockKey::new("b"));
        assert_eq!(merged.focus_offset(), 1);
    }
}
