//! Editor state: the immutable snapshot that is the unit of undo/redo.
//!
//! An [`EditorState`] pairs the current document and selection with the
//! selection in effect before the most recent change, bounded undo/redo
//! stacks of prior (document, selection) pairs, and the last change type.
//! Every accepted command produces a new state; the previous value survives
//! only through the undo stack. Documents share their blocks structurally,
//! so a history record costs a few reference bumps, not a deep copy.

use crate::document::Document;
use crate::selection::Selection;

/// Default cap on the undo stack depth.
pub const DEFAULT_MAX_UNDO: usize = 100;

/// What kind of change produced the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeType {
    /// Characters were inserted.
    InsertText,
    /// A selected range (or a backward-merge target) was removed.
    RemoveRange,
    /// A block was split at the caret.
    SplitBlock,
    /// Block structure tags changed.
    ChangeBlockType,
    /// List nesting depth changed.
    AdjustDepth,
    /// Inline style coverage changed.
    ChangeInlineStyle,
    /// Entity coverage or entity data changed.
    ApplyEntity,
    /// Only the selection moved.
    SelectionChange,
    /// A prior state was restored from the undo stack.
    Undo,
    /// An undone state was restored from the redo stack.
    Redo,
}

#[derive(Debug, Clone)]
struct HistoryRecord {
    document: Document,
    selection: Selection,
}

/// Immutable snapshot of {document, selection, history, last change}.
#[derive(Debug, Clone)]
pub struct EditorState {
    document: Document,
    selection: Selection,
    selection_before: Selection,
    undo_stack: Vec<HistoryRecord>,
    redo_stack: Vec<HistoryRecord>,
    last_change: Option<ChangeType>,
    max_undo: usize,
}

impl EditorState {
    /// Wrap a document with a caret at the start of its first block and
    /// empty history.
    pub fn new(document: Document) -> Self {
        let selection = Selection::collapsed(document.first_block().key().clone(), 0);
        Self {
            document,
            selection_before: selection.clone(),
            selection,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            last_change: None,
            max_undo: DEFAULT_MAX_UNDO,
        }
    }

    /// A state over an empty document.
    pub fn empty() -> Self {
        Self::new(Document::empty())
    }

    /// Replace the undo stack cap (existing entries are truncated from the
    /// oldest end if needed).
    pub fn with_max_undo(mut self, max_undo: usize) -> Self {
        self.max_undo = max_undo;
        let excess = self.undo_stack.len().saturating_sub(max_undo);
        if excess > 0 {
            self.undo_stack.drain(..excess);
        }
        self
    }

    /// The current document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The current selection.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// The selection in effect immediately before the most recent change.
    pub fn selection_before(&self) -> &Selection {
        &self.selection_before
    }

    /// What the most recent change was, `None` for a freshly created state.
    pub fn last_change(&self) -> Option<ChangeType> {
        self.last_change
    }

    /// Whether an undo target exists.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Whether a redo target exists.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Undo stack depth.
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    /// Redo stack depth.
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// The undo stack cap.
    pub fn max_undo(&self) -> usize {
        self.max_undo
    }

    /// Accept an edit: the prior (document, selection) pair is pushed onto
    /// the undo stack (oldest entry dropped past the cap), the redo stack is
    /// cleared, and `selection_before` records the outgoing selection.
    pub fn push(&self, document: Document, selection: Selection, change: ChangeType) -> Self {
        let mut undo_stack = self.undo_stack.clone();
        undo_stack.push(HistoryRecord {
            document: self.document.clone(),
            selection: self.selection.clone(),
        });
        let excess = undo_stack.len().saturating_sub(self.max_undo);
        if excess > 0 {
            undo_stack.drain(..excess);
        }
        Self {
            document,
            selection,
            selection_before: self.selection.clone(),
            undo_stack,
            redo_stack: Vec::new(),
            last_change: Some(change),
            max_undo: self.max_undo,
        }
    }

    /// Accept a selection-only transition: no history entry is created.
    pub fn with_selection(&self, selection: Selection) -> Self {
        Self {
            document: self.document.clone(),
            selection_before: self.selection.clone(),
            selection,
            undo_stack: self.undo_stack.clone(),
            redo_stack: self.redo_stack.clone(),
            last_change: Some(ChangeType::SelectionChange),
            max_undo: self.max_undo,
        }
    }

    /// Restore the most recent undo record, moving the current pair onto the
    /// redo stack. `None` when there is nothing to undo.
    pub fn undo(&self) -> Option<Self> {
        let mut undo_stack = self.undo_stack.clone();
        let record = undo_stack.pop()?;
        let mut redo_stack = self.redo_stack.clone();
        redo_stack.push(HistoryRecord {
            document: self.document.clone(),
            selection: self.selection.clone(),
        });
        Some(Self {
            document: record.document,
            selection: record.selection,
            selection_before: self.selection.clone(),
            undo_stack,
            redo_stack,
            last_change: Some(ChangeType::Undo),
            max_undo: self.max_undo,
        })
    }

    /// Restore the most recent redo record, moving the current pair back
    /// onto the undo stack. `None` when there is nothing to redo.
    pub fn redo(&self) -> Option<Self> {
        let mut redo_stack = self.redo_stack.clone();
        let record = redo_stack.pop()?;
        let mut undo_stack = self.undo_stack.clone();
        undo_stack.push(HistoryRecord {
            document: self.document.clone(),
            selection: self.selection.clone(),
        });
        Some(Self {
            document: record.document,
            selection: record.selection,
            selection_before: self.selection.clone(),
            undo_stack,
            redo_stack,
            last_change: Some(ChangeType::Redo),
            max_undo: self.max_undo,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{Block, BlockKey, BlockType};
    use crate::entity::EntityMap;

    fn doc(text: &str) -> Document {
        Document::new(
            vec![Block::new(BlockKey::new("a"), BlockType::Paragraph, text)],
            EntityMap::new(),
        )
        .unwrap()
    }

    #[test]
    fn push_records_history_and_clears_redo() {
        let state = EditorState::new(doc("one"));
        let caret = Selection::collapsed(BlockKey::new("a"), 0);

        let state2 = state.push(doc("two"), caret.clone(), ChangeType::InsertText);
        assert_eq!(state2.undo_depth(), 1);
        assert_eq!(state2.last_change(), Some(ChangeType::InsertText));

        let undone = state2.undo().unwrap();
        assert_eq!(undone.document().first_block().text(), "one");
        assert_eq!(undone.redo_depth(), 1);

        // A fresh edit after undo clears the redo stack.
        let state3 = undone.push(doc("three"), caret, ChangeType::InsertText);
        assert_eq!(state3.redo_depth(), 0);
    }

    #[test]
    fn undo_then_redo_round_trips() {
        let state = EditorState::new(doc("one"));
        let caret = Selection::collapsed(BlockKey::new("a"), 3);
        let state2 = state.push(doc("two"), caret, ChangeType::InsertText);

        let undone = state2.undo().unwrap();
        let redone = undone.redo().unwrap();
        assert_eq!(redone.document(), state2.document());
        assert_eq!(redone.selection(), state2.selection());
        assert_eq!(redone.last_change(), Some(ChangeType::Redo));
    }

    #[test]
    fn undo_stack_is_bounded() {
        let mut state = EditorState::new(doc("0")).with_max_undo(3);
        let caret = Selection::collapsed(BlockKey::new("a"), 0);
        for i in 1..=5 {
            state = state.push(doc(&i.to_string()), caret.clone(), ChangeType::InsertText);
        }
        assert_eq!(state.undo_depth(), 3);

        // The oldest reachable state is "2", not "0".
        let mut s = state;
        while let Some(prev) = s.undo() {
            s = prev;
        }
        assert_eq!(s.document().first_block().text(), "2");
    }

    #[test]
    fn selection_only_transition_leaves_history_alone() {
        let state = EditorState::new(doc("abc"));
        let moved = state.with_selection(Selection::collapsed(BlockKey::new("a"), 2));
        assert_eq!(moved.undo_depth(), 0);
        assert_eq!(moved.last_change(), Some(ChangeType::SelectionChange));
        assert_eq!(moved.selection_before(), state.selection());
        assert!(moved.undo().is_none());
    }

    #[test]
    fn selection_before_tracks_outgoing_selection() {
        let state = EditorState::new(doc("abc"));
        let sel = Selection::collapsed(BlockKey::new("a"), 1);
        let state2 = state.push(doc("abcd"), sel.clone(), ChangeType::InsertText);
        assert_eq!(state2.selection_before(), state.selection());
        assert_eq!(state2.selection(), &sel);
    }
}
