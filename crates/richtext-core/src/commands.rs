//! The edit-command pipeline.
//!
//! # Overview
//!
//! This module is the primary entry point for mutating editor state. Every
//! user gesture arrives as a [`Command`]; [`CommandPipeline::apply`] is a
//! pure function from an [`EditorState`] and a command to either a new state
//! ([`CommandOutcome::Handled`]) or [`CommandOutcome::Unhandled`], which
//! tells the host to fall back to its default behavior. A rejected or
//! unhandled command leaves the document and selection exactly as they were;
//! no partial edits are ever observable.
//!
//! Expected edge cases (empty selection, deletion at the document start,
//! nothing to undo) are `Unhandled`, never errors. [`CommandError`] is
//! reserved for invariant breaches: a stale block key fed by a plugin, or a
//! selection whose offsets do not fit the document.
//!
//! # Example
//!
//! ```rust
//! use richtext_core::{Command, CommandOutcome, CommandPipeline, EditCommand, EditorState};
//!
//! let pipeline = CommandPipeline::default();
//! let state = EditorState::empty();
//!
//! let outcome = pipeline
//!     .apply(&state, &Command::Edit(EditCommand::InsertText { text: "Hello".into() }))
//!     .unwrap();
//! let state = match outcome {
//!     CommandOutcome::Handled(next) => next,
//!     CommandOutcome::Unhandled => unreachable!("insertion into an empty document"),
//! };
//! assert_eq!(state.document().first_block().text(), "Hello");
//! ```

use std::fmt;
use std::sync::Arc;

use unicode_segmentation::UnicodeSegmentation;

use crate::block::{Block, BlockKey, BlockType, InlineStyle, byte_offset};
use crate::document::{Document, StructuralViolation};
use crate::entity::{Entity, EntityKey};
use crate::selection::{Selection, SelectionError};
use crate::state::{ChangeType, EditorState};

/// Default cap on list nesting depth.
pub const DEFAULT_MAX_INDENT_DEPTH: usize = 4;

/// Text editing commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditCommand {
    /// Insert text at the caret, replacing the selection first when it is
    /// not collapsed. Embedded `\n` characters split blocks.
    InsertText {
        /// Text to insert.
        text: String,
    },
    /// Delete the selected range.
    DeleteRange,
    /// Backspace: delete the selection if any, otherwise the grapheme
    /// before the caret, merging blocks at a block boundary.
    DeleteBackward,
    /// Split the caret block in two at the caret.
    SplitBlock,
    /// Restore the previous (document, selection) pair.
    Undo,
    /// Restore the next (document, selection) pair after an undo.
    Redo,
}

/// Block structure commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockCommand {
    /// Set the type of every block touched by the selection.
    SetType {
        /// The target block type.
        block_type: BlockType,
    },
    /// Like `SetType`, but reverts to [`BlockType::Paragraph`] when the
    /// selection's start block already has the target type.
    ToggleType {
        /// The toggled block type.
        block_type: BlockType,
    },
    /// Increase list nesting depth of selected list items.
    Indent,
    /// Decrease list nesting depth of selected list items.
    Outdent,
}

/// Inline style commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StyleCommand {
    /// Apply (or remove, with `enabled = false`) a style over the selection.
    SetInlineStyle {
        /// The style to change.
        style: InlineStyle,
        /// Apply when true, remove when false.
        enabled: bool,
    },
    /// Remove the style when the whole selection already carries it, apply
    /// it otherwise.
    ToggleInlineStyle {
        /// The toggled style.
        style: InlineStyle,
    },
}

/// Selection commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionCommand {
    /// Replace the active selection (validated against the document).
    Set {
        /// The new selection.
        selection: Selection,
    },
}

/// Unified command enum: the full surface consumed from the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Text editing commands.
    Edit(EditCommand),
    /// Block structure commands.
    Block(BlockCommand),
    /// Inline style commands.
    Style(StyleCommand),
    /// Selection commands.
    Selection(SelectionCommand),
    /// A named command for extensions; the default pipeline never handles
    /// these.
    Custom {
        /// The command name extensions match on.
        name: String,
        /// An optional opaque argument.
        argument: Option<String>,
    },
}

impl Command {
    /// The wire name of this command (what extension interceptors match
    /// on).
    pub fn name(&self) -> &str {
        match self {
            Command::Edit(EditCommand::InsertText { .. }) => "insert-text",
            Command::Edit(EditCommand::DeleteRange) => "delete-range",
            Command::Edit(EditCommand::DeleteBackward) => "delete-backward",
            Command::Edit(EditCommand::SplitBlock) => "split-block",
            Command::Edit(EditCommand::Undo) => "undo",
            Command::Edit(EditCommand::Redo) => "redo",
            Command::Block(BlockCommand::SetType { .. })
            | Command::Block(BlockCommand::ToggleType { .. }) => "change-block-type",
            Command::Block(BlockCommand::Indent) => "indent",
            Command::Block(BlockCommand::Outdent) => "outdent",
            Command::Style(StyleCommand::SetInlineStyle { .. }) => "set-inline-style",
            Command::Style(StyleCommand::ToggleInlineStyle { .. }) => "toggle-inline-style",
            Command::Selection(SelectionCommand::Set { .. }) => "set-selection",
            Command::Custom { name, .. } => name,
        }
    }
}

/// Result of running a command through the pipeline.
#[derive(Debug, Clone)]
pub enum CommandOutcome {
    /// The command was handled and produced a new state.
    Handled(EditorState),
    /// No state change; the host's fallback behavior may run.
    Unhandled,
}

impl CommandOutcome {
    /// Whether the command produced a new state.
    pub fn is_handled(&self) -> bool {
        matches!(self, CommandOutcome::Handled(_))
    }

    /// The new state, if the command was handled.
    pub fn into_state(self) -> Option<EditorState> {
        match self {
            CommandOutcome::Handled(state) => Some(state),
            CommandOutcome::Unhandled => None,
        }
    }
}

/// Command error type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// A structural invariant was breached (stale or duplicate key).
    Structural(StructuralViolation),
    /// A selection failed validation against the document.
    Selection(SelectionError),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Structural(violation) => violation.fmt(f),
            CommandError::Selection(error) => error.fmt(f),
        }
    }
}

impl std::error::Error for CommandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CommandError::Structural(violation) => Some(violation),
            CommandError::Selection(error) => Some(error),
        }
    }
}

impl From<StructuralViolation> for CommandError {
    fn from(violation: StructuralViolation) -> Self {
        CommandError::Structural(violation)
    }
}

impl From<SelectionError> for CommandError {
    fn from(error: SelectionError) -> Self {
        CommandError::Selection(error)
    }
}

/// Pipeline settings.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Maximum list nesting depth reachable through `Indent`.
    pub max_indent_depth: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_indent_depth: DEFAULT_MAX_INDENT_DEPTH,
        }
    }
}

/// The pure transformation from (state, command) to a new state.
#[derive(Debug, Clone, Default)]
pub struct CommandPipeline {
    config: PipelineConfig,
}

impl CommandPipeline {
    /// Create a pipeline with explicit settings.
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// The pipeline settings.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Apply one command to a state.
    pub fn apply(
        &self,
        state: &EditorState,
        command: &Command,
    ) -> Result<CommandOutcome, CommandError> {
        match command {
            Command::Edit(EditCommand::InsertText { text }) => insert_text(state, text),
            Command::Edit(EditCommand::DeleteRange) => delete_range(state),
            Command::Edit(EditCommand::DeleteBackward) => delete_backward(state),
            Command::Edit(EditCommand::SplitBlock) => split_block(state),
            Command::Edit(EditCommand::Undo) => Ok(match state.undo() {
                Some(next) => CommandOutcome::Handled(next),
                None => CommandOutcome::Unhandled,
            }),
            Command::Edit(EditCommand::Redo) => Ok(match state.redo() {
                Some(next) => CommandOutcome::Handled(next),
                None => CommandOutcome::Unhandled,
            }),
            Command::Block(BlockCommand::SetType { block_type }) => {
                change_block_type(state, block_type, false)
            }
            Command::Block(BlockCommand::ToggleType { block_type }) => {
                change_block_type(state, block_type, true)
            }
            Command::Block(BlockCommand::Indent) => {
                adjust_depth(state, 1, self.config.max_indent_depth)
            }
            Command::Block(BlockCommand::Outdent) => {
                adjust_depth(state, -1, self.config.max_indent_depth)
            }
            Command::Style(StyleCommand::SetInlineStyle { style, enabled }) => {
                set_inline_style(state, style, *enabled)
            }
            Command::Style(StyleCommand::ToggleInlineStyle { style }) => {
                toggle_inline_style(state, style)
            }
            Command::Selection(SelectionCommand::Set { selection }) => {
                set_selection(state, selection)
            }
            Command::Custom { .. } => Ok(CommandOutcome::Unhandled),
        }
    }
}

/// The active selection resolved to block positions and normalized offsets.
struct ResolvedRange {
    start_index: usize,
    start_offset: usize,
    end_index: usize,
    end_offset: usize,
}

fn resolve_range(document: &Document, selection: &Selection) -> Result<ResolvedRange, CommandError> {
    let start_key = selection.start_key();
    let end_key = selection.end_key();
    let start_index = document
        .position_of(start_key)
        .ok_or_else(|| StructuralViolation::UnknownBlock(start_key.clone()))?;
    let end_index = document
        .position_of(end_key)
        .ok_or_else(|| StructuralViolation::UnknownBlock(end_key.clone()))?;
    if start_index > end_index {
        return Err(StructuralViolation::OutOfOrderRange {
            start: start_key.clone(),
            end: end_key.clone(),
        }
        .into());
    }

    let mut start_offset = selection.start_offset();
    let mut end_offset = selection.end_offset();
    if start_index == end_index && start_offset > end_offset {
        // A stale backward flag cannot corrupt an in-block range.
        std::mem::swap(&mut start_offset, &mut end_offset);
    }

    for (index, offset) in [(start_index, start_offset), (end_index, end_offset)] {
        let block = document.blocks()[index].as_ref();
        if offset > block.len() {
            return Err(SelectionError::OffsetOutOfBounds {
                key: block.key().clone(),
                offset,
                len: block.len(),
            }
            .into());
        }
    }

    Ok(ResolvedRange {
        start_index,
        start_offset,
        end_index,
        end_offset,
    })
}

/// Per-block `(block index, segment start, segment end)` slices of a
/// resolved range.
fn block_segments(document: &Document, range: &ResolvedRange) -> Vec<(usize, usize, usize)> {
    let mut segments = Vec::with_capacity(range.end_index - range.start_index + 1);
    for index in range.start_index..=range.end_index {
        let block = document.blocks()[index].as_ref();
        let seg_start = if index == range.start_index {
            range.start_offset
        } else {
            0
        };
        let seg_end = if index == range.end_index {
            range.end_offset
        } else {
            block.len()
        };
        segments.push((index, seg_start, seg_end));
    }
    segments
}

/// Replace one block with zero or more blocks, preserving document order.
fn splice_block(
    document: &Document,
    index: usize,
    replacements: Vec<Arc<Block>>,
) -> Result<Document, CommandError> {
    let mut blocks: Vec<Arc<Block>> = Vec::with_capacity(document.block_count() + replacements.len());
    blocks.extend_from_slice(&document.blocks()[..index]);
    blocks.extend(replacements);
    blocks.extend_from_slice(&document.blocks()[index + 1..]);
    Ok(document.with_blocks(blocks)?)
}

/// Remove the selected range from the document, returning the new document
/// and collapsed selection, or `None` when the selection is collapsed.
///
/// This is the block-map surgery shared by `delete-range`,
/// `delete-backward`, `insert-text` and `split-block`.
fn remove_selected_range(
    document: &Document,
    selection: &Selection,
) -> Result<Option<(Document, Selection)>, CommandError> {
    if selection.is_collapsed() {
        return Ok(None);
    }
    let range = resolve_range(document, selection)?;
    let blocks = document.blocks();
    let start_block = blocks[range.start_index].as_ref();
    let end_block = blocks[range.end_index].as_ref();

    if range.start_index == range.end_index {
        if range.start_offset == range.end_offset {
            return Ok(None);
        }
        if range.start_offset == 0 && range.end_offset == end_block.len() && !end_block.is_empty() {
            // The whole block is consumed outright.
            let focus_key = document
                .key_after(end_block.key())
                .cloned();
            let new_document = splice_block(document, range.start_index, Vec::new())?;
            let focus_key =
                focus_key.unwrap_or_else(|| new_document.last_block().key().clone());
            return Ok(Some((new_document, Selection::collapsed(focus_key, 0))));
        }
        // Strip the range inside the block; the block keeps its key and
        // type, and the caret rests at the join point.
        let stripped = start_block.remove_range(range.start_offset, range.end_offset);
        let caret = Selection::collapsed(stripped.key().clone(), range.start_offset);
        let new_document = splice_block(document, range.start_index, vec![Arc::new(stripped)])?;
        return Ok(Some((new_document, caret)));
    }

    // The merge path runs when the start block is empty or the end block is
    // not fully consumed; otherwise every spanned block is removed outright.
    let merge = start_block.is_empty() || range.end_offset < end_block.len();

    let mut new_blocks: Vec<Arc<Block>> = Vec::with_capacity(blocks.len());
    new_blocks.extend_from_slice(&blocks[..range.start_index]);

    let mut focus_key: Option<BlockKey> = None;
    if merge {
        if range.start_offset > 0 {
            // The unselected head of the start block survives.
            new_blocks.push(Arc::new(start_block.head_to(range.start_offset)));
        }
        if range.end_offset < end_block.len() {
            // The unselected tail of the end block survives under its
            // original key and becomes the merge anchor.
            let tail = end_block.tail_from(range.end_offset);
            focus_key = Some(tail.key().clone());
            new_blocks.push(Arc::new(tail));
        }
    }
    if focus_key.is_none() {
        // Fall back to the document-order successor of the end block,
        // computed against the pre-deletion document.
        focus_key = document.key_after(end_block.key()).cloned();
    }
    new_blocks.extend_from_slice(&blocks[range.end_index + 1..]);

    let new_document = document.with_blocks(new_blocks)?;
    let focus_key = focus_key.unwrap_or_else(|| new_document.last_block().key().clone());
    Ok(Some((new_document, Selection::collapsed(focus_key, 0))))
}

/// Delete the selected range. Collapsed selections are `Unhandled`.
pub fn delete_range(state: &EditorState) -> Result<CommandOutcome, CommandError> {
    match remove_selected_range(state.document(), state.selection())? {
        Some((document, selection)) => Ok(CommandOutcome::Handled(state.push(
            document,
            selection,
            ChangeType::RemoveRange,
        ))),
        None => Ok(CommandOutcome::Unhandled),
    }
}

/// Backspace. With a range selection this is `delete-range`; with a caret it
/// removes the previous grapheme cluster, or merges with the previous block
/// at a block boundary. At the very start of the document it is a no-op
/// reported as `Unhandled`.
pub fn delete_backward(state: &EditorState) -> Result<CommandOutcome, CommandError> {
    let selection = state.selection();
    if !selection.is_collapsed() {
        return delete_range(state);
    }

    let document = state.document();
    let key = selection.anchor_key().clone();
    let offset = selection.anchor_offset();
    let block = document.require_block(&key)?;
    let index = document
        .position_of(&key)
        .expect("require_block resolved the key");

    if offset > 0 {
        if offset > block.len() {
            return Err(SelectionError::OffsetOutOfBounds {
                key,
                offset,
                len: block.len(),
            }
            .into());
        }
        // Remove the grapheme cluster ending at the caret.
        let upto = byte_offset(block.text(), offset);
        let grapheme_chars = block.text()[..upto]
            .graphemes(true)
            .next_back()
            .map(|g| g.chars().count())
            .unwrap_or(1);
        let start = offset - grapheme_chars;
        let stripped = block.remove_range(start, offset);
        let caret = Selection::collapsed(key, start);
        let new_document = splice_block(document, index, vec![Arc::new(stripped)])?;
        return Ok(CommandOutcome::Handled(state.push(
            new_document,
            caret,
            ChangeType::RemoveRange,
        )));
    }

    // Caret at offset 0: merge with the previous block, if any.
    let Some(prev_key) = document.key_before(&key).cloned() else {
        return Ok(CommandOutcome::Unhandled);
    };
    let prev = document.require_block(&prev_key)?;

    if prev.is_empty() {
        // An empty predecessor is simply consumed; the caret block survives
        // untouched under its own key.
        let prev_index = index - 1;
        let new_document = splice_block(document, prev_index, Vec::new())?;
        let caret = Selection::collapsed(key, 0);
        Ok(CommandOutcome::Handled(state.push(
            new_document,
            caret,
            ChangeType::RemoveRange,
        )))
    } else {
        // Join the caret block onto its predecessor.
        let join_offset = prev.len();
        let joined = prev.append(block);
        let prev_index = index - 1;
        let mut blocks: Vec<Arc<Block>> = Vec::with_capacity(document.block_count() - 1);
        blocks.extend_from_slice(&document.blocks()[..prev_index]);
        blocks.push(Arc::new(joined));
        blocks.extend_from_slice(&document.blocks()[index + 1..]);
        let new_document = document.with_blocks(blocks)?;
        let caret = Selection::collapsed(prev_key, join_offset);
        Ok(CommandOutcome::Handled(state.push(
            new_document,
            caret,
            ChangeType::RemoveRange,
        )))
    }
}

/// Insert text at the caret, replacing the selection first. Embedded `\n`
/// characters split the caret block; continuation blocks keep the caret
/// block's type and depth. Empty text is `Unhandled`.
pub fn insert_text(state: &EditorState, text: &str) -> Result<CommandOutcome, CommandError> {
    if text.is_empty() {
        return Ok(CommandOutcome::Unhandled);
    }

    let (document, caret) = match remove_selected_range(state.document(), state.selection())? {
        Some((document, caret)) => (document, caret),
        None => (state.document().clone(), state.selection().clone()),
    };

    let key = caret.anchor_key().clone();
    let offset = caret.anchor_offset();
    let block = document.require_block(&key)?.clone();
    let index = document
        .position_of(&key)
        .expect("require_block resolved the key");

    let (new_document, selection) = if let Some((first, rest)) = split_first_line(text) {
        // Multi-line insertion: the caret block splits and intermediate
        // lines become blocks of the same type and depth.
        let (head, tail) = block.split_at(offset, BlockKey::generate());
        let head = head.insert_text(offset, first);
        let last_line = *rest.last().expect("rest is non-empty");
        let tail = tail.insert_text(0, last_line);
        let caret = Selection::collapsed(tail.key().clone(), last_line.chars().count());

        let mut replacements: Vec<Arc<Block>> = Vec::with_capacity(rest.len() + 1);
        replacements.push(Arc::new(head));
        for line in &rest[..rest.len() - 1] {
            replacements.push(Arc::new(
                Block::new(BlockKey::generate(), block.block_type().clone(), *line)
                    .with_depth(block.depth()),
            ));
        }
        replacements.push(Arc::new(tail));
        (splice_block(&document, index, replacements)?, caret)
    } else {
        let inserted = block.insert_text(offset, text);
        let caret = Selection::collapsed(key, offset + text.chars().count());
        (splice_block(&document, index, vec![Arc::new(inserted)])?, caret)
    };

    Ok(CommandOutcome::Handled(state.push(
        new_document,
        selection,
        ChangeType::InsertText,
    )))
}

/// Split `text` into its first line and the remaining lines, or `None` when
/// it holds no newline.
fn split_first_line(text: &str) -> Option<(&str, Vec<&str>)> {
    let mut lines = text.split('\n');
    let first = lines.next().unwrap_or("");
    let rest: Vec<&str> = lines.collect();
    if rest.is_empty() { None } else { Some((first, rest)) }
}

/// Split the caret block in two at the caret, replacing the selection first.
/// The tail gets a fresh key and keeps the block's type and depth; the caret
/// lands at the start of the tail.
pub fn split_block(state: &EditorState) -> Result<CommandOutcome, CommandError> {
    let (document, caret) = match remove_selected_range(state.document(), state.selection())? {
        Some((document, caret)) => (document, caret),
        None => (state.document().clone(), state.selection().clone()),
    };

    let key = caret.anchor_key().clone();
    let offset = caret.anchor_offset();
    let block = document.require_block(&key)?.clone();
    if offset > block.len() {
        return Err(SelectionError::OffsetOutOfBounds {
            key,
            offset,
            len: block.len(),
        }
        .into());
    }
    let index = document
        .position_of(&key)
        .expect("require_block resolved the key");

    let (head, tail) = block.split_at(offset, BlockKey::generate());
    let selection = Selection::collapsed(tail.key().clone(), 0);
    let new_document = splice_block(&document, index, vec![Arc::new(head), Arc::new(tail)])?;

    Ok(CommandOutcome::Handled(state.push(
        new_document,
        selection,
        ChangeType::SplitBlock,
    )))
}

/// Change the type of every block touched by the selection. With `toggle`,
/// reverts to `Paragraph` when the start block already has the target type.
/// Blocks leaving the list types drop to depth 0. No change is `Unhandled`.
pub fn change_block_type(
    state: &EditorState,
    block_type: &BlockType,
    toggle: bool,
) -> Result<CommandOutcome, CommandError> {
    let document = state.document();
    let range = resolve_range(document, state.selection())?;

    let start_block = document.blocks()[range.start_index].as_ref();
    let target = if toggle && start_block.block_type() == block_type {
        BlockType::Paragraph
    } else {
        block_type.clone()
    };

    let mut blocks = document.blocks().to_vec();
    let mut changed = false;
    for index in range.start_index..=range.end_index {
        let block = blocks[index].as_ref();
        if block.block_type() == &target {
            continue;
        }
        let mut replacement = block.with_type(target.clone());
        if !target.is_list_item() && replacement.depth() > 0 {
            replacement = replacement.with_depth(0);
        }
        blocks[index] = Arc::new(replacement);
        changed = true;
    }
    if !changed {
        return Ok(CommandOutcome::Unhandled);
    }

    let new_document = document.with_blocks(blocks)?;
    Ok(CommandOutcome::Handled(state.push(
        new_document,
        state.selection().clone(),
        ChangeType::ChangeBlockType,
    )))
}

/// Adjust list nesting depth of selected list-item blocks by `delta`.
///
/// Indenting is capped by `max_depth` and by one more than the depth of the
/// list item preceding the selection (a list cannot skip levels). Blocks
/// that are not list items are untouched; no change is `Unhandled`.
pub fn adjust_depth(
    state: &EditorState,
    delta: i32,
    max_depth: usize,
) -> Result<CommandOutcome, CommandError> {
    let document = state.document();
    let range = resolve_range(document, state.selection())?;

    let indent_cap = if delta > 0 {
        let cap = range
            .start_index
            .checked_sub(1)
            .map(|i| document.blocks()[i].as_ref())
            .filter(|b| b.block_type().is_list_item())
            .map(|b| b.depth() + 1)
            .unwrap_or(0);
        cap.min(max_depth)
    } else {
        0
    };

    let mut blocks = document.blocks().to_vec();
    let mut changed = false;
    for index in range.start_index..=range.end_index {
        let block = blocks[index].as_ref();
        if !block.block_type().is_list_item() {
            continue;
        }
        let depth = block.depth();
        let new_depth = if delta > 0 {
            (depth + 1).min(indent_cap)
        } else {
            depth.saturating_sub(1)
        };
        if new_depth != depth {
            blocks[index] = Arc::new(block.with_depth(new_depth));
            changed = true;
        }
    }
    if !changed {
        return Ok(CommandOutcome::Unhandled);
    }

    let new_document = document.with_blocks(blocks)?;
    Ok(CommandOutcome::Handled(state.push(
        new_document,
        state.selection().clone(),
        ChangeType::AdjustDepth,
    )))
}

/// Apply or remove an inline style over the selection. Collapsed selections
/// and no-ops are `Unhandled`.
pub fn set_inline_style(
    state: &EditorState,
    style: &InlineStyle,
    enabled: bool,
) -> Result<CommandOutcome, CommandError> {
    let selection = state.selection();
    if selection.is_collapsed() {
        return Ok(CommandOutcome::Unhandled);
    }
    let document = state.document();
    let range = resolve_range(document, selection)?;

    let mut blocks = document.blocks().to_vec();
    let mut changed = false;
    for (index, seg_start, seg_end) in block_segments(document, &range) {
        if seg_start >= seg_end {
            continue;
        }
        let block = blocks[index].as_ref();
        let replacement = if enabled {
            block.apply_style(style.clone(), seg_start, seg_end)
        } else {
            block.remove_style(style, seg_start, seg_end)
        };
        if replacement != *block {
            blocks[index] = Arc::new(replacement);
            changed = true;
        }
    }
    if !changed {
        return Ok(CommandOutcome::Unhandled);
    }

    let new_document = document.with_blocks(blocks)?;
    Ok(CommandOutcome::Handled(state.push(
        new_document,
        selection.clone(),
        ChangeType::ChangeInlineStyle,
    )))
}

/// Toggle an inline style over the selection: remove it when every selected
/// character already carries it, apply it otherwise.
pub fn toggle_inline_style(
    state: &EditorState,
    style: &InlineStyle,
) -> Result<CommandOutcome, CommandError> {
    let selection = state.selection();
    if selection.is_collapsed() {
        return Ok(CommandOutcome::Unhandled);
    }
    let document = state.document();
    let range = resolve_range(document, selection)?;

    let covered = block_segments(document, &range)
        .into_iter()
        .all(|(index, seg_start, seg_end)| {
            document.blocks()[index].has_style_over(style, seg_start, seg_end)
        });

    set_inline_style(state, style, !covered)
}

/// Replace the active selection after validating it against the document.
/// An identical selection is `Unhandled`.
pub fn set_selection(
    state: &EditorState,
    selection: &Selection,
) -> Result<CommandOutcome, CommandError> {
    selection.validate(state.document())?;
    if selection == state.selection() {
        return Ok(CommandOutcome::Unhandled);
    }
    Ok(CommandOutcome::Handled(state.with_selection(selection.clone())))
}

/// Register `entity` and reference it over the selection. Collapsed
/// selections are `Unhandled`.
///
/// This is the entity counterpart of [`set_inline_style`], exposed for
/// extensions (link editing and similar) rather than wired to a named
/// command.
pub fn apply_entity_to_selection(
    state: &EditorState,
    entity: Entity,
) -> Result<CommandOutcome, CommandError> {
    let selection = state.selection();
    if selection.is_collapsed() {
        return Ok(CommandOutcome::Unhandled);
    }
    let document = state.document();
    let range = resolve_range(document, selection)?;

    let segments: Vec<_> = block_segments(document, &range)
        .into_iter()
        .filter(|&(_, s, e)| s < e)
        .collect();
    if segments.is_empty() {
        return Ok(CommandOutcome::Unhandled);
    }

    let (document, entity_key) = document.create_entity(entity);
    let mut blocks = document.blocks().to_vec();
    for (index, seg_start, seg_end) in segments {
        let block = blocks[index].as_ref();
        blocks[index] = Arc::new(block.apply_entity(entity_key.clone(), seg_start, seg_end));
    }

    let new_document = document.with_blocks(blocks)?;
    Ok(CommandOutcome::Handled(state.push(
        new_document,
        selection.clone(),
        ChangeType::ApplyEntity,
    )))
}

/// Drop entity coverage from the selection. Collapsed selections and
/// no-ops are `Unhandled`. The entities themselves stay registered.
pub fn remove_entity_from_selection(
    state: &EditorState,
) -> Result<CommandOutcome, CommandError> {
    let selection = state.selection();
    if selection.is_collapsed() {
        return Ok(CommandOutcome::Unhandled);
    }
    let document = state.document();
    let range = resolve_range(document, selection)?;

    let mut blocks = document.blocks().to_vec();
    let mut changed = false;
    for (index, seg_start, seg_end) in block_segments(document, &range) {
        if seg_start >= seg_end {
            continue;
        }
        let block = blocks[index].as_ref();
        let replacement = block.clear_entities(seg_start, seg_end);
        if replacement != *block {
            blocks[index] = Arc::new(replacement);
            changed = true;
        }
    }
    if !changed {
        return Ok(CommandOutcome::Unhandled);
    }

    let new_document = document.with_blocks(blocks)?;
    Ok(CommandOutcome::Handled(state.push(
        new_document,
        selection.clone(),
        ChangeType::ApplyEntity,
    )))
}

/// Merge data pairs into a registered entity, producing a new undoable
/// state. Unknown keys are a [`StructuralViolation`].
pub fn merge_entity_data<I, K, V>(
    state: &EditorState,
    entity_key: &EntityKey,
    pairs: I,
) -> Result<CommandOutcome, CommandError>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let entities = state.document().entities().merge_data(entity_key, pairs)?;
    let document = state.document().with_entities(entities);
    Ok(CommandOutcome::Handled(state.push(
        document,
        state.selection().clone(),
        ChangeType::ApplyEntity,
    )))
}
