//! `richtext-core-breakout` - Block-breakout behavior for `richtext-core`.
//!
//! Splitting a heading normally yields two headings, which is almost never
//! what a writer wants: pressing Enter at the end of a heading should start
//! a plain paragraph. This extension intercepts `split-block` and, for a
//! configurable set of "breakout" block types:
//!
//! - caret at the **end** of the block: a fresh empty paragraph is inserted
//!   after it and receives the caret;
//! - caret at the **start** of a non-empty block: a fresh empty paragraph is
//!   inserted before it and the caret stays put.
//!
//! Everything else (a caret mid-block, a range selection, a non-breakout
//! block type) is declined so the default split runs.

use std::sync::Arc;

use richtext_core::{
    Block, BlockType, Capability, ChangeType, Command, CommandError, CommandOutcome, EditCommand,
    EditorState, Extension, Selection,
};

/// The block types that break out by default: the three headings and the
/// blockquote.
pub fn default_breakout_types() -> Vec<BlockType> {
    vec![
        BlockType::HeadingOne,
        BlockType::HeadingTwo,
        BlockType::HeadingThree,
        BlockType::Blockquote,
    ]
}

/// Extension implementing block-breakout on `split-block`.
pub struct BreakoutExtension {
    breakout_types: Vec<BlockType>,
}

impl BreakoutExtension {
    /// Breakout for the default type set.
    pub fn new() -> Self {
        Self {
            breakout_types: default_breakout_types(),
        }
    }

    /// Breakout for an explicit type set.
    pub fn with_types(breakout_types: Vec<BlockType>) -> Self {
        Self { breakout_types }
    }

    /// The configured breakout types.
    pub fn breakout_types(&self) -> &[BlockType] {
        &self.breakout_types
    }
}

impl Default for BreakoutExtension {
    fn default() -> Self {
        Self::new()
    }
}

impl Extension for BreakoutExtension {
    fn capabilities(&self) -> &[Capability] {
        &[Capability::InterceptCommands]
    }

    fn intercept_command(
        &mut self,
        state: &EditorState,
        command: &Command,
    ) -> Result<CommandOutcome, CommandError> {
        if !matches!(command, Command::Edit(EditCommand::SplitBlock)) {
            return Ok(CommandOutcome::Unhandled);
        }
        let selection = state.selection();
        if !selection.is_collapsed() {
            return Ok(CommandOutcome::Unhandled);
        }

        let document = state.document();
        let key = selection.anchor_key();
        let block = document.require_block(key)?;
        if !self.breakout_types.contains(block.block_type()) {
            return Ok(CommandOutcome::Unhandled);
        }

        let offset = selection.anchor_offset();
        let index = document
            .position_of(key)
            .expect("require_block resolved the key");

        if offset == block.len() {
            // Break out below: continue writing in a fresh paragraph.
            let paragraph = Block::empty_paragraph();
            let caret = Selection::collapsed(paragraph.key().clone(), 0);

            let mut blocks: Vec<Arc<Block>> = document.blocks().to_vec();
            blocks.insert(index + 1, Arc::new(paragraph));
            let new_document = document.with_blocks(blocks)?;
            return Ok(CommandOutcome::Handled(state.push(
                new_document,
                caret,
                ChangeType::SplitBlock,
            )));
        }

        if offset == 0 && !block.is_empty() {
            // Break out above: push the block down, keep the caret on it.
            let paragraph = Block::empty_paragraph();
            let caret = Selection::collapsed(key.clone(), 0);

            let mut blocks: Vec<Arc<Block>> = document.blocks().to_vec();
            blocks.insert(index, Arc::new(paragraph));
            let new_document = document.with_blocks(blocks)?;
            return Ok(CommandOutcome::Handled(state.push(
                new_document,
                caret,
                ChangeType::SplitBlock,
            )));
        }

        Ok(CommandOutcome::Unhandled)
    }
}
