//! Command interface example
//!
//! Demonstrates driving the editor shell with commands.

use richtext_core::{
    BlockCommand, BlockType, Command, EditCommand, Editor, InlineStyle, Selection,
    SelectionCommand, StyleCommand,
};

fn main() {
    let mut editor = Editor::empty();

    // 1. Text editing.
    editor
        .execute(&Command::Edit(EditCommand::InsertText {
            text: "Hello world".to_string(),
        }))
        .unwrap();
    println!("after typing:   {:?}", editor.state().document().plain_text());

    // 2. Select "Hello" and embolden it.
    let key = editor.state().document().first_block().key().clone();
    editor
        .execute(&Command::Selection(SelectionCommand::Set {
            selection: Selection::new(key.clone(), 0, key.clone(), 5, false),
        }))
        .unwrap();
    editor
        .execute(&Command::Style(StyleCommand::ToggleInlineStyle {
            style: InlineStyle::Bold,
        }))
        .unwrap();
    println!(
        "style ranges:   {:?}",
        editor.state().document().first_block().style_ranges()
    );

    // 3. Delete the selection; the caret lands on the surviving text.
    editor
        .execute(&Command::Edit(EditCommand::DeleteRange))
        .unwrap();
    println!("after deletion: {:?}", editor.state().document().plain_text());
    println!(
        "caret:          ({}, {})",
        editor.state().selection().anchor_key(),
        editor.state().selection().anchor_offset()
    );

    // 4. Turn the block into a quote, then undo everything.
    editor
        .execute(&Command::Block(BlockCommand::SetType {
            block_type: BlockType::Blockquote,
        }))
        .unwrap();
    while editor
        .execute(&Command::Edit(EditCommand::Undo))
        .map(|s| s == richtext_core::CommandStatus::Handled)
        .unwrap_or(false)
    {}
    println!("after undo:     {:?}", editor.state().document().plain_text());
}
