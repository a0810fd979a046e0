//! Block-breakout behavior on split-block.

use richtext_core::{
    Block, BlockKey, BlockType, Command, CommandStatus, Document, EditCommand, Editor,
    EditorState, EntityMap, Selection, SelectionCommand,
};
use richtext_core_breakout::BreakoutExtension;

fn editor(block_type: BlockType, text: &str) -> Editor {
    let document = Document::new(
        vec![Block::new(BlockKey::new("h1"), block_type, text)],
        EntityMap::new(),
    )
    .unwrap();
    let mut editor = Editor::new(EditorState::new(document));
    editor.register_extension(Box::new(BreakoutExtension::new()));
    editor
}

fn set_caret(editor: &mut Editor, offset: usize) {
    editor
        .execute(&Command::Selection(SelectionCommand::Set {
            selection: Selection::collapsed(BlockKey::new("h1"), offset),
        }))
        .unwrap();
}

#[test]
fn test_enter_at_heading_end_starts_a_paragraph() {
    let mut editor = editor(BlockType::HeadingOne, "Title");
    set_caret(&mut editor, 5);
    let status = editor
        .execute(&Command::Edit(EditCommand::SplitBlock))
        .unwrap();
    assert_eq!(status, CommandStatus::Handled);

    let document = editor.state().document();
    assert_eq!(document.block_count(), 2);
    assert_eq!(document.first_block().block_type(), &BlockType::HeadingOne);
    assert_eq!(document.first_block().text(), "Title");
    let fresh = document.last_block();
    assert_eq!(fresh.block_type(), &BlockType::Paragraph);
    assert!(fresh.is_empty());
    assert_eq!(editor.state().selection().anchor_key(), fresh.key());
}

#[test]
fn test_enter_at_heading_start_pushes_it_down() {
    let mut editor = editor(BlockType::Blockquote, "Quote");
    set_caret(&mut editor, 0);
    editor
        .execute(&Command::Edit(EditCommand::SplitBlock))
        .unwrap();

    let document = editor.state().document();
    assert_eq!(document.block_count(), 2);
    assert_eq!(document.first_block().block_type(), &BlockType::Paragraph);
    assert!(document.first_block().is_empty());
    assert_eq!(document.last_block().text(), "Quote");
    // The caret stays on the quote.
    assert_eq!(
        editor.state().selection().anchor_key(),
        &BlockKey::new("h1")
    );
    assert_eq!(editor.state().selection().anchor_offset(), 0);
}

#[test]
fn test_mid_heading_split_falls_through_to_the_default() {
    let mut editor = editor(BlockType::HeadingOne, "Title");
    set_caret(&mut editor, 2);
    editor
        .execute(&Command::Edit(EditCommand::SplitBlock))
        .unwrap();

    let document = editor.state().document();
    assert_eq!(document.block_count(), 2);
    // The default split keeps the type on both halves.
    assert_eq!(document.first_block().text(), "Ti");
    assert_eq!(document.last_block().text(), "tle");
    assert_eq!(document.last_block().block_type(), &BlockType::HeadingOne);
}

#[test]
fn test_paragraphs_do_not_break_out() {
    let mut editor = editor(BlockType::Paragraph, "Body");
    set_caret(&mut editor, 4);
    editor
        .execute(&Command::Edit(EditCommand::SplitBlock))
        .unwrap();

    let document = editor.state().document();
    assert_eq!(document.block_count(), 2);
    assert!(document.last_block().is_empty());
    assert_eq!(document.last_block().block_type(), &BlockType::Paragraph);
}

#[test]
fn test_custom_breakout_types() {
    let document = Document::new(
        vec![Block::new(
            BlockKey::new("h1"),
            BlockType::CodeBlock,
            "let x;",
        )],
        EntityMap::new(),
    )
    .unwrap();
    let mut editor = Editor::new(EditorState::new(document));
    editor.register_extension(Box::new(BreakoutExtension::with_types(vec![
        BlockType::CodeBlock,
    ])));

    editor
        .execute(&Command::Selection(SelectionCommand::Set {
            selection: Selection::collapsed(BlockKey::new("h1"), 6),
        }))
        .unwrap();
    editor
        .execute(&Command::Edit(EditCommand::SplitBlock))
        .unwrap();
    assert_eq!(
        editor.state().document().last_block().block_type(),
        &BlockType::Paragraph
    );
}

#[test]
fn test_breakout_is_undoable() {
    let mut editor = editor(BlockType::HeadingOne, "Title");
    set_caret(&mut editor, 5);
    editor
        .execute(&Command::Edit(EditCommand::SplitBlock))
        .unwrap();
    assert_eq!(editor.state().document().block_count(), 2);

    editor.execute(&Command::Edit(EditCommand::Undo)).unwrap();
    assert_eq!(editor.state().document().block_count(), 1);
    assert_eq!(editor.state().selection().anchor_offset(), 5);
}
