//! End-to-end integration tests
//!
//! Drives a full editing session through the host shell.

use richtext_core::{
    BlockCommand, BlockType, Command, CommandStatus, EditCommand, Editor, InlineStyle, Selection,
    SelectionCommand, StyleCommand,
};

/// Test a full editing session.
#[test]
fn test_full_editing_session() {
    let mut editor = Editor::empty();

    // 1. Type a title and a body.
    editor
        .execute(&Command::Edit(EditCommand::InsertText {
            text: "My document".to_string(),
        }))
        .unwrap();
    editor
        .execute(&Command::Edit(EditCommand::SplitBlock))
        .unwrap();
    editor
        .execute(&Command::Edit(EditCommand::InsertText {
            text: "Hello world".to_string(),
        }))
        .unwrap();
    assert_eq!(editor.state().document().block_count(), 2);
    assert_eq!(editor.state().document().plain_text(), "My document\nHello world");

    // 2. Turn the first block into a heading.
    let title_key = editor.state().document().first_block().key().clone();
    editor
        .execute(&Command::Selection(SelectionCommand::Set {
            selection: Selection::collapsed(title_key.clone(), 0),
        }))
        .unwrap();
    editor
        .execute(&Command::Block(BlockCommand::ToggleType {
            block_type: BlockType::HeadingOne,
        }))
        .unwrap();
    assert_eq!(
        editor.state().document().first_block().block_type(),
        &BlockType::HeadingOne
    );

    // 3. Bold "Hello" in the body.
    let body_key = editor.state().document().last_block().key().clone();
    editor
        .execute(&Command::Selection(SelectionCommand::Set {
            selection: Selection::new(body_key.clone(), 0, body_key.clone(), 5, false),
        }))
        .unwrap();
    editor
        .execute(&Command::Style(StyleCommand::ToggleInlineStyle {
            style: InlineStyle::Bold,
        }))
        .unwrap();
    let body = editor.state().document().block_at(&body_key).unwrap();
    assert!(body.has_style_over(&InlineStyle::Bold, 0, 5));

    // 4. Delete "Hello " and verify the caret.
    editor
        .execute(&Command::Selection(SelectionCommand::Set {
            selection: Selection::new(body_key.clone(), 0, body_key.clone(), 6, false),
        }))
        .unwrap();
    let status = editor
        .execute(&Command::Edit(EditCommand::DeleteRange))
        .unwrap();
    assert_eq!(status, CommandStatus::Handled);
    let body = editor.state().document().block_at(&body_key).unwrap();
    assert_eq!(body.text(), "world");
    assert_eq!(editor.state().selection().anchor_key(), &body_key);
    assert_eq!(editor.state().selection().anchor_offset(), 0);

    // 5. Merge the body back into the title with backspace, then undo it
    // all the way back to the empty document.
    editor
        .execute(&Command::Edit(EditCommand::DeleteBackward))
        .unwrap();
    assert_eq!(editor.state().document().block_count(), 1);
    assert_eq!(editor.state().document().plain_text(), "My documentworld");

    let mut undos = 0;
    while editor.execute(&Command::Edit(EditCommand::Undo)).unwrap() == CommandStatus::Handled {
        undos += 1;
    }
    assert!(undos >= 5);
    assert_eq!(editor.state().document().plain_text(), "");
}

/// Pasting multi-line text splits blocks like repeated split-block would.
#[test]
fn test_multi_line_insertion() {
    let mut editor = Editor::empty();
    editor
        .execute(&Command::Edit(EditCommand::InsertText {
            text: "abcd".to_string(),
        }))
        .unwrap();
    let key = editor.state().document().first_block().key().clone();
    editor
        .execute(&Command::Selection(SelectionCommand::Set {
            selection: Selection::collapsed(key, 2),
        }))
        .unwrap();
    editor
        .execute(&Command::Edit(EditCommand::InsertText {
            text: "x\ny\nz".to_string(),
        }))
        .unwrap();

    let texts: Vec<_> = editor
        .state()
        .document()
        .iter()
        .map(|b| b.text().to_string())
        .collect();
    assert_eq!(texts, vec!["abx", "y", "zcd"]);
    // Caret sits after the "z" in the final block.
    assert_eq!(
        editor.state().selection().anchor_key(),
        editor.state().document().last_block().key()
    );
    assert_eq!(editor.state().selection().anchor_offset(), 1);
}

/// Typing over a range selection replaces it in a single undo step.
#[test]
fn test_typing_over_a_selection_replaces_it() {
    let mut editor = Editor::empty();
    editor
        .execute(&Command::Edit(EditCommand::InsertText {
            text: "Hello world".to_string(),
        }))
        .unwrap();
    let key = editor.state().document().first_block().key().clone();
    editor
        .execute(&Command::Selection(SelectionCommand::Set {
            selection: Selection::new(key.clone(), 6, key.clone(), 11, false),
        }))
        .unwrap();
    let depth_before = editor.state().undo_depth();
    editor
        .execute(&Command::Edit(EditCommand::InsertText {
            text: "there".to_string(),
        }))
        .unwrap();

    assert_eq!(editor.state().document().first_block().text(), "Hello there");
    assert_eq!(editor.state().undo_depth(), depth_before + 1);

    editor.execute(&Command::Edit(EditCommand::Undo)).unwrap();
    assert_eq!(editor.state().document().first_block().text(), "Hello world");
}

/// Splitting distributes annotation ranges between head and tail.
#[test]
fn test_split_block_keeps_type_and_styles() {
    let mut editor = Editor::empty();
    editor
        .execute(&Command::Edit(EditCommand::InsertText {
            text: "Hello world".to_string(),
        }))
        .unwrap();
    let key = editor.state().document().first_block().key().clone();
    editor
        .execute(&Command::Block(BlockCommand::SetType {
            block_type: BlockType::Blockquote,
        }))
        .unwrap();
    editor
        .execute(&Command::Selection(SelectionCommand::Set {
            selection: Selection::new(key.clone(), 0, key.clone(), 11, false),
        }))
        .unwrap();
    editor
        .execute(&Command::Style(StyleCommand::SetInlineStyle {
            style: InlineStyle::Italic,
            enabled: true,
        }))
        .unwrap();
    editor
        .execute(&Command::Selection(SelectionCommand::Set {
            selection: Selection::collapsed(key.clone(), 6),
        }))
        .unwrap();
    editor
        .execute(&Command::Edit(EditCommand::SplitBlock))
        .unwrap();

    let document = editor.state().document();
    assert_eq!(document.block_count(), 2);
    let head = document.block_at(&key).unwrap();
    let tail = document.last_block();
    assert_eq!(head.text(), "Hello ");
    assert_eq!(tail.text(), "world");
    assert_eq!(tail.block_type(), &BlockType::Blockquote);
    assert!(head.has_style_over(&InlineStyle::Italic, 0, 6));
    assert!(tail.has_style_over(&InlineStyle::Italic, 0, 5));
    assert_ne!(tail.key(), &key);
    assert_eq!(editor.state().selection().anchor_key(), tail.key());
    assert_eq!(editor.state().selection().anchor_offset(), 0);
}
