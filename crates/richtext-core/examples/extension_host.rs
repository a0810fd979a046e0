//! Extension host example
//!
//! Registers an interceptor and a change observer against the editor shell.

use richtext_core::{
    Capability, ChangeType, Command, CommandError, CommandOutcome, EditCommand, Editor,
    EditorState, Extension, commands,
};

/// Upper-cases everything typed while enabled.
struct ShoutingKeyboard;

impl Extension for ShoutingKeyboard {
    fn capabilities(&self) -> &[Capability] {
        &[Capability::InterceptCommands]
    }

    fn intercept_command(
        &mut self,
        state: &EditorState,
        command: &Command,
    ) -> Result<CommandOutcome, CommandError> {
        match command {
            Command::Edit(EditCommand::InsertText { text }) => {
                commands::insert_text(state, &text.to_uppercase())
            }
            _ => Ok(CommandOutcome::Unhandled),
        }
    }
}

/// Logs every accepted transition.
struct ChangeLogger;

impl Extension for ChangeLogger {
    fn capabilities(&self) -> &[Capability] {
        &[Capability::ObserveChanges]
    }

    fn on_change(&mut self, state: &EditorState, change: ChangeType) {
        println!(
            "change {:?} -> {:?} (undo depth {})",
            change,
            state.document().plain_text(),
            state.undo_depth()
        );
    }
}

fn main() {
    let mut editor = Editor::empty();
    let shouting = editor.register_extension(Box::new(ShoutingKeyboard));
    editor.register_extension(Box::new(ChangeLogger));

    editor
        .execute(&Command::Edit(EditCommand::InsertText {
            text: "quiet words".to_string(),
        }))
        .unwrap();

    // Unregister the interceptor; typing goes back to normal.
    editor.unregister_extension(shouting);
    editor
        .execute(&Command::Edit(EditCommand::InsertText {
            text: " and quiet again".to_string(),
        }))
        .unwrap();

    println!("final: {:?}", editor.state().document().plain_text());
}
