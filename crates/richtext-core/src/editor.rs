//! The host-side editor shell.
//!
//! [`Editor`] is what a host view holds: the current [`EditorState`], the
//! command pipeline, the extension registry, and the read-only toggle. It
//! owns the one "current" state reference; commands route through extension
//! interceptors first, then the default pipeline, and observers are notified
//! after every accepted transition.
//!
//! # Example
//!
//! ```rust
//! use richtext_core::{Command, CommandStatus, EditCommand, Editor};
//!
//! let mut editor = Editor::empty();
//! let status = editor
//!     .execute(&Command::Edit(EditCommand::InsertText { text: "Hi".into() }))
//!     .unwrap();
//! assert_eq!(status, CommandStatus::Handled);
//! assert_eq!(editor.state().document().first_block().text(), "Hi");
//! ```

use crate::commands::{Command, CommandError, CommandOutcome, CommandPipeline};
use crate::extensions::{Extension, ExtensionHandle, ExtensionRegistry, PanelContribution};
use crate::state::{ChangeType, EditorState};

/// What happened to a dispatched command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    /// An extension or the default pipeline produced a new state.
    Handled,
    /// Nothing changed; the host's fallback behavior may run.
    Unhandled,
}

/// The host shell owning the current editor state.
pub struct Editor {
    state: EditorState,
    pipeline: CommandPipeline,
    registry: ExtensionRegistry,
    read_only: bool,
}

impl Editor {
    /// Wrap an initial state with a default pipeline.
    pub fn new(state: EditorState) -> Self {
        Self {
            state,
            pipeline: CommandPipeline::default(),
            registry: ExtensionRegistry::new(),
            read_only: false,
        }
    }

    /// An editor over an empty document.
    pub fn empty() -> Self {
        Self::new(EditorState::empty())
    }

    /// Replace the command pipeline (builder style).
    pub fn with_pipeline(mut self, pipeline: CommandPipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// The current state.
    pub fn state(&self) -> &EditorState {
        &self.state
    }

    /// The command pipeline.
    pub fn pipeline(&self) -> &CommandPipeline {
        &self.pipeline
    }

    /// Whether the editor currently rejects commands.
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Toggle read-only mode. While set, every command is reported
    /// [`CommandStatus::Unhandled`].
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    /// Register an extension; returns the handle used to unregister it.
    pub fn register_extension(&mut self, extension: Box<dyn Extension>) -> ExtensionHandle {
        self.registry.register(extension)
    }

    /// Remove a registered extension.
    pub fn unregister_extension(&mut self, handle: ExtensionHandle) -> bool {
        self.registry.unregister(handle)
    }

    /// Collect panel contributions for the render collaborator.
    pub fn contributions(&self) -> Vec<PanelContribution> {
        self.registry.contributions(&self.state)
    }

    /// Dispatch one command: extension interceptors in registration order,
    /// then the default pipeline. On success the new state replaces the
    /// current one atomically and observers are notified.
    ///
    /// Errors indicate an invariant breach (e.g. an extension fed a stale
    /// key); they are surfaced to the host, and the state is unchanged.
    pub fn execute(&mut self, command: &Command) -> Result<CommandStatus, CommandError> {
        if self.read_only {
            log::trace!("read-only editor dropped command {}", command.name());
            return Ok(CommandStatus::Unhandled);
        }

        let intercepted = self
            .registry
            .intercept(&self.state, command)
            .inspect_err(|error| {
                log::warn!("extension rejected command {}: {}", command.name(), error);
            })?;

        let outcome = match intercepted {
            CommandOutcome::Handled(next) => CommandOutcome::Handled(next),
            CommandOutcome::Unhandled => {
                self.pipeline.apply(&self.state, command).inspect_err(|error| {
                    log::warn!("pipeline rejected command {}: {}", command.name(), error);
                })?
            }
        };

        match outcome {
            CommandOutcome::Handled(next) => {
                let change = next
                    .last_change()
                    .unwrap_or(ChangeType::SelectionChange);
                self.state = next;
                self.registry.notify_change(&self.state, change);
                Ok(CommandStatus::Handled)
            }
            CommandOutcome::Unhandled => Ok(CommandStatus::Unhandled),
        }
    }
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("blocks", &self.state.document().block_count())
            .field("extensions", &self.registry.len())
            .field("read_only", &self.read_only)
            .finish()
    }
}
