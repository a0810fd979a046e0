#![warn(missing_docs)]
//! Rich Text Core - Headless Rich Text Editor Kernel
//!
//! # Overview
//!
//! `richtext-core` is a headless rich text editor kernel focused on
//! immutable document snapshots, selection tracking, and a pure
//! edit-command pipeline. It does not render anything; it assumes the host
//! provides a view renderer that consumes the current [`EditorState`] and
//! dispatches [`Command`]s back into the core.
//!
//! # Core Features
//!
//! - **Immutable Document Model**: ordered content blocks with per-character
//!   inline style and entity annotation ranges, shared structurally between
//!   snapshots
//! - **Selection Model**: anchor/focus ranges keyed to stable block
//!   identities
//! - **Snapshot State**: every accepted command produces a new
//!   [`EditorState`]; undo/redo restore whole (document, selection) pairs
//! - **Pure Command Pipeline**: `(state, command) -> Handled(new state) |
//!   Unhandled`, never a partial edit
//! - **Extension Points**: capability-checked plugins intercept commands,
//!   observe transitions, and contribute host-rendered panels
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Editor (host shell, read-only toggle)      │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  Extension Registry (intercept / observe)   │  ← Pluggable behavior
//! ├─────────────────────────────────────────────┤
//! │  Command Pipeline (pure transitions)        │  ← Edit semantics
//! ├─────────────────────────────────────────────┤
//! │  EditorState (history, selectionBefore)     │  ← Undo/redo unit
//! ├─────────────────────────────────────────────┤
//! │  Document / Selection (immutable values)    │  ← Block storage
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use richtext_core::{
//!     Command, CommandStatus, EditCommand, Editor, Selection, SelectionCommand,
//! };
//!
//! let mut editor = Editor::empty();
//!
//! // Type some text.
//! editor
//!     .execute(&Command::Edit(EditCommand::InsertText {
//!         text: "Hello world".to_string(),
//!     }))
//!     .unwrap();
//!
//! // Select "Hello" and delete it.
//! let key = editor.state().document().first_block().key().clone();
//! editor
//!     .execute(&Command::Selection(SelectionCommand::Set {
//!         selection: Selection::new(key.clone(), 0, key.clone(), 5, false),
//!     }))
//!     .unwrap();
//! let status = editor.execute(&Command::Edit(EditCommand::DeleteRange)).unwrap();
//!
//! assert_eq!(status, CommandStatus::Handled);
//! assert_eq!(editor.state().document().first_block().text(), " world");
//! assert_eq!(editor.state().selection().anchor_offset(), 0);
//! ```
//!
//! # Module Description
//!
//! - [`block`] - content blocks, inline style and entity ranges
//! - [`entity`] - out-of-line entities and the immutable registry
//! - [`document`] - the ordered block sequence with structural sharing
//! - [`selection`] - the caret/range value type
//! - [`state`] - editor state snapshots and undo/redo history
//! - [`commands`] - the edit-command pipeline
//! - [`extensions`] - capability-based plugin registration
//! - [`editor`] - the host-side shell owning the current state
//!
//! # Concurrency Model
//!
//! Single-threaded and synchronous: commands are processed strictly in
//! delivery order, each seeing the state produced by its predecessor. State
//! is an immutable value replaced atomically between commands, so there are
//! no torn reads and no partial edits.

pub mod block;
pub mod commands;
pub mod document;
pub mod editor;
pub mod entity;
pub mod extensions;
pub mod selection;
pub mod state;

pub use block::{Block, BlockKey, BlockType, EntityRange, InlineStyle, StyleRange};
pub use commands::{
    BlockCommand, Command, CommandError, CommandOutcome, CommandPipeline, EditCommand,
    PipelineConfig, SelectionCommand, StyleCommand, DEFAULT_MAX_INDENT_DEPTH,
};
pub use document::{Document, StructuralViolation};
pub use editor::{CommandStatus, Editor};
pub use entity::{Entity, EntityKey, EntityMap, Mutability};
pub use extensions::{
    Capability, Extension, ExtensionHandle, ExtensionRegistry, PanelContribution, PanelPlacement,
};
pub use selection::{Selection, SelectionError, SelectionUpdate};
pub use state::{ChangeType, EditorState, DEFAULT_MAX_UNDO};
