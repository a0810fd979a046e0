//! Extension points: capability-based plugin registration.
//!
//! An extension declares a set of capabilities and fills the matching
//! optional method slots: a command interceptor that runs before the default
//! pipeline (first handler wins), a read-only change observer invoked after
//! every accepted transition, and a rendered side-panel contribution the
//! host places next to the document.
//!
//! Capabilities are snapshotted when the extension is registered, not
//! re-queried per dispatch; an extension that does not declare
//! [`Capability::InterceptCommands`] is never asked to intercept.
//!
//! Extensions never mutate editor state. They receive the current state by
//! reference for the duration of a dispatch or notify cycle and request new
//! states by returning [`CommandOutcome::Handled`] from an interceptor.

use crate::block::BlockKey;
use crate::commands::{Command, CommandError, CommandOutcome};
use crate::state::{ChangeType, EditorState};

/// What an extension is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Run before the default pipeline for every command.
    InterceptCommands,
    /// Be notified after every accepted state transition.
    ObserveChanges,
    /// Contribute a rendered side panel.
    RenderContribution,
}

/// Where the host should place a contributed panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelPlacement {
    /// Floating near the current selection (an inline toolbar).
    Inline,
    /// In the margin next to the anchor block (a side toolbar).
    Side,
}

/// A UI affordance contributed by an extension, described as pure data for
/// the host's render collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelContribution {
    /// Where to place the panel.
    pub placement: PanelPlacement,
    /// The block the panel is anchored to.
    pub anchor_key: BlockKey,
    /// Whether the panel should currently be shown.
    pub visible: bool,
    /// Host-interpreted control identifiers, in display order.
    pub controls: Vec<String>,
}

/// A pluggable behavior extension.
///
/// Implement the method slots matching the declared capabilities; the
/// defaults decline every command, observe nothing, and contribute nothing.
pub trait Extension {
    /// The capability set, snapshotted at registration time.
    fn capabilities(&self) -> &[Capability];

    /// Intercept a command before the default pipeline. Return
    /// [`CommandOutcome::Handled`] to short-circuit later interceptors and
    /// the default handler, or [`CommandOutcome::Unhandled`] to decline.
    fn intercept_command(
        &mut self,
        _state: &EditorState,
        _command: &Command,
    ) -> Result<CommandOutcome, CommandError> {
        Ok(CommandOutcome::Unhandled)
    }

    /// Observe an accepted state transition (read-only).
    fn on_change(&mut self, _state: &EditorState, _change: ChangeType) {}

    /// Contribute a rendered panel for the current state.
    fn render_contribution(&self, _state: &EditorState) -> Option<PanelContribution> {
        None
    }
}

/// Handle returned by [`ExtensionRegistry::register`], used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExtensionHandle(u64);

struct RegisteredExtension {
    handle: ExtensionHandle,
    capabilities: Vec<Capability>,
    extension: Box<dyn Extension>,
}

/// Ordered set of registered extensions.
///
/// Interceptors run in registration order; the first to handle a command
/// wins and later interceptors plus the default pipeline are skipped.
#[derive(Default)]
pub struct ExtensionRegistry {
    entries: Vec<RegisteredExtension>,
    next_handle: u64,
}

impl ExtensionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_handle: 1,
        }
    }

    /// Register an extension, snapshotting its capability set.
    pub fn register(&mut self, extension: Box<dyn Extension>) -> ExtensionHandle {
        let handle = ExtensionHandle(self.next_handle);
        self.next_handle += 1;
        let capabilities = extension.capabilities().to_vec();
        self.entries.push(RegisteredExtension {
            handle,
            capabilities,
            extension,
        });
        handle
    }

    /// Remove a registered extension. Returns false for an unknown handle.
    pub fn unregister(&mut self, handle: ExtensionHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.handle != handle);
        self.entries.len() != before
    }

    /// Number of registered extensions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no extensions are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Offer a command to interceptors in registration order. The first
    /// handler wins; errors abort the dispatch.
    pub fn intercept(
        &mut self,
        state: &EditorState,
        command: &Command,
    ) -> Result<CommandOutcome, CommandError> {
        for entry in &mut self.entries {
            if !entry.capabilities.contains(&Capability::InterceptCommands) {
                continue;
            }
            if let CommandOutcome::Handled(next) =
                entry.extension.intercept_command(state, command)?
            {
                return Ok(CommandOutcome::Handled(next));
            }
        }
        Ok(CommandOutcome::Unhandled)
    }

    /// Notify observers of an accepted transition.
    pub fn notify_change(&mut self, state: &EditorState, change: ChangeType) {
        for entry in &mut self.entries {
            if entry.capabilities.contains(&Capability::ObserveChanges) {
                entry.extension.on_change(state, change);
            }
        }
    }

    /// Collect panel contributions in registration order.
    pub fn contributions(&self, state: &EditorState) -> Vec<PanelContribution> {
        self.entries
            .iter()
            .filter(|e| e.capabilities.contains(&Capability::RenderContribution))
            .filter_map(|e| e.extension.render_contribution(state))
            .collect()
    }
}

impl std::fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionRegistry")
            .field("extensions", &self.entries.len())
            .finish()
    }
}
