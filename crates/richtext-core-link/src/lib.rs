//! `richtext-core-link` - Link entities for `richtext-core`.
//!
//! Links are `LINK` entities with mutable data (the URL can be edited
//! without recreating the entity) referenced over character ranges. This
//! extension wires three custom commands and tracks the link under the
//! caret after every accepted change:
//!
//! - [`APPLY_LINK`] (`apply-link`, argument: the URL) applies a link over
//!   the current selection;
//! - [`EDIT_LINK`] (`edit-link`, argument: the URL) rewrites the URL of the
//!   link at the caret;
//! - [`REMOVE_LINK`] (`remove-link`) unlinks the selection, or the whole
//!   link range at a collapsed caret.
//!
//! While the caret rests inside a link, the extension contributes an inline
//! panel with edit/remove controls for the host to render.

use std::sync::Arc;

use richtext_core::{
    Capability, ChangeType, Command, CommandError, CommandOutcome, Editor, EditorState, Entity,
    EntityKey, Extension, Mutability, PanelContribution, PanelPlacement, commands,
};

/// The entity type tag for links.
pub const LINK: &str = "LINK";

/// The mutability class links are created with.
pub const LINK_MUTABILITY: Mutability = Mutability::Mutable;

/// The entity data key holding the link target.
pub const URL_DATA_KEY: &str = "url";

/// Custom command: apply a link over the selection.
pub const APPLY_LINK: &str = "apply-link";

/// Custom command: rewrite the URL of the link at the caret.
pub const EDIT_LINK: &str = "edit-link";

/// Custom command: remove link coverage.
pub const REMOVE_LINK: &str = "remove-link";

/// Build a `LINK` entity for a URL.
pub fn link_entity(url: &str) -> Entity {
    Entity::new(LINK, LINK_MUTABILITY).with_data(URL_DATA_KEY, url)
}

/// Build the `apply-link` command for a URL.
pub fn apply_link_command(url: &str) -> Command {
    Command::Custom {
        name: APPLY_LINK.to_string(),
        argument: Some(url.to_string()),
    }
}

/// The `LINK` entity under the caret, if any.
///
/// A caret at the end boundary of a link still counts as inside it, so the
/// edit panel does not flicker away while typing at the link's edge.
pub fn link_at_caret(state: &EditorState) -> Option<(EntityKey, String)> {
    let selection = state.selection();
    if !selection.is_collapsed() {
        return None;
    }
    let block = state.document().block_at(selection.anchor_key())?;
    let offset = selection.anchor_offset();
    let key = block
        .entity_at(offset)
        .or_else(|| offset.checked_sub(1).and_then(|o| block.entity_at(o)))?
        .clone();

    let entity = state.document().entities().get(&key)?;
    if entity.entity_type() != LINK {
        return None;
    }
    let url = entity
        .data()
        .get(URL_DATA_KEY)
        .cloned()
        .unwrap_or_default();
    Some((key, url))
}

/// Extension handling link commands and tracking the caret link.
#[derive(Default)]
pub struct LinkExtension {
    active: Option<EntityKey>,
}

impl LinkExtension {
    /// Create the extension with no active link.
    pub fn new() -> Self {
        Self::default()
    }

    /// The key of the link currently under the caret, if any.
    pub fn active_link(&self) -> Option<&EntityKey> {
        self.active.as_ref()
    }

    fn remove_link(
        &self,
        state: &EditorState,
    ) -> Result<CommandOutcome, CommandError> {
        let selection = state.selection();
        if !selection.is_collapsed() {
            return commands::remove_entity_from_selection(state);
        }

        // Collapsed caret: unlink the whole range under it.
        let Some((key, _)) = link_at_caret(state) else {
            return Ok(CommandOutcome::Unhandled);
        };
        let document = state.document();
        let block = document.require_block(selection.anchor_key())?;
        let index = document
            .position_of(selection.anchor_key())
            .expect("require_block resolved the key");

        let mut blocks = document.blocks().to_vec();
        blocks[index] = Arc::new(block.remove_entity(&key));
        let new_document = document.with_blocks(blocks)?;
        Ok(CommandOutcome::Handled(state.push(
            new_document,
            selection.clone(),
            ChangeType::ApplyEntity,
        )))
    }
}

impl Extension for LinkExtension {
    fn capabilities(&self) -> &[Capability] {
        &[
            Capability::InterceptCommands,
            Capability::ObserveChanges,
            Capability::RenderContribution,
        ]
    }

    fn intercept_command(
        &mut self,
        state: &EditorState,
        command: &Command,
    ) -> Result<CommandOutcome, CommandError> {
        let Command::Custom { name, argument } = command else {
            return Ok(CommandOutcome::Unhandled);
        };
        match name.as_str() {
            APPLY_LINK => {
                let Some(url) = argument.as_deref() else {
                    return Ok(CommandOutcome::Unhandled);
                };
                commands::apply_entity_to_selection(state, link_entity(url))
            }
            EDIT_LINK => {
                let Some(url) = argument.as_deref() else {
                    return Ok(CommandOutcome::Unhandled);
                };
                let Some((key, _)) = link_at_caret(state) else {
                    return Ok(CommandOutcome::Unhandled);
                };
                commands::merge_entity_data(state, &key, [(URL_DATA_KEY, url)])
            }
            REMOVE_LINK => self.remove_link(state),
            _ => Ok(CommandOutcome::Unhandled),
        }
    }

    fn on_change(&mut self, state: &EditorState, _change: ChangeType) {
        self.active = link_at_caret(state).map(|(key, _)| key);
    }

    fn render_contribution(&self, state: &EditorState) -> Option<PanelContribution> {
        let (_, _url) = link_at_caret(state)?;
        Some(PanelContribution {
            placement: PanelPlacement::Inline,
            anchor_key: state.selection().anchor_key().clone(),
            visible: true,
            controls: vec![EDIT_LINK.to_string(), REMOVE_LINK.to_string()],
        })
    }
}

/// Convenience: register a [`LinkExtension`] on an editor.
pub fn install(editor: &mut Editor) -> richtext_core::ExtensionHandle {
    editor.register_extension(Box::new(LinkExtension::new()))
}
