use serde::{Deserialize, Serialize};

use crate::ModalSpec;

/// State-store actions emitted by commands for non-persisted transitions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "action", content = "payload", rename_all = "camelCase")]
pub enum Action {
    /// Show or hide the page sidebar.
    ToggleSidebar,
    /// Switch between single and split editor panes.
    ToggleSplitMode,
    /// Enter or leave the no-distractions layout.
    ToggleNoDistractionsMode,
    /// Show only the rendered preview.
    TogglePreviewOnly,
    /// Mount a modal, replacing any active one.
    ShowModal(ModalSpec),
    /// Close the active modal.
    UnloadModal,
}
