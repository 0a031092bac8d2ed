//! Backend methods reachable through the `invoke` boundary.
//!
//! This module defines the method names and argument records used when the
//! command engine talks to the notebook backend.

use serde::{Deserialize, Serialize};

/// Backend methods invoked by commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendMethod {
    /// Persist the loaded notebook to disk.
    SaveNotebook,
    /// Replace the body of a page in the loaded notebook.
    UpdatePage,
    /// Move a page to the trash.
    MovePageToTrash,
    /// Delete a page permanently.
    DeletePagePermanent,
}

impl BackendMethod {
    /// Stable method name on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SaveNotebook => "save_notebook",
            Self::UpdatePage => "update_page",
            Self::MovePageToTrash => "move_page_to_trash",
            Self::DeletePagePermanent => "delete_page_permanent",
        }
    }

    /// Parse a method name.
    pub fn try_from_str(s: &str) -> Option<Self> {
        match s {
            "save_notebook" => Some(Self::SaveNotebook),
            "update_page" => Some(Self::UpdatePage),
            "move_page_to_trash" => Some(Self::MovePageToTrash),
            "delete_page_permanent" => Some(Self::DeletePagePermanent),
            _ => None,
        }
    }
}

/// Arguments for [`BackendMethod::UpdatePage`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePageArgs {
    /// Page to update.
    pub page_id: String,
    /// New page body.
    pub new_content: String,
}

/// Arguments for methods that address a single page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageArgs {
    /// Target page.
    pub page_id: String,
}
