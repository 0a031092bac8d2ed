//! Shared types at the boundaries of the Nebula command engine.
//!
//! - [`AppContext`]: read-only snapshot of the application state a command sees.
//! - [`Action`]: in-memory state transitions sent to the state store.
//! - [`modal`]: modal specs, confirmation payloads and danger levels.
//! - [`rpc`]: backend method names and their argument records.

use serde::{Deserialize, Serialize};

mod action;
pub mod modal;
pub mod rpc;

pub use action::Action;
pub use modal::{
    ConfirmKind, ConfirmProps, ConfirmationModal, DangerLevel, ModalSpec, PageCreateModal, Severity,
};
pub use rpc::{BackendMethod, PageArgs, UpdatePageArgs};

/// Minimal page reference held by the editor state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageRef {
    /// Page identifier.
    pub id: String,
    /// Parent page, `None` for top-level pages.
    #[serde(default)]
    pub parent_id: Option<String>,
}

impl PageRef {
    /// A top-level page.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent_id: None,
        }
    }

    /// Returns this page nested under `parent`.
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent_id = Some(parent.into());
        self
    }
}

/// Snapshot of the ambient application state consulted by commands.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct AppContext {
    /// Current route path, e.g. `/editor/abc/p1`.
    pub route: String,
    /// Page open in the editor, if any.
    #[serde(default)]
    pub current_page: Option<PageRef>,
    /// In-memory text of the open document.
    #[serde(default)]
    pub current_doc: String,
}

impl AppContext {
    /// Context at `route` with no page open.
    pub fn at(route: impl Into<String>) -> Self {
        Self {
            route: route.into(),
            ..Self::default()
        }
    }

    /// Returns this context with `page` open and showing `doc`.
    pub fn with_page(mut self, page: PageRef, doc: impl Into<String>) -> Self {
        self.current_page = Some(page);
        self.current_doc = doc.into();
        self
    }
}
