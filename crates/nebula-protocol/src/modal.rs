//! Modal specs mounted through the state store.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A modal the store can mount. At most one is active at a time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum ModalSpec {
    /// Prompt for a new page title.
    #[serde(rename = "page/create")]
    PageCreate(PageCreateModal),
    /// Confirmation for a destructive action.
    #[serde(rename = "confirmation")]
    Confirmation(ConfirmationModal),
}

impl ModalSpec {
    /// Wire tag of this modal, e.g. `page/create`.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PageCreate(_) => "page/create",
            Self::Confirmation(_) => "confirmation",
        }
    }

    /// Modal instance id.
    pub fn id(&self) -> &str {
        match self {
            Self::PageCreate(m) => &m.id,
            Self::Confirmation(m) => &m.id,
        }
    }
}

/// "Create page" prompt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageCreateModal {
    /// Modal instance id.
    pub id: String,
    /// Parent of the page to create.
    pub parent_id: Option<String>,
    /// Sibling the new page is inserted after.
    pub insert_after_id: Option<String>,
    /// Heading shown in the prompt.
    pub label: String,
}

/// Severity tier of a confirmation.
///
/// Serialized as its integer value. Levels above [`DangerLevel::Warning`]
/// require a timed countdown before confirming.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Default)]
#[serde(try_from = "u8", into = "u8")]
pub enum DangerLevel {
    /// No particular risk.
    #[default]
    None = 0,
    /// Recoverable destructive action.
    Warning = 1,
    /// Irreversible destructive action.
    Danger = 2,
}

impl DangerLevel {
    /// True when confirming must wait for a countdown.
    pub fn requires_countdown(self) -> bool {
        self > Self::Warning
    }

    /// Visual severity for this level.
    pub fn severity(self) -> Severity {
        match self {
            Self::None => Severity::None,
            Self::Warning => Severity::Warning,
            Self::Danger => Severity::Danger,
        }
    }
}

impl TryFrom<u8> for DangerLevel {
    type Error = String;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(Self::None),
            1 => Ok(Self::Warning),
            2 => Ok(Self::Danger),
            n => Err(format!("invalid danger level {n} (expected 0, 1 or 2)")),
        }
    }
}

impl From<DangerLevel> for u8 {
    fn from(d: DangerLevel) -> Self {
        d as Self
    }
}

/// Presentation severity derived from a [`DangerLevel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Plain styling.
    None,
    /// Warning styling.
    Warning,
    /// Danger styling.
    Danger,
}

impl Severity {
    /// Style name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Warning => "warning",
            Self::Danger => "danger",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Confirmation modal: `{ id, for, information, dangerLevel, props }`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationModal {
    /// Identifies the destructive action, e.g. `removePage`.
    pub id: String,
    /// Heading: what is being confirmed.
    #[serde(rename = "for")]
    pub for_: String,
    /// Explanation shown under the heading.
    pub information: String,
    /// Severity tier.
    pub danger_level: DangerLevel,
    /// Subject of the destructive action.
    pub props: ConfirmProps,
}

impl ConfirmationModal {
    /// Confirmation for moving `page_id` to the trash.
    pub fn remove_page(page_id: impl Into<String>) -> Self {
        Self {
            id: ConfirmKind::RemovePage.as_str().to_string(),
            for_: "Move page to trash".to_string(),
            information: "The page and its sub-pages can be restored from the trash.".to_string(),
            danger_level: DangerLevel::Warning,
            props: ConfirmProps::RemovePage {
                page_id: page_id.into(),
            },
        }
    }

    /// Confirmation for deleting `page_id` permanently.
    pub fn remove_page_permanent(page_id: impl Into<String>) -> Self {
        Self {
            id: ConfirmKind::RemovePagePermanent.as_str().to_string(),
            for_: "Delete page permanently".to_string(),
            information: "This cannot be undone.".to_string(),
            danger_level: DangerLevel::Danger,
            props: ConfirmProps::RemovePagePermanent {
                page_id: page_id.into(),
            },
        }
    }
}

/// Payload of a confirmation, keyed by the destructive action kind.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ConfirmProps {
    /// Move a page to the trash.
    #[serde(rename_all = "camelCase")]
    RemovePage {
        /// Page to move.
        page_id: String,
    },
    /// Delete a page permanently.
    #[serde(rename_all = "camelCase")]
    RemovePagePermanent {
        /// Page to delete.
        page_id: String,
    },
}

impl ConfirmProps {
    /// Kind declared by this payload.
    pub fn kind(&self) -> ConfirmKind {
        match self {
            Self::RemovePage { .. } => ConfirmKind::RemovePage,
            Self::RemovePagePermanent { .. } => ConfirmKind::RemovePagePermanent,
        }
    }
}

/// Known confirmation identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmKind {
    /// `removePage`
    RemovePage,
    /// `removePagePermanent`
    RemovePagePermanent,
}

impl ConfirmKind {
    /// Stable identifier.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RemovePage => "removePage",
            Self::RemovePagePermanent => "removePagePermanent",
        }
    }

    /// Parse a modal id; unknown ids return `None`.
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "removePage" => Some(Self::RemovePage),
            "removePagePermanent" => Some(Self::RemovePagePermanent),
            _ => None,
        }
    }
}
