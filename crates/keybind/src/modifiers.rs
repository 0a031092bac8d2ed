use std::fmt;

use serde::{Deserialize, Serialize};

/// Modifier keys recognized in bindings.
///
/// Variant order is the canonical token order of a binding string, so a sorted
/// set of modifiers always renders as `ctrl`, `shift`, `alt`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    /// The Control key.
    Ctrl,
    /// The Shift key.
    Shift,
    /// The Alt (Option) key.
    Alt,
}

impl Modifier {
    /// All modifiers in canonical order.
    pub const ALL: [Self; 3] = [Self::Ctrl, Self::Shift, Self::Alt];

    /// Parses a modifier token. Case-insensitive; accepts `control` and
    /// `opt`/`option` as aliases.
    pub fn from_spec(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "ctrl" | "control" => Some(Self::Ctrl),
            "shift" => Some(Self::Shift),
            "alt" | "opt" | "option" => Some(Self::Alt),
            _ => None,
        }
    }

    /// Returns the modifier whose key label (as reported by a key event) is
    /// exactly `label`.
    ///
    /// Labels are case-sensitive: `"Shift"` is the Shift key itself, while a
    /// key labelled `"shift"` is not a modifier press.
    pub fn from_key_label(label: &str) -> Option<Self> {
        match label {
            "Control" => Some(Self::Ctrl),
            "Shift" => Some(Self::Shift),
            "Alt" => Some(Self::Alt),
            _ => None,
        }
    }

    /// Canonical lower-case token used in binding strings.
    pub fn to_spec(self) -> &'static str {
        match self {
            Self::Ctrl => "ctrl",
            Self::Shift => "shift",
            Self::Alt => "alt",
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_spec())
    }
}
