use std::{collections::HashMap, sync::OnceLock};

use keybind::Binding;
use tracing::warn;

use crate::commands::ids;

/// Built-in key bindings: binding string → command id.
const DEFAULT_BINDINGS: [(&str, &str); 7] = [
    ("ctrl+.", ids::TOGGLE_SIDEBAR),
    ("ctrl+shift+d", ids::TOGGLE_NO_DISTRACTIONS),
    ("ctrl+/", ids::TOGGLE_PREVIEW_ONLY),
    ("ctrl+shift+?", ids::TOGGLE_SPLIT_MODE),
    ("ctrl+n", ids::ADD_PAGE),
    ("ctrl+shift+n", ids::ADD_SUB_PAGE),
    ("ctrl+s", ids::SAVE_CURRENT_NOTEBOOK),
];

/// Process-wide table of the built-in bindings, built on first use.
static TABLE: OnceLock<BindingTable> = OnceLock::new();

/// Immutable mapping from canonical binding string to command id.
#[derive(Debug)]
pub struct BindingTable {
    /// Canonical binding string → command id.
    map: HashMap<String, &'static str>,
}

impl BindingTable {
    /// The built-in table.
    pub fn global() -> &'static Self {
        TABLE.get_or_init(|| Self::from_pairs(&DEFAULT_BINDINGS))
    }

    /// Build a table, keying each entry by its canonical binding string.
    /// Entries that do not parse as bindings are skipped.
    fn from_pairs(pairs: &[(&str, &'static str)]) -> Self {
        let mut map = HashMap::with_capacity(pairs.len());
        for (spec, command) in pairs {
            match Binding::parse(spec) {
                Some(b) => {
                    map.insert(b.to_string(), *command);
                }
                None => warn!(binding = %spec, "invalid_builtin_binding"),
            }
        }
        Self { map }
    }

    /// Command bound to `binding`, if any.
    pub fn command_for(&self, binding: &str) -> Option<&'static str> {
        self.map.get(binding).copied()
    }

    /// Bindings sorted by binding string.
    pub fn entries(&self) -> Vec<(&str, &'static str)> {
        let mut out: Vec<(&str, &'static str)> =
            self.map.iter().map(|(b, c)| (b.as_str(), *c)).collect();
        out.sort();
        out
    }
}
