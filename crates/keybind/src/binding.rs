use std::{collections::BTreeSet, fmt};

use serde::{Deserialize, Serialize};

use crate::Modifier;

/// A key binding: a set of modifiers plus a single non-modifier key.
///
/// The key is stored lower-cased. Modifiers are kept in a sorted set, so the
/// canonical string never repeats a modifier and always lists them in
/// `ctrl`, `shift`, `alt` order.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Binding {
    /// Modifier keys held down for this binding.
    modifiers: BTreeSet<Modifier>,
    /// The non-modifier key, lower-cased.
    key: String,
}

impl Binding {
    /// Builds a binding from modifiers and a key label.
    ///
    /// Returns `None` when the key is empty or is the label of a modifier key
    /// (`Control`, `Shift`, `Alt`). Other labels are kept, even ones that
    /// spell a modifier name in binding strings such as `Option`.
    pub fn new<I>(modifiers: I, key: &str) -> Option<Self>
    where
        I: IntoIterator<Item = Modifier>,
    {
        if key.is_empty() || Modifier::from_key_label(key).is_some() {
            return None;
        }
        Some(Self {
            modifiers: modifiers.into_iter().collect(),
            key: key.to_lowercase(),
        })
    }

    /// Parses a binding string of the form "ctrl+shift+n".
    ///
    /// - Modifier tokens are case-insensitive and may use the aliases accepted
    ///   by `Modifier::from_spec`.
    /// - The last component is always the key; `"ctrl++"` binds the plus key.
    /// - A repeated modifier, an empty component or a missing key is rejected.
    pub fn parse(s: &str) -> Option<Self> {
        let (mods_raw, key_raw) = if s == "+" {
            ("", "+")
        } else if let Some(rest) = s.strip_suffix("++") {
            (rest, "+")
        } else {
            match s.rsplit_once('+') {
                Some((m, k)) => (m, k),
                None => ("", s),
            }
        };
        // keep a literal space key as-is
        let key = if key_raw == " " { key_raw } else { key_raw.trim() };
        if key.is_empty() || Modifier::from_spec(key).is_some() {
            return None;
        }

        let mut modifiers = BTreeSet::new();
        if !mods_raw.is_empty() {
            for m in mods_raw.split('+') {
                let mm = Modifier::from_spec(m.trim())?;
                if !modifiers.insert(mm) {
                    return None;
                }
            }
        }
        Some(Self {
            modifiers,
            key: key.to_lowercase(),
        })
    }

    /// Modifiers in canonical order.
    pub fn modifiers(&self) -> impl Iterator<Item = Modifier> + '_ {
        self.modifiers.iter().copied()
    }

    /// True when `m` is part of this binding.
    pub fn has(&self, m: Modifier) -> bool {
        self.modifiers.contains(&m)
    }

    /// The lower-cased key token.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the canonical binding string.
    pub fn to_string_canonical(&self) -> String {
        let mut out: Vec<&str> = self.modifiers.iter().map(|m| m.to_spec()).collect();
        out.push(&self.key);
        out.join("+")
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_canonical())
    }
}

impl TryFrom<String> for Binding {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s).ok_or_else(|| format!("invalid binding '{s}'"))
    }
}

impl From<Binding> for String {
    fn from(b: Binding) -> Self {
        b.to_string_canonical()
    }
}
