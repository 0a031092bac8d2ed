use serde::{Deserialize, Serialize};

use crate::{Binding, Modifier};

/// A raw key press as delivered by the input system.
pub trait KeyInput {
    /// True when `modifier` is held down for this event.
    fn modifier_state(&self, modifier: Modifier) -> bool;
    /// The key label, e.g. `"n"`, `"N"`, `"?"` or `"Shift"`.
    fn key(&self) -> &str;
}

/// Plain key event carrying modifier flags and the key label.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct KeyEvent {
    /// Key label as reported by the input system.
    pub key: String,
    /// Control held.
    #[serde(default)]
    pub ctrl: bool,
    /// Shift held.
    #[serde(default)]
    pub shift: bool,
    /// Alt held.
    #[serde(default)]
    pub alt: bool,
}

impl KeyEvent {
    /// A key press with no modifiers held.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    /// Returns this event with `modifier` held.
    pub fn with(mut self, modifier: Modifier) -> Self {
        match modifier {
            Modifier::Ctrl => self.ctrl = true,
            Modifier::Shift => self.shift = true,
            Modifier::Alt => self.alt = true,
        }
        self
    }
}

impl KeyInput for KeyEvent {
    fn modifier_state(&self, modifier: Modifier) -> bool {
        match modifier {
            Modifier::Ctrl => self.ctrl,
            Modifier::Shift => self.shift,
            Modifier::Alt => self.alt,
        }
    }

    fn key(&self) -> &str {
        &self.key
    }
}

/// Normalize a key press into its canonical binding.
///
/// Modifier state is queried in `ctrl`, `shift`, `alt` order. Returns `None`
/// when the pressed key is itself a modifier (a bare modifier tap) or has no
/// label, so modifier presses never register as bindings.
pub fn normalize<E: KeyInput + ?Sized>(ev: &E) -> Option<Binding> {
    let held = Modifier::ALL
        .into_iter()
        .filter(|m| ev.modifier_state(*m));
    Binding::new(held, ev.key())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canon(ev: &KeyEvent) -> Option<String> {
        normalize(ev).map(|b| b.to_string())
    }

    #[test]
    fn order_is_independent_of_press_order() {
        let a = KeyEvent::new("N").with(Modifier::Shift).with(Modifier::Ctrl);
        let b = KeyEvent::new("N").with(Modifier::Ctrl).with(Modifier::Shift);
        assert_eq!(canon(&a).as_deref(), Some("ctrl+shift+n"));
        assert_eq!(canon(&a), canon(&b));
    }

    #[test]
    fn every_modifier_combination_is_canonical() {
        for mask in 0u8..8 {
            let mut ev = KeyEvent::new("K");
            let mut want = Vec::new();
            for (bit, m) in Modifier::ALL.into_iter().enumerate() {
                if mask & (1 << bit) != 0 {
                    ev = ev.with(m);
                    want.push(m.to_spec());
                }
            }
            want.push("k");
            assert_eq!(canon(&ev), Some(want.join("+")), "mask {mask}");
        }
    }

    #[test]
    fn bare_modifier_yields_nothing() {
        assert_eq!(canon(&KeyEvent::new("Shift").with(Modifier::Shift)), None);
        assert_eq!(canon(&KeyEvent::new("Control").with(Modifier::Ctrl)), None);
        assert_eq!(
            canon(&KeyEvent::new("Alt").with(Modifier::Alt).with(Modifier::Ctrl)),
            None
        );
        assert_eq!(canon(&KeyEvent::new("")), None);
    }

    #[test]
    fn alias_labels_are_ordinary_keys() {
        assert_eq!(
            canon(&KeyEvent::new("Option").with(Modifier::Alt)).as_deref(),
            Some("alt+option")
        );
        assert_eq!(canon(&KeyEvent::new("shift")).as_deref(), Some("shift"));
    }

    #[test]
    fn shifted_punctuation_keeps_label() {
        let ev = KeyEvent::new("?").with(Modifier::Ctrl).with(Modifier::Shift);
        assert_eq!(canon(&ev).as_deref(), Some("ctrl+shift+?"));
        let ev = KeyEvent::new(".").with(Modifier::Ctrl);
        assert_eq!(canon(&ev).as_deref(), Some("ctrl+."));
    }

    #[test]
    fn repeated_events_are_identical() {
        let ev = KeyEvent::new("s").with(Modifier::Ctrl);
        let first = normalize(&ev);
        for _ in 0..10 {
            assert_eq!(normalize(&ev), first);
        }
    }
}
