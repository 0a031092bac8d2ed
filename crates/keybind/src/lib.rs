//! keybind: canonical key bindings for the Nebula command layer.
//!
//! - `Modifier`: the three modifier keys the command layer understands, ordered
//!   `ctrl < shift < alt`.
//! - `Binding`: a set of modifiers plus one lower-cased key, rendered as the
//!   canonical binding string (e.g. `ctrl+shift+n`).
//! - `KeyInput` / `KeyEvent` and [`normalize`]: turn a raw key press into a
//!   `Binding`, filtering out bare modifier presses.

mod modifiers;
pub use modifiers::Modifier;

mod binding;
pub use binding::Binding;

mod event;
pub use event::{KeyEvent, KeyInput, normalize};
