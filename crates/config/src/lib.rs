//! Settings for the Nebula command engine.
//!
//! Settings tune the engine's ambient behavior: which route counts as the
//! editor and how the confirmation countdown ticks. The key binding table is
//! not configurable. Settings are read from RON with [`load_from_str`] or
//! [`load_from_path`], both of which validate before returning.

mod error;
mod loader;
mod settings;

pub use error::{Error, excerpt_at};
pub use loader::{load_from_path, load_from_str};
pub use settings::{ConfirmationSettings, Settings};
