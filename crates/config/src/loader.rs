//! Parse and load settings.

use std::{fs, path::Path};

use tracing::debug;

use crate::{Error, Settings, excerpt_at};

/// Parse settings from RON text and validate them.
pub fn load_from_str(source: &str) -> Result<Settings, Error> {
    let settings: Settings = ron::from_str(source).map_err(|e| {
        let line = e.span.start.line;
        let col = e.span.start.col;
        Error::Parse {
            path: None,
            line,
            col,
            message: e.code.to_string(),
            excerpt: excerpt_at(source, line, col),
        }
    })?;
    settings.validate()?;
    Ok(settings)
}

/// Load settings from a RON file at `path`.
pub fn load_from_path(path: &Path) -> Result<Settings, Error> {
    let source = fs::read_to_string(path).map_err(|e| Error::Read {
        path: Some(path.to_path_buf()),
        message: e.to_string(),
    })?;
    let settings = load_from_str(&source).map_err(|e| e.with_path(path))?;
    debug!(path = %path.display(), "settings_loaded");
    Ok(settings)
}
