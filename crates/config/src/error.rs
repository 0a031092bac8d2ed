//! Error types for settings loading and validation.

use std::{
    cmp::{max, min},
    fmt::Write as _,
    path::{Path, PathBuf},
};

use thiserror::Error;

/// Errors produced while loading, parsing, or validating settings.
#[derive(Debug, Error, Clone)]
pub enum Error {
    /// The settings file could not be read.
    #[error("{message}")]
    Read {
        /// File that failed to read, when known.
        path: Option<PathBuf>,
        /// Underlying I/O message.
        message: String,
    },
    /// The text is not valid settings RON.
    #[error("{message}")]
    Parse {
        /// Source file, when parsed from disk.
        path: Option<PathBuf>,
        /// 1-based line number.
        line: usize,
        /// 1-based column number.
        col: usize,
        /// Parser message.
        message: String,
        /// Source lines around the error with a caret under `col`.
        excerpt: String,
    },
    /// A parsed value is out of range.
    #[error("{message}")]
    Validation {
        /// Source file, when loaded from disk.
        path: Option<PathBuf>,
        /// Which value is wrong and why.
        message: String,
    },
}

impl Error {
    /// Multi-line rendering for terminals: a located heading, the message
    /// and, for parse errors, the excerpt.
    pub fn pretty(&self) -> String {
        match self {
            Self::Read { path, message } => {
                format!("Read error{}: {message}", at(path.as_deref(), None))
            }
            Self::Parse {
                path,
                line,
                col,
                message,
                excerpt,
            } => format!(
                "Settings parse error{}\n{message}\n{excerpt}",
                at(path.as_deref(), Some((*line, *col)))
            ),
            Self::Validation { path, message } => format!(
                "Settings validation error{}\n{message}",
                at(path.as_deref(), None)
            ),
        }
    }

    /// File the error refers to, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Read { path, .. } | Self::Parse { path, .. } | Self::Validation { path, .. } => {
                path.as_deref()
            }
        }
    }

    /// Attach `path` to this error.
    pub(crate) fn with_path(mut self, p: &Path) -> Self {
        match &mut self {
            Self::Read { path, .. } | Self::Parse { path, .. } | Self::Validation { path, .. } => {
                *path = Some(p.to_path_buf());
            }
        }
        self
    }
}

/// ` at <path>[:line:col]`, ` at line L, column C`, or nothing.
fn at(path: Option<&Path>, pos: Option<(usize, usize)>) -> String {
    match (path, pos) {
        (Some(p), Some((l, c))) => format!(" at {}:{l}:{c}", p.display()),
        (Some(p), None) => format!(" at {}", p.display()),
        (None, Some((l, c))) => format!(" at line {l}, column {c}"),
        (None, None) => String::new(),
    }
}

/// Width of the `" NNNN | "` gutter in front of each excerpt line.
const GUTTER: usize = 8;

/// Up to two lines before `line_no` and one after, numbered, with a caret
/// under column `col_no` of `line_no`.
pub fn excerpt_at(source: &str, line_no: usize, col_no: usize) -> String {
    let first = max(1, line_no.saturating_sub(2));
    let last = min(source.lines().count(), line_no + 1);

    let mut out = String::new();
    for (n, text) in source.lines().enumerate().map(|(i, t)| (i + 1, t)) {
        if n < first || n > last {
            continue;
        }
        let _ignored = writeln!(out, " {n:>4} | {text}");
        if n == line_no {
            let pad = GUTTER + col_no.saturating_sub(1);
            let _ignored = writeln!(out, "{}^", " ".repeat(pad));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excerpt_marks_column() {
        let src = "(\n  editor_route_prefix: 1,\n)";
        let ex = excerpt_at(src, 2, 24);
        assert!(ex.contains("   2 |   editor_route_prefix: 1,"));
        let caret = ex.lines().find(|l| l.trim_end().ends_with('^')).expect("caret line");
        // " " + "   2" + " | " prefix, then 23 columns of padding
        assert_eq!(caret.find('^'), Some(8 + 23));
    }

    #[test]
    fn pretty_includes_path() {
        let e = Error::Validation {
            path: None,
            message: "tick_ms must be positive".into(),
        }
        .with_path(Path::new("/tmp/nebula.ron"));
        assert_eq!(e.path(), Some(Path::new("/tmp/nebula.ron")));
        assert!(e.pretty().starts_with("Settings validation error at /tmp/nebula.ron"));
    }

    #[test]
    fn pretty_parse_without_path() {
        let e = Error::Parse {
            path: None,
            line: 3,
            col: 7,
            message: "Unexpected char".into(),
            excerpt: String::new(),
        };
        assert!(
            e.pretty()
                .starts_with("Settings parse error at line 3, column 7\nUnexpected char")
        );
    }
}
