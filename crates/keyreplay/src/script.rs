//! Replay script parsing.
//!
//! One directive per line. Blank lines and lines starting with `#` are
//! skipped. Anything that is not a keyword is read as a binding string.

use std::{result, time::Duration};

use keybind::{Binding, KeyEvent, Modifier};
use nebula_protocol::{BackendMethod, PageRef};

use crate::error::{Error, Result};

/// A single replay step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// Dispatch a canonical binding, e.g. `ctrl+s`.
    Binding(String),
    /// Feed a raw key event through normalization.
    Key(KeyEvent),
    /// Execute a command by id.
    Run(String),
    /// Navigate to a route.
    Route(String),
    /// Open a page, or close the current one with `page -`.
    Page(Option<PageRef>),
    /// Replace the open document text.
    Doc(String),
    /// Confirm the active confirmation.
    Confirm,
    /// Cancel the active modal.
    Cancel,
    /// Let time pass.
    Wait(Duration),
    /// Make a backend method reject from now on.
    Fail(BackendMethod),
}

/// Parse a whole script into `(line number, directive)` pairs.
pub fn parse(text: &str) -> Result<Vec<(usize, Directive)>> {
    let mut out = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        if let Some(d) = parse_line(raw).map_err(|m| Error::script(line, m))? {
            out.push((line, d));
        }
    }
    Ok(out)
}

/// Parse one line. `Ok(None)` for blanks and comments.
pub fn parse_line(raw: &str) -> result::Result<Option<Directive>, String> {
    let line = raw.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((w, r)) => (w, r.trim()),
        None => (line, ""),
    };
    let d = match word {
        "key" => Directive::Key(parse_key(rest)?),
        "run" => Directive::Run(required(word, rest)?.to_string()),
        "route" => Directive::Route(required(word, rest)?.to_string()),
        "page" => Directive::Page(parse_page(rest)?),
        "doc" => Directive::Doc(unescape(rest)),
        "confirm" => no_args(word, rest, Directive::Confirm)?,
        "cancel" => no_args(word, rest, Directive::Cancel)?,
        "wait" => {
            let ms: u64 = required(word, rest)?
                .parse()
                .map_err(|_| format!("wait: expected milliseconds, got {rest:?}"))?;
            Directive::Wait(Duration::from_millis(ms))
        }
        "fail" => {
            let name = required(word, rest)?;
            let method = BackendMethod::try_from_str(name)
                .ok_or_else(|| format!("fail: unknown backend method {name:?}"))?;
            Directive::Fail(method)
        }
        _ => {
            if !rest.is_empty() {
                return Err(format!("unknown directive {word:?}"));
            }
            let binding =
                Binding::parse(word).ok_or_else(|| format!("invalid binding {word:?}"))?;
            Directive::Binding(binding.to_string())
        }
    };
    Ok(Some(d))
}

/// The argument of `word`, which must be present.
fn required<'a>(word: &str, rest: &'a str) -> result::Result<&'a str, String> {
    if rest.is_empty() {
        Err(format!("{word}: missing argument"))
    } else {
        Ok(rest)
    }
}

/// `d`, provided `word` was given no arguments.
fn no_args(word: &str, rest: &str, d: Directive) -> result::Result<Directive, String> {
    if rest.is_empty() {
        Ok(d)
    } else {
        Err(format!("{word}: takes no arguments"))
    }
}

/// `key [modifiers...] <Key>`; the key label keeps its case.
fn parse_key(rest: &str) -> result::Result<KeyEvent, String> {
    let mut parts: Vec<&str> = rest.split_whitespace().collect();
    let key = parts.pop().ok_or("key: missing key label")?;
    let mut ev = KeyEvent::new(key);
    for p in parts {
        let m = Modifier::from_spec(p).ok_or_else(|| format!("key: unknown modifier {p:?}"))?;
        ev = ev.with(m);
    }
    Ok(ev)
}

/// `page <id> [parent]` or `page -`.
fn parse_page(rest: &str) -> result::Result<Option<PageRef>, String> {
    let mut parts = rest.split_whitespace();
    let page = match (parts.next(), parts.next(), parts.next()) {
        (Some("-"), None, None) => None,
        (Some(id), None, None) => Some(PageRef::new(id)),
        (Some(id), Some(parent), None) => Some(PageRef::new(id).with_parent(parent)),
        (None, ..) => return Err("page: missing page id".to_string()),
        _ => return Err("page: expected <id> [parent]".to_string()),
    };
    Ok(page)
}

/// Expand `\n` and `\\` in document text.
fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
