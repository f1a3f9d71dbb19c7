//! Splits source files into their YAML frontmatter and body. Frontmatter is
//! fenced by `---` lines at the very top of the file:
//!
//! ```md
//! ---
//! title: Hello, world!
//! ---
//! Body text.
//! ```

use std::fmt;

const FENCE: &str = "---";

/// Returns `Ok(None)` when `input` doesn't open with a frontmatter fence, or
/// `Ok(Some((yaml, body)))` when it does. An opening fence without a closing
/// fence is an error.
pub fn split(input: &str) -> Result<Option<(&str, &str)>, MissingEndFence> {
    let rest = match strip_fence_line(input) {
        Some(rest) => rest,
        None => return Ok(None),
    };

    // the closing fence must start a line of its own; an empty frontmatter
    // block puts it at the start of `rest`
    let mut line_start = 0;
    loop {
        if let Some(body) = strip_fence_line(&rest[line_start..]) {
            return Ok(Some((&rest[..line_start], body)));
        }
        match rest[line_start..].find('\n') {
            Some(offset) => line_start += offset + 1,
            None => return Err(MissingEndFence),
        }
    }
}

// If `s` starts with a line consisting solely of `---` (trailing whitespace
// allowed), returns whatever follows that line.
fn strip_fence_line(s: &str) -> Option<&str> {
    let after = s.strip_prefix(FENCE)?;
    let (line, rest) = match after.find('\n') {
        Some(i) => (&after[..i], &after[i + 1..]),
        None => (after, ""),
    };
    match line.trim().is_empty() {
        true => Some(rest),
        false => None,
    }
}

/// Returned when a file opens a frontmatter block but never closes it.
#[derive(Debug, PartialEq)]
pub struct MissingEndFence;

impl fmt::Display for MissingEndFence {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Missing closing `---`")
    }
}

impl std::error::Error for MissingEndFence {}
