//! Progressive streaming Markdown splitter.
//!
//! Given an append-only buffer of streamed Markdown, [`split`] returns the
//! longest prefix that is safe to render right now and the remainder to
//! hold back until more input arrives. Rendering a half-open code fence,
//! an unclosed table, or a dangling `[text](` would produce visibly wrong
//! output; the splitter refuses to cut while any such construct is open.
//!
//! The splitter is stateless between calls: every invocation rebuilds its
//! parse state from the full buffer, so caller-held state can never drift
//! out of sync with caller-held text.
//!
//! # Example
//!
//! ```
//! use cascade::splitter::split;
//!
//! let s = split("done\n```js\nx = 1\n");
//! assert_eq!(s.closed, "done\n");
//! assert_eq!(s.remainder, "```js\nx = 1\n");
//! ```

mod scan;
pub mod repair;

use std::borrow::Cow;

pub(crate) use scan::scan;

/// Result of one split: `closed + remainder` is the normalized buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    /// Prefix that is safe to render. Empty or ends just after a newline.
    pub closed: String,
    /// Everything after the safe cut, held for the next call.
    pub remainder: String,
}

/// Split `buffer` at the largest safe line boundary.
///
/// Line endings are normalized first (`\r\n` and bare `\r` become `\n`),
/// and the returned pieces are slices of the normalized text, so
/// `closed + remainder` reproduces it exactly. Pure and idempotent.
// SAFETY: slicing at the scan's safe offset is sound because the offset
// is always just past an ASCII newline byte, which is a char boundary.
#[allow(clippy::string_slice)]
pub fn split(buffer: &str) -> Split {
    let normalized = normalize(buffer);
    match scan(&normalized).safe_offset {
        Some(offset) if offset > 0 => Split {
            closed: normalized[..offset].to_string(),
            remainder: normalized[offset..].to_string(),
        },
        _ => Split {
            closed: String::new(),
            remainder: normalized.into_owned(),
        },
    }
}

/// Normalize line endings: `\r\n` and bare `\r` become `\n`.
///
/// A `\r` as the final byte is kept as-is: it may be the first half of a
/// `\r\n` pair split across fragments, and converting it early would make
/// chunked and unchunked scans disagree. It is resolved either by the
/// next fragment or by the end-of-stream repair pass.
pub(crate) fn normalize(input: &str) -> Cow<'_, str> {
    if !input.contains('\r') {
        return Cow::Borrowed(input);
    }
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\r' {
            match chars.peek() {
                Some('\n') => {
                    chars.next();
                    out.push('\n');
                }
                Some(_) => out.push('\n'),
                None => out.push('\r'),
            }
        } else {
            out.push(c);
        }
    }
    Cow::Owned(out)
}
