//! End-of-stream repair for unterminated Markdown.
//!
//! When a stream ends (or dies) mid-construct, the held-back remainder
//! would render as broken Markdown: an open fence swallows whatever the
//! terminal prints next, a dangling `[text](` shows raw syntax. This pass
//! appends conservative closers so the final flush renders sanely. It
//! runs only at end of stream, never while fragments are still arriving.

use super::{normalize, scan};

/// Close whatever the remainder leaves open.
///
/// Closers, when applicable: rewrite a trailing `[text](partial` to
/// `[text](#)`; one backtick for open inline code; one `*` / `_` for open
/// emphasis; a closing tag for the most recent unclosed HTML element
/// only; the matching fence run; the YAML `---` terminator. Incomplete
/// tables and lists need no repair, they render as-is.
pub fn repair(remainder: &str) -> String {
    let mut out = normalize(remainder).into_owned();
    // The stream is over, so a trailing bare `\r` can no longer be half
    // of a `\r\n` pair.
    if out.ends_with('\r') {
        out.pop();
        out.push('\n');
    }
    if out.is_empty() {
        return out;
    }

    let state = scan(&out).state;

    if state.in_yaml {
        if !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str("---\n");
        return out;
    }

    if state.in_fence {
        // Anything the scanner flagged before the fence opened would have
        // its closer land inside the code block; closing the fence is the
        // one repair that helps here.
        if !out.ends_with('\n') {
            out.push('\n');
        }
        for _ in 0..state.fence_len {
            out.push(state.fence_char);
        }
        out.push('\n');
        return out;
    }

    if state.link_paren_open {
        if let Some(pos) = out.rfind("](") {
            out.truncate(pos + 2);
            out.push_str("#)");
        }
    }
    if state.inline_code {
        out.push('`');
    }
    if state.emph_star {
        out.push('*');
    }
    if state.emph_underscore {
        out.push('_');
    }
    if let Some(tag) = state.html_stack.last() {
        out.push_str(&format!("</{tag}>"));
    }

    out
}
