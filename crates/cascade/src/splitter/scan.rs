//! Line-by-line scan that tracks open Markdown constructs.
//!
//! The scanner consumes the entire buffer on every call and rebuilds its
//! state from scratch, so the buffer handed in by the caller is the only
//! source of truth. At each line boundary it records whether the text up
//! to that point is safe to hand to a renderer.

use regex::Regex;
use std::sync::LazyLock;

/// A table row: at least two pipes on the line.
static TABLE_ROW_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*\|.*\|").unwrap());

/// A table separator row such as `|---|:---|`.
static TABLE_SEPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\|?\s*:?-{3,}:?\s*(\|\s*:?-{3,}:?\s*)+\|?\s*$").unwrap()
});

/// A list item with content: `- x`, `* x`, `+ x`, or `12. x`. A bare
/// marker without content does not match, so it terminates the list like
/// any other non-item line.
static LIST_ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:[-*+]|\d+\.)\s+\S").unwrap());

/// An HTML open or close tag. Attribute values containing angle brackets
/// are not recognized; the scan only needs a conservative signal.
static HTML_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</?[A-Za-z][A-Za-z0-9-]*[^<>]*>").unwrap());

/// `[text](` with no closing paren before the end of the line.
static DANGLING_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\]]*\]\([^)]*$").unwrap());

/// HTML void elements, which never receive a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Tracks every construct that prohibits cutting the buffer.
///
/// Rebuilt for each scan; nothing survives between calls.
#[derive(Default, Debug, Clone, PartialEq)]
pub(crate) struct ScanState {
    pub in_fence: bool,
    pub fence_char: char,
    pub fence_len: usize,
    pub in_yaml: bool,
    pub inline_code: bool,
    pub emph_star: bool,
    pub emph_underscore: bool,
    pub html_stack: Vec<String>,
    pub open_brackets: usize,
    pub link_paren_open: bool,
    pub in_table: bool,
    pub table_rows: usize,
    pub table_separator_seen: bool,
    pub in_list: bool,
    pub list_items: usize,
}

impl ScanState {
    /// True when no construct is open and a line boundary may be cut.
    ///
    /// A table blocks the cut until its separator and a third row have
    /// been seen; the separator row itself is tracked by the boolean and
    /// not counted.
    fn is_balanced(&self) -> bool {
        !self.in_fence
            && !self.in_yaml
            && !self.inline_code
            && !self.emph_star
            && !self.emph_underscore
            && self.html_stack.is_empty()
            && self.open_brackets == 0
            && !self.link_paren_open
            && !(self.in_table && (!self.table_separator_seen || self.table_rows < 3))
            && !self.in_list
    }
}

/// Result of a full-buffer scan.
pub(crate) struct ScanOutcome {
    /// Largest byte offset that is safe to cut, always just past a
    /// newline. `None` when no boundary is safe.
    pub safe_offset: Option<usize>,
    /// State after the final (possibly unterminated) line, used by the
    /// end-of-stream repair pass.
    pub state: ScanState,
}

/// Scan `text` and find the largest safe cut offset.
///
/// `text` must already be newline-normalized. The scan is O(n) and pure:
/// it neither mutates nor retains the input.
// SAFETY: all slice offsets here sit next to an ASCII newline byte, which
// is always a char boundary.
#[allow(clippy::string_slice)]
pub(crate) fn scan(text: &str) -> ScanOutcome {
    let mut state = ScanState::default();
    let mut safe_offset: Option<usize> = None;
    let mut line_start = 0;
    let mut line_index = 0;

    while line_start < text.len() {
        let line_end = match text[line_start..].find('\n') {
            Some(i) => line_start + i + 1,
            None => text.len(),
        };
        let terminated = text.as_bytes()[line_end - 1] == b'\n';
        let line = if terminated {
            &text[line_start..line_end - 1]
        } else {
            &text[line_start..line_end]
        };

        let forced_cut = process_line(&mut state, line, line_index);
        if forced_cut {
            safe_offset = Some(line_start);
        }

        // The forced cut wins over the general balance check for the
        // rest of this line.
        if terminated && !forced_cut && state.is_balanced() {
            safe_offset = Some(line_end);
        }

        line_start = line_end;
        line_index += 1;
    }

    ScanOutcome { safe_offset, state }
}

/// Process one line (without its trailing newline). Returns true when the
/// list-termination rule forces a cut at this line's start.
fn process_line(state: &mut ScanState, line: &str, line_index: usize) -> bool {
    // YAML front matter opens only as the very first line.
    if line_index == 0 && is_yaml_delimiter(line) {
        state.in_yaml = true;
        return false;
    }
    if state.in_yaml {
        if is_yaml_delimiter(line) {
            state.in_yaml = false;
        }
        return false;
    }

    if check_fence(state, line) {
        return false;
    }
    if state.in_fence {
        return false;
    }

    let is_item = LIST_ITEM_RE.is_match(line);

    // List termination forces a cut at this line's start: everything
    // before it is emitted, so the whole state starts over. Without the
    // reset, a scan over the full buffer and a rescan of the remainder
    // would disagree about what this line leaves open.
    let forced_cut = state.in_list && !is_item;
    if forced_cut {
        *state = ScanState::default();
    }

    let is_blank = line.trim().is_empty();
    if TABLE_ROW_RE.is_match(line) {
        if state.in_table && TABLE_SEPARATOR_RE.is_match(line) {
            state.table_separator_seen = true;
        } else {
            state.in_table = true;
            state.table_rows += 1;
        }
    } else if state.in_table && !is_blank {
        state.in_table = false;
        state.table_rows = 0;
        state.table_separator_seen = false;
    }

    if is_item {
        state.in_list = true;
        state.list_items += 1;
    }

    scan_inline(state, line);
    scan_html(state, line);
    scan_link_syntax(state, line);

    forced_cut
}

/// Exact `---` match with optional trailing whitespace.
fn is_yaml_delimiter(line: &str) -> bool {
    line.trim_end() == "---"
}

/// Detect a fence open or close. Returns true when the line was consumed
/// as a fence delimiter.
// SAFETY: the run prefix is all ASCII fence characters, so slicing at its
// end is at a char boundary.
#[allow(clippy::string_slice)]
fn check_fence(state: &mut ScanState, line: &str) -> bool {
    let trimmed = line.trim_start();
    let Some(fence_char) = trimmed.chars().next() else {
        return false;
    };
    if fence_char != '`' && fence_char != '~' {
        return false;
    }
    let run = trimmed.chars().take_while(|&c| c == fence_char).count();
    if run < 3 {
        return false;
    }
    let rest = &trimmed[run..];

    if state.in_fence {
        // Closes only with the same character, a run at least as long as
        // the opener, and nothing but whitespace after it.
        if fence_char == state.fence_char && run >= state.fence_len && rest.trim().is_empty() {
            state.in_fence = false;
            state.fence_char = '\0';
            state.fence_len = 0;
            return true;
        }
        false
    } else {
        state.in_fence = true;
        state.fence_char = fence_char;
        state.fence_len = run;
        true
    }
}

/// Inline-code and emphasis parity for one line.
fn scan_inline(state: &mut ScanState, line: &str) {
    let mut stars = 0usize;
    let mut underscores = 0usize;
    let bytes = line.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'`' => {
                let mut run = 1;
                while i + run < bytes.len() && bytes[i + run] == b'`' {
                    run += 1;
                }
                // Only single backticks toggle inline code; longer runs
                // are fence candidates or literal.
                if run == 1 {
                    state.inline_code = !state.inline_code;
                }
                i += run;
            }
            b'*' => {
                stars += 1;
                i += 1;
            }
            b'_' => {
                underscores += 1;
                i += 1;
            }
            _ => i += 1,
        }
    }
    if stars % 2 == 1 {
        state.emph_star = !state.emph_star;
    }
    if underscores % 2 == 1 {
        state.emph_underscore = !state.emph_underscore;
    }
}

/// Track open HTML tags on one line.
// SAFETY: the trimmed bytes are the ASCII `<` and `>` delimiters.
#[allow(clippy::string_slice)]
fn scan_html(state: &mut ScanState, line: &str) {
    for m in HTML_TAG_RE.find_iter(line) {
        let tag = m.as_str();
        let inner = &tag[1..tag.len() - 1];
        if let Some(name_part) = inner.strip_prefix('/') {
            let name = tag_name(name_part);
            // Close the nearest matching open tag; unmatched closers are
            // tolerated.
            if let Some(pos) = state.html_stack.iter().rposition(|open| *open == name) {
                state.html_stack.remove(pos);
            }
        } else {
            if inner.ends_with('/') {
                continue;
            }
            let name = tag_name(inner);
            // `<https://…>` and `<user@host>` autolinks are not tags.
            let rest = &inner[name.len()..];
            if !(rest.is_empty() || rest.starts_with(char::is_whitespace)) {
                continue;
            }
            if VOID_ELEMENTS.contains(&name.as_str()) {
                continue;
            }
            state.html_stack.push(name);
        }
    }
}

fn tag_name(inner: &str) -> String {
    inner
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect::<String>()
        .to_ascii_lowercase()
}

/// Link brackets and the `[text](` dangling-paren flag for one line.
fn scan_link_syntax(state: &mut ScanState, line: &str) {
    let opens = line.bytes().filter(|&b| b == b'[').count();
    let closes = line.bytes().filter(|&b| b == b']').count();
    state.open_brackets = (state.open_brackets + opens).saturating_sub(closes);

    if line.contains(')') {
        state.link_paren_open = false;
    }
    if DANGLING_LINK_RE.is_match(line) {
        state.link_paren_open = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_after(text: &str) -> ScanState {
        scan(text).state
    }

    fn safe(text: &str) -> Option<usize> {
        scan(text).safe_offset
    }

    #[test]
    fn plain_line_is_safe_at_its_newline() {
        assert_eq!(safe("hello world\n"), Some(12));
    }

    #[test]
    fn no_newline_means_no_boundary() {
        assert_eq!(safe("hello"), None);
    }

    #[test]
    fn open_fence_blocks_all_boundaries() {
        assert_eq!(safe("```js\nx = 1\n"), None);
        assert!(state_after("```js\nx = 1\n").in_fence);
    }

    #[test]
    fn closed_fence_is_safe_after_the_closer() {
        let text = "```js\nx = 1\n```\n";
        assert_eq!(safe(text), Some(text.len()));
    }

    #[test]
    fn fence_close_requires_same_char_and_length() {
        assert!(state_after("````\ncode\n```\n").in_fence);
        assert!(state_after("~~~\ncode\n```\n").in_fence);
        assert!(!state_after("```\ncode\n`````\n").in_fence);
    }

    #[test]
    fn fence_content_never_toggles_inline_state() {
        let state = state_after("```\n*stars* and `ticks\n```\n");
        assert!(!state.emph_star);
        assert!(!state.inline_code);
    }

    #[test]
    fn yaml_front_matter_opens_on_first_line_only() {
        assert!(state_after("---\ntitle: x\n").in_yaml);
        assert!(!state_after("text\n---\ntitle: x\n").in_yaml);
    }

    #[test]
    fn yaml_front_matter_closes_on_matching_delimiter() {
        let text = "---\ntitle: x\n---\nbody\n";
        assert_eq!(safe(text), Some(text.len()));
    }

    #[test]
    fn inline_code_parity_counts_only_single_backtick_runs() {
        assert!(state_after("start of `code\n").inline_code);
        assert!(!state_after("use `x` here\n").inline_code);
        assert!(!state_after("a ``literal`` run\n").inline_code);
    }

    #[test]
    fn emphasis_parity_flips_on_odd_counts() {
        assert!(state_after("*open\n").emph_star);
        assert!(!state_after("*closed*\n").emph_star);
        assert!(state_after("snake_case\n").emph_underscore);
        assert!(!state_after("two_under_scores\n").emph_underscore);
    }

    #[test]
    fn html_stack_tracks_nesting_and_skips_voids() {
        let state = state_after("<div><span>x</span>\n");
        assert_eq!(state.html_stack, vec!["div".to_string()]);
        assert!(state_after("<br> and <img src=\"x\"/>\n").html_stack.is_empty());
    }

    #[test]
    fn autolinks_are_not_html_tags() {
        assert!(state_after("<https://example.com> and <user@example.com>\n")
            .html_stack
            .is_empty());
    }

    #[test]
    fn html_close_removes_nearest_match() {
        let state = state_after("<div><em>a<div>b</div>\n");
        assert_eq!(state.html_stack, vec!["div".to_string(), "em".to_string()]);
    }

    #[test]
    fn brackets_clamp_at_zero_per_line() {
        assert_eq!(state_after("]] [\n").open_brackets, 0);
        assert_eq!(state_after("[a [b]\n").open_brackets, 1);
    }

    #[test]
    fn dangling_link_paren_sets_and_clears() {
        assert!(state_after("see [here](\n").link_paren_open);
        assert!(state_after("see [here](https://x\n").link_paren_open);
        assert!(!state_after("see [here](https://x)\n").link_paren_open);
    }

    #[test]
    fn table_incomplete_until_separator_and_third_row() {
        assert_eq!(safe("|A|B|\n"), None);
        assert_eq!(safe("|A|B|\n|---|---|\n"), None);
        assert_eq!(safe("|A|B|\n|---|---|\n|1|2|\n"), None);
        let full = "|A|B|\n|---|---|\n|1|2|\n|3|4|\n";
        assert_eq!(safe(full), Some(full.len()));
    }

    #[test]
    fn table_terminates_on_non_table_line() {
        let text = "|A|B|\n|---|---|\n|1|2|\nptext\n";
        assert_eq!(safe(text), Some(text.len()));
    }

    #[test]
    fn table_tolerates_interior_blank_lines() {
        let state = state_after("|A|B|\n|---|---|\n\n|1|2|\n");
        assert!(state.in_table);
        assert_eq!(state.table_rows, 2);
    }

    #[test]
    fn separator_without_preceding_header_counts_as_row() {
        let state = state_after("|---|---|\n");
        assert!(state.in_table);
        assert!(!state.table_separator_seen);
        assert_eq!(state.table_rows, 1);
    }

    #[test]
    fn list_blocks_cut_until_terminated() {
        assert_eq!(safe("- a\n- b\n"), None);
    }

    #[test]
    fn blank_line_forces_cut_at_list_end() {
        // The cut lands at the start of the terminating blank line.
        assert_eq!(safe("- a\n- b\n\n"), Some(8));
    }

    #[test]
    fn non_list_line_forces_cut_and_holds_that_line() {
        assert_eq!(safe("- a\n  - b\n- c\n# Header\n"), Some(14));
    }

    #[test]
    fn empty_marker_terminates_list() {
        assert_eq!(safe("1. a\n2.\n"), Some(5));
    }

    #[test]
    fn ordered_items_are_recognized() {
        let state = state_after("1. one\n2. two\n");
        assert!(state.in_list);
        assert_eq!(state.list_items, 2);
    }

    #[test]
    fn forced_cut_resets_transient_state() {
        // The emphasis opened before the list belongs to the emitted
        // text; it must not hold back lines scanned after the cut.
        let text = "*open\n- a\n\ntext\n";
        assert_eq!(safe(text), Some(text.len()));
    }

    #[test]
    fn later_forced_cut_wins() {
        let text = "- a\n\n- b\n\n";
        assert_eq!(safe(text), Some(9));
    }
}
