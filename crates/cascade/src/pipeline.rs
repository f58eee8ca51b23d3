//! Progressive render loop over the splitter.
//!
//! Owns the accumulation buffer: each incoming fragment is appended, the
//! splitter picks the largest safe prefix, the formatter renders it, and
//! the remainder stays buffered for the next fragment. At end of stream
//! the remainder is flushed, repaired after a normal completion and raw
//! after a cancellation. Emission is monotonic: previously emitted bytes
//! are never re-rendered or retracted.

use crate::splitter::{repair::repair, split};
use tracing::trace;

/// Renders a safe Markdown prefix into terminal-ready text.
///
/// Implementations must be synchronous; the pipeline hands over borrowed
/// text and expects an owned result back before it yields.
pub trait Formatter {
    fn format(&self, markdown: &str) -> String;
}

impl<T: Formatter + ?Sized> Formatter for Box<T> {
    fn format(&self, markdown: &str) -> String {
        (**self).format(markdown)
    }
}

/// Formatter that returns the Markdown unchanged. Used when the terminal
/// does not support styling and in tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassthroughFormatter;

impl Formatter for PassthroughFormatter {
    fn format(&self, markdown: &str) -> String {
        markdown.to_string()
    }
}

/// Lifecycle of one streamed response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamPhase {
    /// No active stream.
    Idle,
    /// Fragments are arriving; each one triggers a split.
    Streaming,
    /// The stream was aborted; the next flush emits the remainder raw.
    Cancelled,
}

/// The progressive render loop.
///
/// ```
/// use cascade::pipeline::{PassthroughFormatter, ProgressiveRenderer};
///
/// let mut renderer = ProgressiveRenderer::new(PassthroughFormatter);
/// assert_eq!(renderer.feed("hello "), None);
/// assert_eq!(renderer.feed("world\n"), Some("hello world\n".to_string()));
/// assert_eq!(renderer.finish(), None);
/// ```
pub struct ProgressiveRenderer<F: Formatter> {
    buffer: String,
    phase: StreamPhase,
    formatter: F,
}

impl<F: Formatter> ProgressiveRenderer<F> {
    pub fn new(formatter: F) -> Self {
        Self {
            buffer: String::new(),
            phase: StreamPhase::Idle,
            formatter,
        }
    }

    pub fn phase(&self) -> StreamPhase {
        self.phase
    }

    /// True when held-back text is awaiting more input.
    pub fn has_pending(&self) -> bool {
        !self.buffer.is_empty()
    }

    /// Append a fragment and render whatever became safe.
    ///
    /// Returns `None` when nothing new is safe yet. Fragments arriving
    /// after a cancellation are dropped.
    pub fn feed(&mut self, fragment: &str) -> Option<String> {
        if self.phase == StreamPhase::Cancelled {
            return None;
        }
        self.phase = StreamPhase::Streaming;
        self.buffer.push_str(fragment);

        let parts = split(&self.buffer);
        self.buffer = parts.remainder;
        if parts.closed.is_empty() {
            None
        } else {
            trace!(bytes = parts.closed.len(), "emitting safe prefix");
            Some(self.formatter.format(&parts.closed))
        }
    }

    /// Mark the stream as aborted. Held-back text stays buffered until
    /// [`finish`](Self::finish) flushes it (raw, without repair).
    pub fn cancel(&mut self) {
        self.phase = StreamPhase::Cancelled;
    }

    /// Flush the remainder and return to idle.
    ///
    /// After a normal end of stream the remainder goes through the repair
    /// pass first, so unterminated constructs render sanely. After a
    /// cancellation it is emitted as-is.
    pub fn finish(&mut self) -> Option<String> {
        let tail = std::mem::take(&mut self.buffer);
        let cancelled = self.phase == StreamPhase::Cancelled;
        self.phase = StreamPhase::Idle;

        if tail.is_empty() {
            return None;
        }
        let tail = if cancelled { tail } else { repair(&tail) };
        trace!(bytes = tail.len(), cancelled, "flushing remainder");
        Some(self.formatter.format(&tail))
    }

    /// Discard the buffer and state, e.g. on a new turn.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.phase = StreamPhase::Idle;
    }
}
