//! One streamed response turn: consume events, render progressively.

pub mod input;
pub mod output;
pub mod streaming;

use cascade::pipeline::Formatter;
use cascade::stream::StreamEvent;
use futures::{Stream, StreamExt};
use std::io;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use self::streaming::StreamingRenderer;

/// How a turn ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The stream finished normally; the tail was flushed with repair.
    Completed,
    /// The user interrupted; the tail was flushed raw.
    Cancelled,
    /// The producer reported an error after the tail was flushed.
    Failed { message: String },
}

/// Render one response stream to stdout.
///
/// Events are processed strictly in arrival order. Only `Content` goes
/// through the Markdown pipeline; reasoning is printed dimmed as it
/// arrives, and a producer error ends the turn after a best-effort flush
/// of whatever was held back.
pub async fn run_turn<F, S>(
    formatter: F,
    mut events: S,
    cancel: CancellationToken,
) -> io::Result<TurnOutcome>
where
    F: Formatter,
    S: Stream<Item = StreamEvent> + Unpin,
{
    let mut renderer = StreamingRenderer::new(formatter);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("turn cancelled by user");
                renderer.cancel();
                renderer.finalize()?;
                return Ok(TurnOutcome::Cancelled);
            }
            event = events.next() => match event {
                Some(StreamEvent::Content { text }) => {
                    renderer.push(&text)?;
                }
                Some(StreamEvent::Reasoning { text }) => {
                    output::render_reasoning(&text);
                }
                Some(StreamEvent::Error { message }) => {
                    debug!(%message, "stream reported an error");
                    renderer.finalize()?;
                    output::render_error(&message);
                    return Ok(TurnOutcome::Failed { message });
                }
                Some(StreamEvent::EndOfStream) | None => {
                    renderer.finalize()?;
                    return Ok(TurnOutcome::Completed);
                }
            }
        }
    }
}
