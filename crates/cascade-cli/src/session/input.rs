//! Fragment sources for a session.
//!
//! The transport contract is deliberately thin: ordered text fragments
//! in, nothing else. `fragments` adapts a raw byte reader (stdin in the
//! CLI); `events` parses the JSON-lines form a provider adapter records.

use async_stream::stream;
use cascade::stream::StreamEvent;
use futures::Stream;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};

#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("failed to read stream: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed event on line {line}: {source}")]
    Malformed {
        line: usize,
        source: serde_json::Error,
    },
}

/// Raw text fragments from a byte reader.
///
/// Reads are chunk-sized, so a multi-byte character can arrive split in
/// two; incomplete trailing bytes are carried into the next read instead
/// of being lossily decoded.
pub fn fragments<R>(reader: R) -> impl Stream<Item = std::io::Result<StreamEvent>>
where
    R: AsyncRead + Unpin,
{
    stream! {
        let mut reader = reader;
        let mut pending: Vec<u8> = Vec::new();
        let mut buf = [0u8; 8192];
        loop {
            match reader.read(&mut buf).await {
                Ok(0) => {
                    if !pending.is_empty() {
                        yield Ok(StreamEvent::Content {
                            text: String::from_utf8_lossy(&pending).into_owned(),
                        });
                    }
                    yield Ok(StreamEvent::EndOfStream);
                    break;
                }
                Ok(n) => {
                    pending.extend_from_slice(&buf[..n]);
                    let valid = match std::str::from_utf8(&pending) {
                        Ok(_) => pending.len(),
                        Err(err) => err.valid_up_to(),
                    };
                    if valid > 0 {
                        let rest = pending.split_off(valid);
                        let text = String::from_utf8(std::mem::replace(&mut pending, rest))
                            .unwrap_or_default();
                        yield Ok(StreamEvent::Content { text });
                    }
                }
                Err(err) => {
                    yield Err(err);
                    break;
                }
            }
        }
    }
}

/// JSON-lines [`StreamEvent`]s from a byte reader. Blank lines are
/// skipped; parsing stops at the first malformed line.
pub fn events<R>(reader: R) -> impl Stream<Item = Result<StreamEvent, ReplayError>>
where
    R: AsyncRead + Unpin,
{
    stream! {
        let mut lines = BufReader::new(reader).lines();
        let mut line_number = 0usize;
        loop {
            line_number += 1;
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    match serde_json::from_str::<StreamEvent>(&line) {
                        Ok(event) => yield Ok(event),
                        Err(source) => {
                            yield Err(ReplayError::Malformed { line: line_number, source });
                            break;
                        }
                    }
                }
                Ok(None) => break,
                Err(err) => {
                    yield Err(err.into());
                    break;
                }
            }
        }
    }
}
