//! Events produced by an upstream response stream.
//!
//! Provider adapters unwrap their transport (SSE, chunked HTTP, JSON
//! lines) into this sum type; only [`StreamEvent::Content`] feeds the
//! Markdown pipeline.

use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

/// One event from the upstream producer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// A fragment of the response body. Arbitrary size, arbitrary split
    /// points, potentially mid-word.
    Content { text: String },
    /// A fragment of model reasoning, rendered outside the Markdown
    /// pipeline.
    Reasoning { text: String },
    /// A transport or provider error; terminates the turn.
    Error { message: String },
    /// Normal end of the response.
    EndOfStream,
}

/// Ordered stream of events for one response.
pub type EventStream = BoxStream<'static, StreamEvent>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_round_trip_through_json() {
        let events = vec![
            StreamEvent::Content {
                text: "hello".to_string(),
            },
            StreamEvent::Reasoning {
                text: "thinking".to_string(),
            },
            StreamEvent::Error {
                message: "connection reset".to_string(),
            },
            StreamEvent::EndOfStream,
        ];
        for event in events {
            let json = serde_json::to_string(&event).unwrap();
            assert_eq!(serde_json::from_str::<StreamEvent>(&json).unwrap(), event);
        }
    }

    #[test]
    fn wire_format_is_tagged_snake_case() {
        let json = r#"{"type":"content","text":"hi"}"#;
        assert_eq!(
            serde_json::from_str::<StreamEvent>(json).unwrap(),
            StreamEvent::Content {
                text: "hi".to_string()
            }
        );
        assert_eq!(
            serde_json::to_string(&StreamEvent::EndOfStream).unwrap(),
            r#"{"type":"end_of_stream"}"#
        );
    }
}
