//! Core library for the cascade chat CLI: a progressive streaming
//! Markdown splitter and the render pipeline built on top of it.
//!
//! The splitter takes the accumulated text of an in-flight LLM response
//! and returns the longest prefix that is safe to render as Markdown
//! right now; the pipeline owns that accumulation, drives a formatter,
//! and flushes (with repair) at end of stream.

pub mod pipeline;
pub mod splitter;
pub mod stream;

pub use pipeline::{Formatter, PassthroughFormatter, ProgressiveRenderer, StreamPhase};
pub use splitter::{split, Split};
pub use stream::{EventStream, StreamEvent};
