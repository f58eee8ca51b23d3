//! Streams rendered Markdown to stdout as it becomes safe.

use cascade::pipeline::{Formatter, ProgressiveRenderer};
use std::io::{self, Write};

/// Drives the progressive pipeline and writes each rendered prefix to
/// stdout in arrival order.
pub struct StreamingRenderer<F: Formatter> {
    pipeline: ProgressiveRenderer<F>,
}

impl<F: Formatter> StreamingRenderer<F> {
    pub fn new(formatter: F) -> Self {
        Self {
            pipeline: ProgressiveRenderer::new(formatter),
        }
    }

    /// Feed one fragment; print and return whatever became safe.
    pub fn push(&mut self, fragment: &str) -> io::Result<Option<String>> {
        let rendered = self.pipeline.feed(fragment);
        if let Some(ref text) = rendered {
            print!("{text}");
            io::stdout().flush()?;
        }
        Ok(rendered)
    }

    /// Stop rendering new fragments; the held-back text will be flushed
    /// raw by [`finalize`](Self::finalize).
    pub fn cancel(&mut self) {
        self.pipeline.cancel();
    }

    /// Flush the remainder at end of stream and return it.
    pub fn finalize(&mut self) -> io::Result<Option<String>> {
        let rendered = self.pipeline.finish();
        if let Some(ref text) = rendered {
            print!("{text}");
        }
        // End the streamed block cleanly even if the model stopped
        // mid-line.
        println!();
        io::stdout().flush()?;
        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cascade::pipeline::PassthroughFormatter;

    fn renderer() -> StreamingRenderer<PassthroughFormatter> {
        StreamingRenderer::new(PassthroughFormatter)
    }

    #[test]
    fn push_returns_safe_prefixes_only() {
        let mut r = renderer();
        assert_eq!(r.push("**bold").unwrap(), None);
        assert_eq!(
            r.push(" text**\ndone\n").unwrap(),
            Some("**bold text**\ndone\n".to_string())
        );
    }

    #[test]
    fn finalize_repairs_the_tail() {
        let mut r = renderer();
        assert_eq!(r.push("```sh\nls\n").unwrap(), None);
        assert_eq!(r.finalize().unwrap(), Some("```sh\nls\n```\n".to_string()));
    }

    #[test]
    fn cancel_then_finalize_flushes_raw() {
        let mut r = renderer();
        assert_eq!(r.push("```sh\nls\n").unwrap(), None);
        r.cancel();
        assert_eq!(r.finalize().unwrap(), Some("```sh\nls\n".to_string()));
    }
}
