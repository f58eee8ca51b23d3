//! Terminal output: Markdown formatting and styled notices.

use cascade::pipeline::Formatter;
use console::style;

use crate::config::Theme;

/// Renders Markdown to ANSI via bat.
///
/// Falls back to the raw text if bat cannot print, so a highlighting
/// failure never loses response content.
pub struct MarkdownFormatter {
    theme: Theme,
}

impl MarkdownFormatter {
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }
}

impl Formatter for MarkdownFormatter {
    fn format(&self, markdown: &str) -> String {
        let mut rendered = String::new();
        let result = bat::PrettyPrinter::new()
            .input_from_bytes(markdown.as_bytes())
            .language("Markdown")
            .theme(self.theme.as_bat_theme())
            .print_with_writer(Some(&mut rendered));
        match result {
            Ok(_) => rendered,
            Err(err) => {
                tracing::warn!("markdown rendering failed: {err}");
                markdown.to_string()
            }
        }
    }
}

/// Model reasoning is shown dimmed, outside the Markdown pipeline.
pub fn render_reasoning(text: &str) {
    print!("{}", style(text).dim());
}

pub fn render_error(message: &str) {
    eprintln!("{} {}", style("error:").red().bold(), message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formatter_preserves_content() {
        let formatter = MarkdownFormatter::new(Theme::Ansi);
        let rendered = formatter.format("plain words\n");
        assert!(rendered.contains("plain words"));
    }
}
