//! Command-line surface.

use anyhow::Result;
use cascade::pipeline::{Formatter, PassthroughFormatter};
use cascade::stream::StreamEvent;
use clap::{Parser, Subcommand};
use futures::StreamExt;
use std::io::IsTerminal;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::{Config, Theme};
use crate::session::{self, input, output, TurnOutcome};

#[derive(Parser)]
#[command(
    name = "cascade",
    version,
    about = "A chat CLI that streams Markdown to your terminal"
)]
pub struct Cli {
    /// Rendering theme: light, dark, or ansi
    #[arg(long, global = true)]
    theme: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a raw text stream from stdin progressively
    Render {
        /// Pass text through without Markdown rendering
        #[arg(long)]
        no_markdown: bool,
    },
    /// Replay a recorded stream of JSON-line events from stdin
    Replay,
}

pub async fn cli() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::global();

    let theme = match cli.theme.as_deref() {
        Some(value) => Theme::try_from(value).map_err(|e| anyhow::anyhow!(e))?,
        None => config.theme,
    };

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal_cancel.cancel();
        }
    });

    let outcome = match cli.command {
        Command::Render { no_markdown } => {
            let formatter = choose_formatter(theme, config.markdown && !no_markdown);
            let events = input::fragments(tokio::io::stdin()).map(|result| match result {
                Ok(event) => event,
                Err(err) => StreamEvent::Error {
                    message: err.to_string(),
                },
            });
            session::run_turn(formatter, Box::pin(events), cancel).await?
        }
        Command::Replay => {
            let formatter = choose_formatter(theme, config.markdown);
            let events = input::events(tokio::io::stdin()).map(|result| match result {
                Ok(event) => event,
                Err(err) => StreamEvent::Error {
                    message: err.to_string(),
                },
            });
            session::run_turn(formatter, Box::pin(events), cancel).await?
        }
    };

    debug!(?outcome, "turn finished");
    match outcome {
        TurnOutcome::Failed { message } => Err(anyhow::anyhow!(message)),
        TurnOutcome::Completed | TurnOutcome::Cancelled => Ok(()),
    }
}

/// Markdown rendering only makes sense on a real terminal; piped output
/// gets the text untouched.
fn choose_formatter(theme: Theme, markdown: bool) -> Box<dyn Formatter> {
    if markdown && std::io::stdout().is_terminal() {
        Box::new(output::MarkdownFormatter::new(theme))
    } else {
        Box::new(PassthroughFormatter)
    }
}
