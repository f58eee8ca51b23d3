use anyhow::Result;
use cascade_cli::cli::cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Logging failures must not stop the CLI; stdout stays usable either
    // way.
    let _guard = match cascade_cli::logging::setup_logging() {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: failed to initialize logging: {}", e);
            None
        }
    };

    cli().await
}
