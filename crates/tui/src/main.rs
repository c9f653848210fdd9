mod app;
mod client;
mod config;
mod error;
mod export;
mod ui;

use crate::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::load()?;

    // Logs go to stderr so they never bleed into the alternate screen.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("STASH_TUI_LOG").unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(format!(
                    "stash_tui={level},engine={level}",
                    level = config.log_level
                ))
            }),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut app = app::App::new(config)?;
    app.run().await?;
    Ok(())
}
