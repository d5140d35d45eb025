//! mintytag - self-hosted audio tag editor
//!
//! Serves the editor UI and API on localhost; the editing session lives in
//! memory and is gone when the process exits.

use anyhow::Result;
use clap::Parser;
use mintytag::config::{Args, Config};
use mintytag::{build_router, AppState};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting mintytag v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();
    let config = Config::resolve(&args)?;
    if let Some(folder) = &config.music_folder {
        info!("Music folder: {}", folder.display());
    }
    if let Some(folder) = &config.output_folder {
        info!("Output folder: {}", folder.display());
    } else {
        info!("No output folder configured; saves fall back to downloads");
    }

    let port = config.port;
    let state = AppState::new(config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    info!("mintytag listening on http://127.0.0.1:{port}");

    axum::serve(listener, app).await?;

    Ok(())
}
