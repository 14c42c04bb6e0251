#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

use anyhow::Result;
use clap::Parser;

mod app;
mod cli;

use cli::commands::Cli;
use nanobanana::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Both ring and aws-lc-rs may be compiled in; pick one explicitly.
    if let Err(e) = rustls::crypto::ring::default_provider().install_default() {
        eprintln!("Warning: Failed to install default crypto provider: {e:?}");
    }

    let cli = Cli::parse();
    let config = Config::load_or_init(cli.config.as_deref())?;
    nanobanana::observability::init_logging(&config.app)?;

    app::dispatch::dispatch(cli, config).await
}
