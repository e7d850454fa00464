//! The `charalens serve` command: run the HTTP API.

use std::sync::Arc;

use clap::Args;
use charalens::server;
use charalens_core::{Config, Recognizer};

/// Arguments for the `serve` command.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to bind (overrides `server.host`)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind (overrides `server.port`)
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Execute the serve command.
pub async fn execute(args: ServeArgs, mut config: Config) -> anyhow::Result<()> {
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    // Model loading is blocking work.
    let startup_config = config.clone();
    let recognizer =
        tokio::task::spawn_blocking(move || Recognizer::from_config(&startup_config)).await??;

    server::serve(&config, Arc::new(recognizer)).await
}
