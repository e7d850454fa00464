//! The `charalens recognize` command: run one image through the full flow.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use charalens_core::{Config, Recognizer};

/// Arguments for the `recognize` command.
#[derive(Args, Debug)]
pub struct RecognizeArgs {
    /// Image file to recognize
    pub image: PathBuf,

    /// Print compact single-line JSON
    #[arg(long)]
    pub compact: bool,
}

/// Execute the recognize command.
///
/// The format is detected from the file's magic bytes, not its extension.
pub async fn execute(args: RecognizeArgs, config: &Config) -> anyhow::Result<()> {
    let path = PathBuf::from(shellexpand::tilde(&args.image.to_string_lossy()).into_owned());
    let bytes = std::fs::read(&path).with_context(|| format!("Cannot read {}", path.display()))?;

    let startup_config = config.clone();
    let recognizer =
        tokio::task::spawn_blocking(move || Recognizer::from_config(&startup_config)).await??;

    let result = recognizer.recognize(bytes, None).await?;

    if let Some(reason) = &result.enrichment_error {
        tracing::warn!("No character details: {reason}");
    }

    let json = if args.compact {
        serde_json::to_string(&result)?
    } else {
        serde_json::to_string_pretty(&result)?
    };
    println!("{json}");
    Ok(())
}
