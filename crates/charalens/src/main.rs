//! Charalens CLI - anime character recognition service.
//!
//! Charalens classifies an uploaded image with a locally-run ONNX model,
//! fetches a short profile of the character from a text-generation API, and
//! suggests look-alike characters from a tag catalog.
//!
//! # Usage
//!
//! ```bash
//! # Run the HTTP API
//! charalens serve --port 8000
//!
//! # Recognize a single image from disk
//! charalens recognize anya.jpg
//!
//! # Rank catalog characters by tags
//! charalens similar "Anya Forger" --tags "pink hair,green eyes"
//!
//! # Build the label map from a training dataset
//! charalens labels generate ./dataset/train -o class_names.json
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Charalens - recognize anime characters from images.
#[derive(Parser, Debug)]
#[command(name = "charalens")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Config file to use instead of the platform default
    #[arg(long, global = true, env = "CHARALENS_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP recognition API
    Serve(cli::serve::ServeArgs),

    /// Recognize the character in an image file
    Recognize(cli::recognize::RecognizeArgs),

    /// Rank catalog characters by tag similarity
    Similar(cli::similar::SimilarArgs),

    /// Manage the class-index label map
    Labels(cli::labels::LabelsArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let config = cli::load_config(cli.config.as_deref())?;
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Charalens v{}", charalens_core::VERSION);

    match cli.command {
        Commands::Serve(args) => cli::serve::execute(args, config).await,
        Commands::Recognize(args) => cli::recognize::execute(args, &config).await,
        Commands::Similar(args) => cli::similar::execute(args, &config).await,
        Commands::Labels(args) => cli::labels::execute(args).await,
        Commands::Config(args) => cli::config::execute(args, cli.config.as_deref()).await,
    }
}
