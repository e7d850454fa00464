//! The `charalens labels` command for the class-index label map.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use charalens_core::LabelMap;

/// Arguments for the `labels` command.
#[derive(Args, Debug)]
pub struct LabelsArgs {
    #[command(subcommand)]
    pub command: LabelsCommand,
}

#[derive(Subcommand, Debug)]
pub enum LabelsCommand {
    /// Write class_names.json from a dataset's class folders
    Generate {
        /// Dataset directory containing one folder per character
        dataset_dir: PathBuf,

        /// Output file
        #[arg(short, long, default_value = "class_names.json")]
        output: PathBuf,
    },

    /// Print a label map
    Show {
        /// Label map file
        path: PathBuf,
    },
}

/// Execute the labels command.
pub async fn execute(args: LabelsArgs) -> anyhow::Result<()> {
    match args.command {
        LabelsCommand::Generate {
            dataset_dir,
            output,
        } => {
            let labels = LabelMap::from_dataset_dir(&dataset_dir)?;
            std::fs::write(&output, labels.to_json())?;
            tracing::info!(
                "Wrote {} classes from {:?} to {:?}",
                labels.len(),
                dataset_dir,
                output
            );
            println!("Found {} classes. Saved to {}", labels.len(), output.display());
        }

        LabelsCommand::Show { path } => {
            let labels = LabelMap::load(&path)?;
            for (index, name) in labels.names().iter().enumerate() {
                println!("{index:>5}  {name}");
            }
        }
    }

    Ok(())
}
