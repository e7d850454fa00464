//! The `charalens similar` command: rank the catalog without an image.

use clap::Args;
use charalens_core::images::create_lookup;
use charalens_core::{Catalog, Config, SimilarCharacter};

/// Arguments for the `similar` command.
#[derive(Args, Debug)]
pub struct SimilarArgs {
    /// Character to compare against (excluded from results)
    pub name: String,

    /// Appearance tags, comma-separated
    #[arg(short, long, value_delimiter = ',')]
    pub tags: Vec<String>,

    /// Number of results (defaults to `catalog.top_n`)
    #[arg(short = 'n', long)]
    pub top_n: Option<usize>,

    /// Also look up a picture for each result
    #[arg(long)]
    pub images: bool,
}

/// Execute the similar command.
pub async fn execute(args: SimilarArgs, config: &Config) -> anyhow::Result<()> {
    let catalog = Catalog::load(&config.catalog_path());
    if catalog.is_empty() {
        anyhow::bail!(
            "Catalog at {} is empty or missing",
            config.catalog_path().display()
        );
    }

    let tags: Vec<String> = args
        .tags
        .iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    let top_n = args.top_n.unwrap_or(config.catalog.top_n);

    let mut similar: Vec<SimilarCharacter> = catalog.rank_similar(&args.name, &tags, top_n);

    if args.images {
        let lookup = create_lookup(config)?;
        for character in similar.iter_mut() {
            character.image_url = lookup.image_url_or_none(&character.name).await;
        }
    }

    println!("{}", serde_json::to_string_pretty(&similar)?);
    Ok(())
}
