use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use assessdb_core::catalog::CatalogReader;
use assessdb_core::config::expand_path;
use assessdb_embed::get_default_embedder;
use assessdb_index::{build, IndexStore};

#[derive(Parser, Debug)]
#[command(name = "assessdb-indexer", about = "Rebuild the assessment index from the scraped catalog")]
struct Cli {
    /// Catalog CSV files, concatenated in order. Defaults to `data.catalog_files`.
    #[arg(long = "catalog", value_name = "CSV")]
    catalogs: Vec<PathBuf>,

    /// Output directory for the index pair. Defaults to `data.index_dir`.
    #[arg(long)]
    index_dir: Option<PathBuf>,

    /// Report what is on disk and exit.
    #[arg(long)]
    status: bool,
}

fn main() -> anyhow::Result<()> {
    assessdb_cli::init_tracing();
    let cli = Cli::parse();
    let settings = assessdb_cli::load_settings()?;

    let index_dir = cli.index_dir.unwrap_or_else(|| expand_path(&settings.data.index_dir));
    let store = IndexStore::new(&index_dir);

    if cli.status {
        let status = store.status();
        println!("Index directory: {}", index_dir.display());
        println!("  index file:    {}", if status.index_present { "present" } else { "missing" });
        println!("  metadata file: {}", if status.metadata_present { "present" } else { "missing" });
        match (status.records, status.dim) {
            (Some(records), Some(dim)) => println!("  {records} records, dimension {dim}"),
            _ => println!("  index header unreadable or absent"),
        }
        return Ok(());
    }

    let catalogs: Vec<PathBuf> = if cli.catalogs.is_empty() {
        settings.data.catalog_files.iter().map(expand_path).collect()
    } else {
        cli.catalogs
    };
    println!("Assessment Indexer\n==================");
    for path in &catalogs {
        println!("Catalog: {}", path.display());
    }
    println!("Index directory: {}", index_dir.display());

    let records = CatalogReader::new().read_all(&catalogs)?;
    let embedder = get_default_embedder(&settings.embedding).context("failed to load the embedding model")?;
    let (index, records) = build(records, embedder.as_ref(), settings.embedding.batch_size)?;
    store
        .save(&index, &records)
        .with_context(|| format!("failed to write index pair to {}", index_dir.display()))?;

    println!("\n✅ Indexed {} assessments (dimension {})", records.len(), index.dim());
    println!("💡 To search, use: cargo run --bin assessdb-search '<query>'");
    Ok(())
}
