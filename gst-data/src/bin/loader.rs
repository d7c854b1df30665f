use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use gst_core::JurisdictionRegistry;
use gst_data::{ClientLoader, ServiceItemLoader};
use gst_db_sqlite::SqliteRepository;

/// Import service items and clients from CSV files into the invoice database.
///
/// `service_items.csv` columns: name, sac_code, unit_price, tax_rate
///
/// `clients.csv` columns: name, gstin, state_code, address, email, phone
///
/// Empty cells are treated as absent. Every row is validated before
/// anything is written; re-running an import updates rows in place.
#[derive(Parser, Debug)]
#[command(name = "gst-data-loader")]
#[command(version, about, long_about = None)]
struct Args {
    /// CSV file of service items to import
    #[arg(short, long)]
    items: Option<PathBuf>,

    /// CSV file of clients to import
    #[arg(short, long)]
    clients: Option<PathBuf>,

    /// SQLite database path or URL (created if missing)
    #[arg(short, long, default_value = "invoices.db")]
    database: String,

    /// Run database migrations before loading data
    #[arg(short, long, default_value_t = false)]
    migrate: bool,

    /// Run seed files from the specified directory after migrations
    #[arg(short, long)]
    seeds: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.items.is_none() && args.clients.is_none() && !args.migrate && args.seeds.is_none() {
        bail!("nothing to do: pass --items, --clients, --migrate or --seeds");
    }

    let repo = SqliteRepository::new(&args.database)
        .await
        .with_context(|| format!("Failed to connect to database: {}", args.database))?;

    if args.migrate {
        println!("Running migrations...");
        repo.run_migrations()
            .await
            .context("Failed to run migrations")?;
        println!("Migrations complete.");
    }

    if let Some(seeds_dir) = &args.seeds {
        println!("Running seeds from: {}", seeds_dir.display());
        repo.run_seeds(seeds_dir)
            .await
            .with_context(|| format!("Failed to run seeds from: {}", seeds_dir.display()))?;
        println!("Seeds complete.");
    }

    if let Some(path) = &args.items {
        println!("Loading service items from: {}", path.display());
        let file =
            File::open(path).with_context(|| format!("Failed to open: {}", path.display()))?;
        let records = ServiceItemLoader::parse(file)
            .with_context(|| format!("Failed to parse CSV: {}", path.display()))?;
        println!("Parsed {} records from CSV", records.len());

        let summary = ServiceItemLoader::load(&repo, &records)
            .await
            .context("Failed to load service items into database")?;
        println!(
            "Service items: {} created, {} updated.",
            summary.created, summary.updated
        );
    }

    if let Some(path) = &args.clients {
        println!("Loading clients from: {}", path.display());
        let file =
            File::open(path).with_context(|| format!("Failed to open: {}", path.display()))?;
        let records = ClientLoader::parse(file)
            .with_context(|| format!("Failed to parse CSV: {}", path.display()))?;
        println!("Parsed {} records from CSV", records.len());

        let registry = JurisdictionRegistry::india();
        let summary = ClientLoader::load(&repo, &registry, &records)
            .await
            .context("Failed to load clients into database")?;
        println!(
            "Clients: {} created, {} updated.",
            summary.created, summary.updated
        );
    }

    Ok(())
}
