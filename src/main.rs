use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use newsreel::config::Config;
use newsreel::curate::Curator;
use newsreel::ingest;
use newsreel::store::JsonStore;

#[derive(Parser, Debug)]
#[command(name = "newsreel", about = "Category-tagged feed aggregator with a rolling news window")]
struct Args {
    /// Path to the TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Override the data directory from the config file
    #[arg(long)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one ingestion pass over all configured sources
    Ingest,
    /// Print a curated view from the persisted store (debugging aid)
    Show {
        /// View name: "featured" or a category
        #[arg(long, default_value = "featured")]
        view: String,
        /// Number of batches to print
        #[arg(long, default_value_t = 1)]
        pages: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let mut config = Config::load(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;
    if let Some(data_dir) = args.data_dir {
        config.data_dir = data_dir;
    }

    match args.command {
        Command::Ingest => {
            let report = ingest::run(&config)
                .await
                .context("Ingestion run failed")?;
            println!(
                "Ingested {} new items from {}/{} sources ({} entries seen)",
                report.new_items,
                report.sources_total - report.sources_failed,
                report.sources_total,
                report.entries_fetched,
            );
            println!(
                "Window: {} items ({} evicted to archive this run)",
                report.current_len, report.evicted
            );
        }
        Command::Show { view, pages } => {
            let store = JsonStore::new(&config.data_dir);
            let doc = store
                .load()
                .context("Failed to load persisted store")?;
            let curator = Curator::new(doc, config.curate.clone(), config.images.fallbacks.clone());

            let mut session = curator.session(&view);
            if session.total() == 0 {
                println!("No articles for view '{}'", view);
                return Ok(());
            }

            for page in 1..=pages {
                let batch = session.next_batch();
                if batch.is_empty() {
                    break;
                }
                println!("--- page {} ---", page);
                for item in batch {
                    println!("[{}] {} — {}", item.category, item.title, item.source);
                }
            }
            println!(
                "({} of {} items shown)",
                session.cursor(),
                session.total()
            );
        }
    }

    Ok(())
}
