mod lookup;
mod search;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "resfind")]
#[command(about = "Search the 211 resource directory from the command line")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search for resources by category or keyword, optionally near a location
    Search(search::SearchArgs),
    /// List the categories and subcategories in the taxonomy file
    Categories {
        #[arg(long, env = "RESFIND_TAXONOMY_PATH", default_value = "./config/taxonomy.yaml")]
        taxonomy: PathBuf,
    },
    /// Look up the coordinates of a ZIP code
    Zip {
        zip: String,
        #[arg(long, env = "RESFIND_ZIP_TABLE_PATH", default_value = "./data/zipcodes.csv")]
        table: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("warn"))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Search(args)) => search::run_search(args).await?,
        Some(Commands::Categories { taxonomy }) => lookup::run_categories(&taxonomy)?,
        Some(Commands::Zip { zip, table }) => lookup::run_zip(&zip, &table)?,
        None => println!("no command given; run `resfind --help` for usage"),
    }

    Ok(())
}
