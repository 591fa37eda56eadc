//! hh.ru vacancy collector CLI
//!
//! Local entry point for searching, browsing and exporting vacancies.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use hh_vacancies::{
    error::Result,
    models::Config,
    pipeline::{self, MenuContext},
    services::{CurrencyRates, HhClient, RateSource},
    storage::JsonStore,
};

/// hh-vacancies - hh.ru vacancy collector
#[derive(Parser, Debug)]
#[command(
    name = "hh-vacancies",
    version,
    about = "Search hh.ru vacancies and keep them in a local JSON store"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "data/config.toml")]
    config: PathBuf,

    /// Override the vacancy store location from the config
    #[arg(long)]
    store: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search hh.ru and store every result
    Search {
        /// Search query
        keyword: String,

        /// Number of result pages to fetch
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        pages: u32,

        /// Delete the existing store before saving
        #[arg(long)]
        fresh: bool,
    },

    /// Fetch and print a single vacancy
    Details {
        /// hh.ru vacancy id
        id: String,
    },

    /// Print the N best-paid stored vacancies
    Top {
        #[arg(value_parser = clap::value_parser!(u64).range(1..))]
        n: u64,
    },

    /// Print stored vacancies whose name contains a keyword
    Find {
        keyword: String,
    },

    /// Remove a vacancy from the store
    Delete {
        id: String,
    },

    /// Export the store to CSV
    Export {
        /// Output path (default: storage.csv_file from the config)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the current currency rates
    Rates,

    /// Start the interactive menu
    Menu,
}

/// Initialize logging.
///
/// Returns `true` when `--verbose` or `RUST_LOG` fixed the level, so the
/// configured `logging.level` must not narrow it.
fn init_logging(verbose: bool) -> bool {
    let from_env = std::env::var_os("RUST_LOG").is_some();
    // Everything passes until the config level is applied.
    let level = if verbose { "debug" } else { "trace" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
    verbose || from_env
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level_fixed = init_logging(cli.verbose);

    let config = Config::load_or_default(&cli.config);
    if let Err(e) = config.validate() {
        log::error!("Config validation failed: {}", e);
        return Err(e);
    }
    if !level_fixed {
        log::set_max_level(config.logging.level_filter()?);
    }
    log::debug!("Using configuration from {}", cli.config.display());

    let store_path = cli
        .store
        .unwrap_or_else(|| PathBuf::from(&config.storage.vacancies_file));

    let client = Arc::new(HhClient::new(&config.api)?);
    let rates = CurrencyRates::new(Arc::clone(&client) as Arc<dyn RateSource>);

    match cli.command {
        Command::Search {
            keyword,
            pages,
            fresh,
        } => {
            let store = JsonStore::open(&store_path, fresh).await?;
            let outcome = pipeline::run_search(
                &*client,
                &rates,
                &store,
                &config.conversion,
                &keyword,
                pages,
            )
            .await?;

            println!(
                "Found {} vacancies, stored {} in {}",
                outcome.fetched,
                outcome.stored,
                store_path.display()
            );
            if outcome.skipped > 0 {
                println!("Skipped {} unusable records", outcome.skipped);
            }
        }

        Command::Details { id } => {
            let vacancy =
                pipeline::run_details(&*client, &rates, &config.conversion, &id).await?;
            println!("{vacancy}");
        }

        Command::Top { n } => {
            let store = JsonStore::new(&store_path);
            let vacancies = pipeline::run_top(&store, n as usize).await?;
            if vacancies.is_empty() {
                println!("The store is empty.");
            }
            pipeline::print_vacancies(&mut io::stdout(), &vacancies)?;
        }

        Command::Find { keyword } => {
            let store = JsonStore::new(&store_path);
            let vacancies = pipeline::run_find(&store, &keyword).await?;
            println!(
                "Found {} vacancies with \"{}\" in the name",
                vacancies.len(),
                keyword
            );
            pipeline::print_vacancies(&mut io::stdout(), &vacancies)?;
        }

        Command::Delete { id } => {
            let store = JsonStore::new(&store_path);
            pipeline::run_delete(&store, &id).await?;
            println!("Deleted vacancy {id}");
        }

        Command::Export { output } => {
            let store = JsonStore::new(&store_path);
            let output = output.unwrap_or_else(|| PathBuf::from(&config.storage.csv_file));
            let rows = pipeline::run_export(&store, &output).await?;
            println!("Exported {} vacancies to {}", rows, output.display());
        }

        Command::Rates => {
            rates.try_load_rates().await?;
            let table = rates.rates().await;

            let mut codes: Vec<_> = table.iter().collect();
            codes.sort_by(|a, b| a.0.cmp(b.0));
            for (code, rate) in codes {
                println!("{code}: {rate}");
            }
        }

        Command::Menu => {
            let store = JsonStore::new(&store_path);
            let ctx = MenuContext {
                api: &*client,
                rates: &rates,
                storage: &store,
                conversion: &config.conversion,
            };
            pipeline::run_menu(&ctx, io::stdin().lock(), io::stdout()).await?;
        }
    }

    Ok(())
}
