use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tallybook::client;
use tallybook::config::{Settings, TallyPaths};
use tallybook::protocol::{Request, Router};
use tallybook::storage::Storage;

#[derive(Parser)]
#[command(
    name = "tallybook",
    version,
    about = "Personal-finance ledger served through request/reply endpoints",
    long_about = "tallybook keeps a flat ledger of income and expense \
                  transactions and serves it through summary, edit, delete, \
                  and search endpoints. Run without a subcommand for the \
                  interactive menu."
)]
struct Cli {
    /// Override the data directory
    #[arg(long, env = "TALLYBOOK_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a summary report
    Summary {
        /// "all" or the number of days back to include
        #[arg(default_value = "all")]
        window: String,
    },

    /// Search transactions by keyword
    Search { keyword: String },

    /// Filter transactions by exact amount
    Filter { amount: String },

    /// Show resolved configuration and paths
    Config,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let paths = match cli.data_dir {
        Some(dir) => TallyPaths::with_base_dir(dir),
        None => TallyPaths::new()?,
    };
    let settings = Settings::load_or_create(&paths)?;
    let storage = Arc::new(Storage::new(paths.clone())?);
    let mut router = Router::new(Arc::clone(&storage), &settings);

    match cli.command {
        Some(Commands::Summary { window }) => {
            client::print_response(router.route(&Request::summary(window)));
        }
        Some(Commands::Search { keyword }) => {
            client::print_response(router.route(&Request::search_keyword(keyword)));
        }
        Some(Commands::Filter { amount }) => {
            client::print_response(router.route(&Request::filter_amount(amount)));
        }
        Some(Commands::Config) => {
            println!("Base directory:    {}", paths.base_dir().display());
            println!("Transactions file: {}", paths.transactions_file().display());
            println!("History file:      {}", paths.history_file().display());
            println!("Settings file:     {}", paths.settings_file().display());
        }
        None => client::run(&storage, &mut router)?,
    }

    Ok(())
}
