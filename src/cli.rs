use clap::{Parser, Subcommand};

use crate::commands;
use crate::error::Result;
use crate::models::SyncConfig;
use crate::utils::normalize_base_url;

#[derive(Parser)]
#[command(name = "tradewatch")]
#[command(
    about = "Live polling and chart-sync engine for a trading bot dashboard",
    long_about = None
)]
pub struct Cli {
    /// Bot backend base URL (overrides TRADEWATCH_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Exchange base URL (overrides TRADEWATCH_EXCHANGE_URL)
    #[arg(long, global = true)]
    pub exchange_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the engine and expose snapshots over HTTP
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value_t = 3000)]
        port: u16,

        /// Initial symbol (defaults to the first elite instrument)
        #[arg(short, long)]
        symbol: Option<String>,
    },
    /// Run the engine and print a status line periodically
    Watch {
        #[arg(short, long)]
        symbol: Option<String>,

        /// Seconds between status lines
        #[arg(short, long, default_value_t = 5)]
        every: u64,
    },
    /// Fetch every data group once and print the result
    Status {
        #[arg(short, long)]
        symbol: Option<String>,
    },
    /// List elite and scanned instruments
    Instruments,
}

impl Cli {
    /// Environment configuration with command-line overrides applied
    pub fn config(&self) -> Result<SyncConfig> {
        let mut config = SyncConfig::from_env()?;
        if let Some(url) = &self.api_url {
            config.api_url = normalize_base_url(url)?;
        }
        if let Some(url) = &self.exchange_url {
            config.exchange_url = normalize_base_url(url)?;
        }
        config.validate()
    }
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.config()?;

    match cli.command {
        Commands::Serve { port, symbol } => commands::serve::run(config, port, symbol).await,
        Commands::Watch { symbol, every } => commands::watch::run(config, symbol, every).await,
        Commands::Status { symbol } => commands::status::run(config, symbol).await,
        Commands::Instruments => commands::instruments::run(config).await,
    }
}
