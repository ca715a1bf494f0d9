use std::{
    fs,
    io::{self, Read},
    path::PathBuf,
};

use anyhow::Context;
use clap::{Parser, Subcommand};
use secrecy::ExposeSecret;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tpv_gateway::config::Config;
use tpv_gateway::models::{TransactionRequest, TransportMessage};
use tpv_gateway::services::{confirm, order::generate_order_id, sign};

/// Signs payment requests for the bank's TPV and verifies its confirmations.
///
/// Merchant settings are read from `TPV_*` environment variables (or a
/// `.env` file). Logs go to stderr; results are printed to stdout as JSON.
#[derive(Parser, Debug)]
#[command(name = "tpv-gateway", version, propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sign a transaction request JSON and print the message to post.
    Sign {
        /// Request file; reads stdin when omitted.
        #[arg(long, short = 'i')]
        input: Option<PathBuf>,
    },
    /// Verify a bank confirmation JSON and print its outcome.
    Confirm {
        /// Confirmation file; reads stdin when omitted.
        #[arg(long, short = 'i')]
        input: Option<PathBuf>,
    },
    /// Print a fresh order identifier.
    OrderId,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tpv_gateway=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Sign { input } => {
            let config = Config::from_env().context("Failed to load configuration")?;
            let request: TransactionRequest = serde_json::from_str(&read_input(input)?)
                .context("Invalid transaction request")?;

            let signed = sign(&config.merchant_profile(), &request, config.profile)?;
            println!("{}", serde_json::to_string_pretty(&signed)?);
        }
        Commands::Confirm { input } => {
            let config = Config::from_env().context("Failed to load configuration")?;
            let message: TransportMessage = serde_json::from_str(&read_input(input)?)
                .context("Invalid confirmation message")?;

            let outcome = confirm(config.secret.expose_secret(), &message, config.profile)?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Commands::OrderId => {
            println!("{}", generate_order_id());
        }
    }

    Ok(())
}

fn read_input(path: Option<PathBuf>) -> anyhow::Result<String> {
    match path {
        Some(path) => fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read stdin")?;
            Ok(buffer)
        }
    }
}
