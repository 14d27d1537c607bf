//! `openair` command line tool
//!
//! Probes record type schemas and dumps records from the OpenAir XML API.
//! Credentials come from `OPENAIR_*` environment variables or a `.env` file.

use anyhow::Context;
use anyhow::Result;
use chrono::NaiveDate;
use chrono::Utc;
use clap::Parser;
use clap::Subcommand;
use openair_lib::Config;
use openair_lib::OpenAirClient;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "openair", about = "Inspect and read OpenAir record types")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the inferred field layout of one or more record types as JSON.
    Probe {
        /// Comma-separated record type names, e.g. `Customer,Invoice`.
        #[arg(long, value_delimiter = ',', required = true)]
        object: Vec<String>,
    },
    /// Print every record of a type as one JSON object per line.
    List {
        /// Record type name.
        #[arg(long)]
        object: String,
        /// Only records modified on or after this day (YYYY-MM-DD).
        #[arg(long)]
        since: Option<NaiveDate>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("loading OPENAIR_* settings")?;
    let client = OpenAirClient::builder()
        .config(config)
        .build()
        .context("building client")?;

    match cli.command {
        Command::Probe { object } => probe(&client, &object).await,
        Command::List { object, since } => list(&client, &object, since).await,
    }
}

async fn probe(client: &OpenAirClient, objects: &[String]) -> Result<()> {
    let descriptors = client
        .probe_all(objects)
        .await
        .context("probing record types")?;
    println!("{}", serde_json::to_string_pretty(&descriptors)?);
    Ok(())
}

async fn list(client: &OpenAirClient, object: &str, since: Option<NaiveDate>) -> Result<()> {
    let descriptor = client
        .probe(object)
        .await
        .with_context(|| format!("probing {object}"))?;

    let modified_since = since
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc());

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, cancelling");
            on_interrupt.cancel();
        }
    });

    let started = Utc::now();
    let mut stream = client.enumerate(&descriptor, modified_since, cancel);
    let mut count = 0usize;
    while let Some(page) = stream.next().await {
        let page = page.with_context(|| format!("listing {object}"))?;
        for record in page.records() {
            println!("{}", serde_json::to_string(record)?);
            count += 1;
        }
    }

    info!(
        object,
        records = count,
        elapsed_ms = (Utc::now() - started).num_milliseconds(),
        "done"
    );
    Ok(())
}
