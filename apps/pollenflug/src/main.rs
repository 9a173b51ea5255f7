use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{DwdClient, PinManager, PollenSession};
use shared::{
    domain::DayKey,
    regions::{default_region, lookup_region_key, regions},
};
use storage::{KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore, StorageError};
use tracing::warn;
use tracing_subscriber::EnvFilter;

mod config;
mod display;

use config::{load_settings, normalize_database_url};

#[derive(Parser, Debug)]
#[command(name = "pollenflug", about = "DWD pollen forecast with pinned favorites")]
struct Cli {
    #[arg(long, default_value = "pollenflug.toml")]
    config: PathBuf,
    #[arg(long)]
    database_url: Option<String>,
    #[arg(long)]
    dataset_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the forecast for one region and day.
    Show {
        /// Region key as listed by `regions`, e.g. `40:42`.
        #[arg(long)]
        region: Option<String>,
        #[arg(long, value_parser = parse_day)]
        day: Option<DayKey>,
        #[arg(long)]
        json: bool,
    },
    /// Pin or unpin an item by name.
    Pin { name: String },
    /// List pinned items.
    Pinned,
    /// List region keys.
    Regions,
}

fn parse_day(raw: &str) -> Result<DayKey, String> {
    DayKey::parse(raw).ok_or_else(|| {
        format!("unknown day '{raw}', expected one of: today, tomorrow, dayafter_to")
    })
}

async fn open_sqlite(database_url: &str) -> Result<SqliteKeyValueStore, StorageError> {
    let store = SqliteKeyValueStore::new(database_url).await?;
    store.health_check().await?;
    Ok(store)
}

async fn open_pins(database_url: &str) -> Result<PinManager<SqliteKeyValueStore>> {
    let store = open_sqlite(database_url)
        .await
        .with_context(|| format!("failed to open pin store at '{database_url}'"))?;
    Ok(PinManager::new(store))
}

/// Falls back to an empty in-memory store so the forecast can still be shown.
async fn open_store_or_fallback(
    database_url: &str,
) -> (Arc<dyn KeyValueStore>, Option<StorageError>) {
    match open_sqlite(database_url).await {
        Ok(store) => (Arc::new(store), None),
        Err(err) => {
            warn!(database_url, error = %err, "pin store unavailable, showing forecast without pins");
            (Arc::new(MemoryKeyValueStore::new()), Some(err))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings(&cli.config)?;
    if let Some(url) = cli.database_url {
        settings.database_url = normalize_database_url(&url);
    }
    if let Some(url) = cli.dataset_url {
        settings.dataset_url = url;
    }

    match cli.command {
        Command::Regions => display::print_regions(regions()),
        Command::Show { region, day, json } => {
            let (store, store_fault) = open_store_or_fallback(&settings.database_url).await;
            let region_key = region.unwrap_or(settings.default_region);
            let region = lookup_region_key(&region_key).unwrap_or_else(|| {
                warn!(region = %region_key, "unknown region, using default");
                default_region()
            });
            let source = DwdClient::new(&settings.dataset_url, settings.fetch_timeout)?;

            let mut session = PollenSession::new(
                PinManager::new(store),
                source,
                region.clone(),
                day.unwrap_or(settings.default_day),
            );
            session.start().await;
            if let Some(err) = &store_fault {
                session.report_storage_fault(err);
            }

            let model = session.presentation();
            if json {
                println!("{}", serde_json::to_string_pretty(&model)?);
            } else {
                display::print_presentation(&model);
            }
        }
        Command::Pin { name } => {
            let pins = open_pins(&settings.database_url).await?;
            let pinned = pins
                .toggle_pin(&name)
                .await
                .with_context(|| format!("failed to toggle pin '{name}'"))?;
            display::print_toggle_result(&name, &pinned);
        }
        Command::Pinned => {
            let pins = open_pins(&settings.database_url).await?;
            let pinned = pins.pinned().await.context("failed to read pinned items")?;
            display::print_pins(&pinned);
        }
    }

    Ok(())
}
