//! `bandar` command-line driver.

mod cli;

use std::path::Path;

use anyhow::Context;
use bandar_analytics::AnalyticsEngine;
use bandar_core::{Config, StockQuery};
use bandar_store::{ResultWriter, SqliteStore};
use clap::Parser;
use serde_json::{json, Value};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{AnalyzeArgs, Cli, Command, HistoryArgs};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(error) = run() {
        let kind = error
            .downcast_ref::<bandar_core::Error>()
            .map_or("error", bandar_core::Error::kind);
        eprintln!("{kind}: {error:#}");
        std::process::exit(exit_code(kind));
    }
}

fn exit_code(kind: &str) -> i32 {
    match kind {
        "malformed_payload" | "no_broker_data" | "division_by_zero" | "numeric_overflow" => 2,
        "invalid_query" | "config" => 3,
        _ => 10,
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::default(),
    };

    match cli.command {
        Command::Analyze(args) => analyze(&config, args),
        Command::History(args) => history(args),
    }
}

fn read_payload(path: &Path) -> anyhow::Result<Value> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let value = serde_json::from_str(&raw)
        .map_err(bandar_core::Error::from)
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(value)
}

fn analyze(config: &Config, args: AnalyzeArgs) -> anyhow::Result<()> {
    let query = StockQuery::new(&args.emiten, args.from, args.to)?;
    let broker_feed = read_payload(&args.broker_feed)?;
    let orderbook = read_payload(&args.orderbook)?;

    let engine = AnalyticsEngine::new(config)?;
    let analysis = engine.analyze(&query, &broker_feed, &orderbook)?;

    if let Some(db) = &args.db {
        let mut store = SqliteStore::open(db)?;
        let id = store.append(&analysis.to_row())?;
        info!(id, db = %db.display(), "result stored");
    }

    println!("{}", serde_json::to_string_pretty(&analysis)?);
    Ok(())
}

fn history(args: HistoryArgs) -> anyhow::Result<()> {
    let store = SqliteStore::open(&args.db)?;
    let rows: Vec<Value> = store
        .recent(args.limit)?
        .into_iter()
        .map(|stored| {
            json!({
                "id": stored.id,
                "created_at": stored.created_at,
                "row": stored.row,
            })
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}
