use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "bandar", version, about = "Broker accumulation analytics over saved feed payloads")]
pub struct Cli {
    /// Optional JSON config file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compute analytics from a broker-flow payload and an order-book payload.
    Analyze(AnalyzeArgs),
    /// Show the most recent stored results.
    History(HistoryArgs),
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Broker-flow payload (JSON file).
    #[arg(long)]
    pub broker_feed: PathBuf,

    /// Order-book payload (JSON file).
    #[arg(long)]
    pub orderbook: PathBuf,

    /// Instrument code.
    #[arg(long)]
    pub emiten: String,

    /// Start of the broker-flow date range (YYYY-MM-DD).
    #[arg(long)]
    pub from: NaiveDate,

    /// End of the broker-flow date range (YYYY-MM-DD).
    #[arg(long)]
    pub to: NaiveDate,

    /// Append the result to this SQLite database.
    #[arg(long)]
    pub db: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// SQLite database written by `analyze --db`.
    #[arg(long)]
    pub db: PathBuf,

    #[arg(long, default_value_t = 10)]
    pub limit: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_analyze() {
        let cli = Cli::try_parse_from([
            "bandar",
            "analyze",
            "--broker-feed",
            "brokers.json",
            "--orderbook",
            "book.json",
            "--emiten",
            "SOCI",
            "--from",
            "2026-01-01",
            "--to",
            "2026-01-02",
        ])
        .unwrap();

        match cli.command {
            Command::Analyze(args) => {
                assert_eq!(args.emiten, "SOCI");
                assert_eq!(args.from, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
                assert!(args.db.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_rejects_bad_date() {
        let result = Cli::try_parse_from([
            "bandar",
            "analyze",
            "--broker-feed",
            "a.json",
            "--orderbook",
            "b.json",
            "--emiten",
            "SOCI",
            "--from",
            "01/01/2026",
            "--to",
            "2026-01-02",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_history_default_limit() {
        let cli = Cli::try_parse_from(["bandar", "history", "--db", "x.db"]).unwrap();
        match cli.command {
            Command::History(args) => assert_eq!(args.limit, 10),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
