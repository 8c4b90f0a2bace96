//! SQLite result store.

use std::path::Path;

use bandar_core::{AnalysisRow, Error, Result};
use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection, Row};
use tracing::{debug, info};

use crate::ResultWriter;

const DATE_FORMAT: &str = "%Y-%m-%d";

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS stock_queries (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    created_at        TEXT    NOT NULL,
    emiten            TEXT    NOT NULL,
    from_date         TEXT    NOT NULL,
    to_date           TEXT    NOT NULL,
    broker_code       TEXT    NOT NULL,
    accumulated_lots  INTEGER NOT NULL,
    average_buy_price INTEGER NOT NULL,
    last_price        INTEGER NOT NULL,
    best_offer        INTEGER NOT NULL,
    lowest_bid        INTEGER NOT NULL,
    tick_size         REAL    NOT NULL,
    total_bid         INTEGER NOT NULL,
    total_offer       INTEGER NOT NULL,
    total_depth       INTEGER NOT NULL,
    average_bid_offer INTEGER NOT NULL,
    accumulation      REAL    NOT NULL,
    price_step        REAL    NOT NULL,
    target_realistic  INTEGER NOT NULL,
    target_max        INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_stock_queries_emiten ON stock_queries (emiten);
";

fn db_err(e: rusqlite::Error) -> Error {
    Error::database(e.to_string())
}

/// A persisted row with its storage metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredAnalysis {
    pub id: i64,
    /// RFC 3339 insert time (UTC).
    pub created_at: String,
    pub row: AnalysisRow,
}

/// SQLite-backed result store.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) a database file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(db_err)?;
        info!(path = %path.display(), "result store opened");
        Self::with_connection(conn)
    }

    /// In-memory database.
    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory().map_err(db_err)?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA).map_err(db_err)?;
        Ok(Self { conn })
    }

    /// Most recent rows first.
    pub fn recent(&self, limit: usize) -> Result<Vec<StoredAnalysis>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, created_at, emiten, from_date, to_date, broker_code,
                        accumulated_lots, average_buy_price, last_price, best_offer,
                        lowest_bid, tick_size, total_bid, total_offer, total_depth,
                        average_bid_offer, accumulation, price_step, target_realistic,
                        target_max
                 FROM stock_queries ORDER BY id DESC LIMIT ?1",
            )
            .map_err(db_err)?;

        let rows = stmt
            .query_map(params![limit as i64], read_row)
            .map_err(db_err)?;

        rows.collect::<std::result::Result<Vec<_>, _>>().map_err(db_err)
    }

    /// Number of stored rows.
    pub fn count(&self) -> Result<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM stock_queries", [], |r| r.get(0))
            .map_err(db_err)
    }
}

impl ResultWriter for SqliteStore {
    fn append(&mut self, row: &AnalysisRow) -> Result<i64> {
        let created_at = Utc::now().to_rfc3339();
        self.conn
            .execute(
                "INSERT INTO stock_queries (
                    created_at, emiten, from_date, to_date, broker_code,
                    accumulated_lots, average_buy_price, last_price, best_offer,
                    lowest_bid, tick_size, total_bid, total_offer, total_depth,
                    average_bid_offer, accumulation, price_step, target_realistic,
                    target_max
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)",
                params![
                    created_at,
                    row.emiten,
                    row.from_date.format(DATE_FORMAT).to_string(),
                    row.to_date.format(DATE_FORMAT).to_string(),
                    row.broker_code,
                    row.accumulated_lots,
                    row.average_buy_price,
                    row.last_price,
                    row.best_offer,
                    row.lowest_bid,
                    row.tick_size,
                    row.total_bid,
                    row.total_offer,
                    row.total_depth,
                    row.average_bid_offer,
                    row.accumulation,
                    row.price_step,
                    row.target_realistic,
                    row.target_max,
                ],
            )
            .map_err(db_err)?;

        let id = self.conn.last_insert_rowid();
        debug!(id, emiten = %row.emiten, "analysis row appended");
        Ok(id)
    }
}

fn read_date(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(idx)?;
    NaiveDate::parse_from_str(&raw, DATE_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn read_row(r: &Row<'_>) -> rusqlite::Result<StoredAnalysis> {
    Ok(StoredAnalysis {
        id: r.get(0)?,
        created_at: r.get(1)?,
        row: AnalysisRow {
            emiten: r.get(2)?,
            from_date: read_date(r, 3)?,
            to_date: read_date(r, 4)?,
            broker_code: r.get(5)?,
            accumulated_lots: r.get(6)?,
            average_buy_price: r.get(7)?,
            last_price: r.get(8)?,
            best_offer: r.get(9)?,
            lowest_bid: r.get(10)?,
            tick_size: r.get(11)?,
            total_bid: r.get(12)?,
            total_offer: r.get(13)?,
            total_depth: r.get(14)?,
            average_bid_offer: r.get(15)?,
            accumulation: r.get(16)?,
            price_step: r.get(17)?,
            target_realistic: r.get(18)?,
            target_max: r.get(19)?,
        },
    })
}
