//! Permissive numeric normalization.
//!
//! Upstream feeds omit fields, send empty strings, or format numbers with
//! thousands separators ("25,322,000"). Any value that cannot be read as a
//! finite number normalizes to zero instead of failing.

use bandar_core::config::{NormalizationConfig, TickConfig};
use bandar_core::{
    BrokerRecord, Config, LimitState, MarketRecord, RawBrokerEntry, RawOrderbookSnapshot,
    RoundingMode,
};
use serde_json::Value;
use tracing::{debug, warn};

/// Largest magnitude an integer field normalizes to. Sums and differences of
/// two normalized fields stay inside `i64`.
pub const MAX_FIELD_MAGNITUDE: f64 = 1e15;

/// Read a numeric-like value. Strings have every `,` stripped before parsing.
///
/// Null, empty, non-numeric, non-finite and non-scalar values yield `0.0`.
pub fn parse_number(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned: String = s.chars().filter(|c| *c != ',').collect();
            cleaned.trim().parse::<f64>().ok()
        }
        _ => None,
    };
    match parsed {
        Some(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Read a value as text, accepting bare numbers as well.
fn parse_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

/// Converts raw feed rows into normalized records.
#[derive(Debug, Clone)]
pub struct FeedNormalizer {
    /// Rounding rule for integer fields.
    rounding: RoundingMode,
    /// Fallback tick table.
    tick: TickConfig,
}

impl Default for FeedNormalizer {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl FeedNormalizer {
    /// Create a normalizer from configuration.
    pub fn new(config: &Config) -> Self {
        Self::with_parts(&config.normalization, config.tick.clone())
    }

    /// Create a normalizer from its config sections.
    pub fn with_parts(normalization: &NormalizationConfig, tick: TickConfig) -> Self {
        Self {
            rounding: normalization.rounding,
            tick,
        }
    }

    /// Normalize to a rounded integer, bounded by [`MAX_FIELD_MAGNITUDE`].
    pub fn integer(&self, value: &Value) -> i64 {
        let bounded = parse_number(value).clamp(-MAX_FIELD_MAGNITUDE, MAX_FIELD_MAGNITUDE);
        self.rounding.round_i64(bounded)
    }

    /// Normalize to a rounded integer, clamping negatives to zero.
    pub fn non_negative_integer(&self, value: &Value) -> i64 {
        self.integer(value).max(0)
    }

    /// Normalize one broker row.
    ///
    /// Returns `None` when the row carries no broker code.
    pub fn normalize_broker(&self, entry: &RawBrokerEntry) -> Option<BrokerRecord> {
        let broker_code = parse_text(&entry.netbs_broker_code);
        if broker_code.is_empty() {
            warn!(bval = %entry.bval, "broker row without broker code skipped");
            return None;
        }

        for (field, value) in [
            ("bval", &entry.bval),
            ("blot", &entry.blot),
            ("netbs_buy_avg_price", &entry.netbs_buy_avg_price),
        ] {
            if value.is_null() {
                debug!(broker = %broker_code, field, "field absent, zero-filled");
            }
        }

        Some(BrokerRecord {
            net_buy_value: parse_number(&entry.bval),
            accumulated_lots: self.integer(&entry.blot),
            average_buy_price: self.non_negative_integer(&entry.netbs_buy_avg_price),
            broker_code,
        })
    }

    /// Normalize an order-book snapshot.
    ///
    /// An explicit `fraksi` wins, even when it normalizes to zero; otherwise the
    /// tick size comes from the price table.
    pub fn normalize_orderbook(&self, snapshot: &RawOrderbookSnapshot) -> MarketRecord {
        let last_price = self.non_negative_integer(&snapshot.close);
        let best_offer = self.non_negative_integer(&snapshot.ara.value);
        let lowest_bid = self.non_negative_integer(&snapshot.arb.value);

        let tick_size = match &snapshot.fraksi {
            Some(raw) => parse_number(raw).max(0.0),
            None => self.tick.tick_for(last_price as f64),
        };

        let record = MarketRecord {
            last_price,
            best_offer,
            lowest_bid,
            tick_size,
            bid_volume: self.non_negative_integer(&snapshot.total_bid_offer.bid.lot),
            offer_volume: self.non_negative_integer(&snapshot.total_bid_offer.offer.lot),
            limit_state: LimitState::classify(last_price, best_offer, lowest_bid),
        };
        debug!(?record, "orderbook normalized");
        record
    }
}
