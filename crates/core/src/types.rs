//! Core data types for the bandar analytics pipeline.
//!
//! Raw payload types mirror the upstream JSON and keep every numeric leaf as
//! an untyped [`Value`], because the feeds send numbers, locale-formatted
//! strings, nulls, or nothing at all for the same field.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

// ============================================================================
// Raw payloads
// ============================================================================

/// Broker-flow feed: `{ data: { broker_summary: { brokers_buy: [...] } } }`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawBrokerFeed {
    pub data: RawBrokerFeedData,
}

/// Body of the broker-flow feed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawBrokerFeedData {
    #[serde(default)]
    pub broker_summary: Option<RawBrokerSummary>,
}

/// Broker summary block.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawBrokerSummary {
    /// Expected to be a list of broker rows; left untyped so a non-list
    /// value can be reported as missing broker data instead of a parse error.
    #[serde(default)]
    pub brokers_buy: Option<Value>,
}

/// One broker row from the broker-flow feed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawBrokerEntry {
    /// Broker code.
    #[serde(default)]
    pub netbs_broker_code: Value,
    /// Net buy value.
    #[serde(default)]
    pub bval: Value,
    /// Net buy lot volume.
    #[serde(default)]
    pub blot: Value,
    /// Average net buy price.
    #[serde(default)]
    pub netbs_buy_avg_price: Value,
}

/// Order-book feed: `{ data: { close, ara, arb, total_bid_offer } }`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawOrderbookFeed {
    pub data: RawOrderbookSnapshot,
}

/// Order-book snapshot for one instrument.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawOrderbookSnapshot {
    /// Last price.
    #[serde(default)]
    pub close: Value,
    /// Upper auto-reject price (top of the offer side).
    #[serde(default, deserialize_with = "null_as_default")]
    pub ara: RawValueField,
    /// Lower auto-reject price (bottom of the bid side).
    #[serde(default, deserialize_with = "null_as_default")]
    pub arb: RawValueField,
    /// Explicit tick size, when the feed carries one.
    #[serde(default)]
    pub fraksi: Option<Value>,
    /// Aggregate bid/offer volumes.
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_bid_offer: RawBidOffer,
}

/// Treat an explicit `null` the same as an absent key.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// `{ value: ... }` wrapper.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawValueField {
    #[serde(default)]
    pub value: Value,
}

/// `{ bid: { lot }, offer: { lot } }`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawBidOffer {
    #[serde(default, deserialize_with = "null_as_default")]
    pub bid: RawLotField,
    #[serde(default, deserialize_with = "null_as_default")]
    pub offer: RawLotField,
}

/// `{ lot: ... }` wrapper.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawLotField {
    #[serde(default)]
    pub lot: Value,
}

// ============================================================================
// Normalized records
// ============================================================================

/// Normalized broker row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrokerRecord {
    /// Broker code, never empty.
    pub broker_code: String,
    /// Net buy value.
    pub net_buy_value: f64,
    /// Net buy lot volume, rounded.
    pub accumulated_lots: i64,
    /// Average net buy price, rounded.
    pub average_buy_price: i64,
}

/// Where the last price sits relative to the daily price limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitState {
    #[default]
    Within,
    /// Last price at or above the upper auto-reject price.
    UpperLimit,
    /// Last price at or below the lower auto-reject price.
    LowerLimit,
}

impl LimitState {
    /// Classify a last price against the limit prices. Zero limits are unknown.
    pub fn classify(last_price: i64, best_offer: i64, lowest_bid: i64) -> Self {
        if best_offer > 0 && last_price >= best_offer {
            LimitState::UpperLimit
        } else if lowest_bid > 0 && last_price <= lowest_bid {
            LimitState::LowerLimit
        } else {
            LimitState::Within
        }
    }
}

/// Normalized order-book snapshot. No field is negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketRecord {
    /// Last price.
    pub last_price: i64,
    /// Top of the offer side (upper limit price).
    pub best_offer: i64,
    /// Bottom of the bid side (lower limit price).
    pub lowest_bid: i64,
    /// Minimum price increment.
    pub tick_size: f64,
    /// Aggregate bid lot volume.
    pub bid_volume: i64,
    /// Aggregate offer lot volume.
    pub offer_volume: i64,
    /// Price-limit state of the last price.
    pub limit_state: LimitState,
}

/// Derived analytics for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedMetrics {
    /// Bid volume + offer volume.
    pub total_depth: i64,
    /// Midpoint of the bid and offer totals.
    pub average_bid_offer: i64,
    /// Tick steps between lowest bid and best offer.
    pub board_levels: i64,
    /// Accumulation coefficient `a`: accumulated lots / total depth.
    pub accumulation: f64,
    /// Price-step coefficient `p`: (last - average buy) / tick.
    pub price_step: f64,
    /// Near-term projected price.
    pub target_realistic: i64,
    /// Maximum projected price. Always >= `target_realistic`.
    pub target_max: i64,
}

// ============================================================================
// Request and result
// ============================================================================

/// One analysis request: instrument and date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockQuery {
    /// Instrument code, upper-case.
    pub emiten: String,
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl StockQuery {
    /// Build a validated query.
    pub fn new(emiten: &str, from: NaiveDate, to: NaiveDate) -> Result<Self> {
        let emiten = emiten.trim().to_uppercase();
        if emiten.is_empty() {
            return Err(Error::invalid_query("instrument code is empty"));
        }
        if from > to {
            return Err(Error::invalid_query(format!("from date {from} is after to date {to}")));
        }
        Ok(Self { emiten, from, to })
    }
}

/// Full result of one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockAnalysis {
    pub query: StockQuery,
    pub broker: BrokerRecord,
    pub market: MarketRecord,
    pub metrics: DerivedMetrics,
}

impl StockAnalysis {
    /// Flatten into a persistence row.
    pub fn to_row(&self) -> AnalysisRow {
        AnalysisRow {
            emiten: self.query.emiten.clone(),
            from_date: self.query.from,
            to_date: self.query.to,
            broker_code: self.broker.broker_code.clone(),
            accumulated_lots: self.broker.accumulated_lots,
            average_buy_price: self.broker.average_buy_price,
            last_price: self.market.last_price,
            best_offer: self.market.best_offer,
            lowest_bid: self.market.lowest_bid,
            tick_size: self.market.tick_size,
            total_bid: self.market.bid_volume,
            total_offer: self.market.offer_volume,
            total_depth: self.metrics.total_depth,
            average_bid_offer: self.metrics.average_bid_offer,
            accumulation: self.metrics.accumulation,
            price_step: self.metrics.price_step,
            target_realistic: self.metrics.target_realistic,
            target_max: self.metrics.target_max,
        }
    }
}

/// Flat result row appended to durable storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRow {
    pub emiten: String,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub broker_code: String,
    pub accumulated_lots: i64,
    pub average_buy_price: i64,
    pub last_price: i64,
    pub best_offer: i64,
    pub lowest_bid: i64,
    pub tick_size: f64,
    pub total_bid: i64,
    pub total_offer: i64,
    pub total_depth: i64,
    pub average_bid_offer: i64,
    pub accumulation: f64,
    pub price_step: f64,
    pub target_realistic: i64,
    pub target_max: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_query_normalizes_code() {
        let query = StockQuery::new("  soci ", date(2026, 1, 1), date(2026, 1, 2)).unwrap();
        assert_eq!(query.emiten, "SOCI");
    }

    #[test]
    fn test_query_rejects_bad_input() {
        let err = StockQuery::new("", date(2026, 1, 1), date(2026, 1, 2)).unwrap_err();
        assert_eq!(err.kind(), "invalid_query");

        let err = StockQuery::new("SOCI", date(2026, 1, 3), date(2026, 1, 2)).unwrap_err();
        assert_eq!(err.kind(), "invalid_query");

        assert!(StockQuery::new("SOCI", date(2026, 1, 2), date(2026, 1, 2)).is_ok());
    }

    #[test]
    fn test_orderbook_null_wrappers_zero_fill() {
        let raw = json!({
            "close": "100",
            "ara": null,
            "arb": null,
            "total_bid_offer": null
        });
        let snapshot: RawOrderbookSnapshot = serde_json::from_value(raw).unwrap();
        assert!(snapshot.ara.value.is_null());
        assert!(snapshot.arb.value.is_null());
        assert!(snapshot.total_bid_offer.bid.lot.is_null());

        let raw = json!({ "total_bid_offer": { "bid": null, "offer": { "lot": "7" } } });
        let snapshot: RawOrderbookSnapshot = serde_json::from_value(raw).unwrap();
        assert!(snapshot.total_bid_offer.bid.lot.is_null());
        assert_eq!(snapshot.total_bid_offer.offer.lot, json!("7"));
    }

    #[test]
    fn test_orderbook_wrong_nested_type_rejected() {
        let raw = json!({ "ara": 135 });
        assert!(serde_json::from_value::<RawOrderbookSnapshot>(raw).is_err());
    }

    #[test]
    fn test_limit_state() {
        assert_eq!(LimitState::classify(135, 135, 92), LimitState::UpperLimit);
        assert_eq!(LimitState::classify(92, 135, 92), LimitState::LowerLimit);
        assert_eq!(LimitState::classify(100, 135, 92), LimitState::Within);
        assert_eq!(LimitState::classify(100, 0, 0), LimitState::Within);
    }

    #[test]
    fn test_raw_orderbook_defaults() {
        let feed: RawOrderbookFeed = serde_json::from_value(json!({ "data": { "close": 100 } })).unwrap();
        assert_eq!(feed.data.close, json!(100));
        assert!(feed.data.ara.value.is_null());
        assert!(feed.data.total_bid_offer.bid.lot.is_null());
        assert!(feed.data.fraksi.is_none());
    }

    #[test]
    fn test_raw_broker_feed_requires_data() {
        assert!(serde_json::from_value::<RawBrokerFeed>(json!({})).is_err());
        let feed: RawBrokerFeed = serde_json::from_value(json!({ "data": {} })).unwrap();
        assert!(feed.data.broker_summary.is_none());
    }

    #[test]
    fn test_broker_record_json_shape() {
        let record = BrokerRecord {
            broker_code: "CC".to_string(),
            net_buy_value: 1_200_000.0,
            accumulated_lots: 100,
            average_buy_price: 98,
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["brokerCode"], "CC");
        assert_eq!(value["accumulatedLots"], 100);
        assert_eq!(value["averageBuyPrice"], 98);
    }
}
