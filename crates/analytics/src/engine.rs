//! End-to-end analytics pipeline.
//!
//! Normalizer -> Ranker -> Composer over two already-fetched payloads. The
//! engine holds configuration only, so one instance can serve any number of
//! requests, including concurrently.

use bandar_core::{
    BrokerRecord, Config, DerivedMetrics, MarketRecord, Result, StockAnalysis, StockQuery,
};
use bandar_ingestion::{decode_broker_feed, decode_orderbook_feed, BrokerRanker, FeedNormalizer};
use serde_json::Value;
use tracing::debug;

use crate::composer::AnalyticsComposer;

/// Analytics pipeline.
#[derive(Debug, Clone, Default)]
pub struct AnalyticsEngine {
    normalizer: FeedNormalizer,
    ranker: BrokerRanker,
    composer: AnalyticsComposer,
}

impl AnalyticsEngine {
    /// Create an engine from a validated configuration.
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        let normalizer = FeedNormalizer::new(config);
        Ok(Self {
            ranker: BrokerRanker::new(normalizer.clone()),
            composer: AnalyticsComposer::new(config)?,
            normalizer,
        })
    }

    /// Select the top broker from a broker-flow payload on its own.
    pub fn top_broker(&self, broker_feed: &Value) -> Result<BrokerRecord> {
        self.ranker.top_broker(broker_feed)
    }

    /// Normalize the order-book payload on its own.
    pub fn market_record(&self, orderbook_feed: &Value) -> Result<MarketRecord> {
        let feed = decode_orderbook_feed(orderbook_feed)?;
        Ok(self.normalizer.normalize_orderbook(&feed.data))
    }

    /// Compute derived metrics from the two payloads.
    pub fn compute_analytics(&self, broker_feed: &Value, orderbook_feed: &Value) -> Result<DerivedMetrics> {
        let (_, _, metrics) = self.run(broker_feed, orderbook_feed)?;
        Ok(metrics)
    }

    /// Compute the full analysis for a request.
    pub fn analyze(
        &self,
        query: &StockQuery,
        broker_feed: &Value,
        orderbook_feed: &Value,
    ) -> Result<StockAnalysis> {
        debug!(emiten = %query.emiten, from = %query.from, to = %query.to, "analyzing");
        let (broker, market, metrics) = self.run(broker_feed, orderbook_feed)?;
        Ok(StockAnalysis {
            query: query.clone(),
            broker,
            market,
            metrics,
        })
    }

    fn run(
        &self,
        broker_feed: &Value,
        orderbook_feed: &Value,
    ) -> Result<(BrokerRecord, MarketRecord, DerivedMetrics)> {
        // Check both envelopes before doing any work.
        let brokers = decode_broker_feed(broker_feed)?;
        let orderbook = decode_orderbook_feed(orderbook_feed)?;

        let broker = self.ranker.top_broker_from(&brokers)?;
        let market = self.normalizer.normalize_orderbook(&orderbook.data);
        let metrics = self.composer.compose(&broker, &market)?;
        Ok((broker, market, metrics))
    }
}

/// Compute derived metrics with the default configuration.
pub fn compute_analytics(broker_feed: &Value, orderbook_feed: &Value) -> Result<DerivedMetrics> {
    AnalyticsEngine::default().compute_analytics(broker_feed, orderbook_feed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bandar_core::{Error, LimitState};
    use chrono::NaiveDate;
    use serde_json::json;

    fn broker_feed(rows: Value) -> Value {
        json!({ "data": { "broker_summary": { "brokers_buy": rows } } })
    }

    fn orderbook(close: Value, bid: &str, offer: &str) -> Value {
        json!({
            "data": {
                "close": close,
                "ara": { "value": "135" },
                "arb": { "value": "92" },
                "total_bid_offer": { "bid": { "lot": bid }, "offer": { "lot": offer } }
            }
        })
    }

    #[test]
    fn test_two_broker_example() {
        let engine = AnalyticsEngine::default();
        let brokers = broker_feed(json!([
            { "netbs_broker_code": "YP", "bval": "500000", "blot": "50", "netbs_buy_avg_price": "99" },
            { "netbs_broker_code": "CC", "bval": "1200000", "blot": "120", "netbs_buy_avg_price": "98" },
        ]));
        let book = orderbook(json!(100), "1000", "2000");

        let query = StockQuery::new(
            "soci",
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 1, 2).unwrap(),
        )
        .unwrap();
        let analysis = engine.analyze(&query, &brokers, &book).unwrap();

        assert_eq!(analysis.broker.broker_code, "CC");
        assert_eq!(analysis.market.tick_size, 1.0);
        assert_eq!(analysis.metrics.total_depth, 3000);
        assert!(analysis.metrics.target_max >= analysis.metrics.target_realistic);

        let row = analysis.to_row();
        assert_eq!(row.emiten, "SOCI");
        assert_eq!(row.broker_code, "CC");
        assert_eq!(row.total_depth, 3000);
    }

    #[test]
    fn test_minimal_payload_shapes() {
        // Only bval present on broker rows, as in sparse upstream responses.
        let brokers = broker_feed(json!([
            { "netbs_broker_code": "YP", "bval": "500000" },
            { "netbs_broker_code": "CC", "bval": "1200000" },
        ]));
        let book = json!({
            "data": {
                "close": 100,
                "total_bid_offer": { "bid": { "lot": "1000" }, "offer": { "lot": "2000" } }
            }
        });
        let metrics = compute_analytics(&brokers, &book).unwrap();
        assert_eq!(metrics.total_depth, 3000);
    }

    #[test]
    fn test_single_entry_lots_exact() {
        let engine = AnalyticsEngine::default();
        let brokers = broker_feed(json!([
            { "netbs_broker_code": "YP", "bval": "1", "blot": "25,322,000", "netbs_buy_avg_price": "100" },
        ]));
        let book = orderbook(json!(100), "1,000", "2,000");
        let analysis = engine
            .analyze(
                &StockQuery::new(
                    "SOCI",
                    NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
                    NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
                )
                .unwrap(),
                &brokers,
                &book,
            )
            .unwrap();
        assert_eq!(analysis.broker.accumulated_lots, 25_322_000);
    }

    #[test]
    fn test_zero_tick_is_typed_failure() {
        let brokers = broker_feed(json!([{ "netbs_broker_code": "CC", "bval": "10" }]));
        let mut book = orderbook(json!(100), "1000", "2000");
        book["data"]["fraksi"] = json!(0);

        let err = compute_analytics(&brokers, &book).unwrap_err();
        assert!(matches!(err, Error::DivisionByZero(_)));
    }

    #[test]
    fn test_structural_failures() {
        let book = orderbook(json!(100), "1000", "2000");

        let err = compute_analytics(&broker_feed(json!([])), &book).unwrap_err();
        assert!(matches!(err, Error::NoBrokerData(_)));

        let err = compute_analytics(&json!({}), &book).unwrap_err();
        assert!(matches!(err, Error::MalformedPayload(_)));

        let brokers = broker_feed(json!([{ "netbs_broker_code": "CC", "bval": "10" }]));
        let err = compute_analytics(&brokers, &json!({ "status": 200 })).unwrap_err();
        assert!(matches!(err, Error::MalformedPayload(_)));
    }

    #[test]
    fn test_extreme_numeric_strings_do_not_panic() {
        let brokers = broker_feed(json!([
            { "netbs_broker_code": "CC", "bval": "10", "blot": "1e30", "netbs_buy_avg_price": "-1e30" },
        ]));
        let book = orderbook(json!(100), "1e30", "1e30");

        let metrics = compute_analytics(&brokers, &book).unwrap();
        assert_eq!(metrics.total_depth, 2 * 1_000_000_000_000_000);
        assert!(metrics.price_step > 0.0);
        assert!(metrics.target_max >= metrics.target_realistic);

        let broker = AnalyticsEngine::default().top_broker(&brokers).unwrap();
        assert_eq!(broker.average_buy_price, 0);
        assert_eq!(broker.accumulated_lots, 1_000_000_000_000_000);
    }

    #[test]
    fn test_null_orderbook_wrappers_zero_fill() {
        let brokers = broker_feed(json!([{ "netbs_broker_code": "CC", "bval": "10", "blot": "1" }]));
        let book = json!({
            "data": { "close": 100, "ara": null, "arb": null, "total_bid_offer": null }
        });
        let metrics = compute_analytics(&brokers, &book).unwrap();
        assert_eq!(metrics.total_depth, 0);
        assert_eq!(metrics.board_levels, 0);

        let market = AnalyticsEngine::default().market_record(&book).unwrap();
        assert_eq!(market.best_offer, 0);
        assert_eq!(market.lowest_bid, 0);
        assert_eq!(market.bid_volume, 0);
    }

    #[test]
    fn test_market_record_limit_state() {
        let engine = AnalyticsEngine::default();
        let market = engine.market_record(&orderbook(json!("135"), "0", "0")).unwrap();
        assert_eq!(market.limit_state, LimitState::UpperLimit);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = Config::default();
        config.targets.max_accumulation_multiplier = 0.5;
        assert!(AnalyticsEngine::new(&config).is_err());
    }

    #[test]
    fn test_inputs_untouched() {
        let brokers = broker_feed(json!([{ "netbs_broker_code": "CC", "bval": "10", "blot": "1" }]));
        let book = orderbook(json!(100), "1000", "2000");
        let (b0, o0) = (brokers.clone(), book.clone());
        let first = compute_analytics(&brokers, &book).unwrap();
        let second = compute_analytics(&brokers, &book).unwrap();
        assert_eq!(first, second);
        assert_eq!(brokers, b0);
        assert_eq!(book, o0);
    }
}
