//! Broker ranking by net buy value.
//!
//! Picks the dominant accumulator from one broker-flow response. Ranking is
//! a stable descending sort, so equal net buy values keep feed order and the
//! first-occurring broker wins.

use std::cmp::Reverse;

use bandar_core::{BrokerRecord, Error, RawBrokerEntry, RawBrokerFeed, Result};
use ordered_float::OrderedFloat;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::normalizer::FeedNormalizer;
use crate::payload::decode_broker_feed;

/// Ranks broker rows from a broker-flow feed.
#[derive(Debug, Clone, Default)]
pub struct BrokerRanker {
    normalizer: FeedNormalizer,
}

impl BrokerRanker {
    /// Create a ranker using the given normalizer.
    pub fn new(normalizer: FeedNormalizer) -> Self {
        Self { normalizer }
    }

    /// Select the top broker from an undecoded broker-flow payload.
    pub fn top_broker(&self, payload: &Value) -> Result<BrokerRecord> {
        let feed = decode_broker_feed(payload)?;
        self.top_broker_from(&feed)
    }

    /// Select the top broker from a decoded broker-flow feed.
    pub fn top_broker_from(&self, feed: &RawBrokerFeed) -> Result<BrokerRecord> {
        let top = self
            .ranked(feed)?
            .into_iter()
            .next()
            .ok_or_else(|| Error::no_broker_data("no usable broker rows in data.broker_summary.brokers_buy"))?;

        info!(
            broker = %top.broker_code,
            net_buy_value = top.net_buy_value,
            lots = top.accumulated_lots,
            avg_price = top.average_buy_price,
            "top broker selected"
        );
        Ok(top)
    }

    /// All usable broker rows, highest net buy value first.
    ///
    /// Fails when the broker list is absent, not a list, or empty.
    pub fn ranked(&self, feed: &RawBrokerFeed) -> Result<Vec<BrokerRecord>> {
        let rows = broker_rows(feed)?;

        let mut records: Vec<BrokerRecord> = rows
            .iter()
            .enumerate()
            .filter_map(|(idx, row)| match RawBrokerEntry::deserialize(row) {
                Ok(entry) => self.normalizer.normalize_broker(&entry),
                Err(e) => {
                    warn!(index = idx, error = %e, "unreadable broker row skipped");
                    None
                }
            })
            .collect();

        // Stable: ties keep feed order.
        records.sort_by_key(|record| Reverse(OrderedFloat(record.net_buy_value)));
        Ok(records)
    }
}

fn broker_rows(feed: &RawBrokerFeed) -> Result<&Vec<Value>> {
    let rows = feed
        .data
        .broker_summary
        .as_ref()
        .and_then(|summary| summary.brokers_buy.as_ref())
        .ok_or_else(|| Error::no_broker_data("data.broker_summary.brokers_buy is missing"))?;

    match rows {
        Value::Array(rows) if !rows.is_empty() => Ok(rows),
        Value::Array(_) => Err(Error::no_broker_data("data.broker_summary.brokers_buy is empty")),
        _ => Err(Error::no_broker_data("data.broker_summary.brokers_buy is not a list")),
    }
}
