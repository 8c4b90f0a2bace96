//! Top-level shape checks for the two upstream payloads.
//!
//! Only the envelope is strict here. Individual numeric leaves are left as
//! untyped values for the normalizer.

use bandar_core::{Error, RawBrokerFeed, RawOrderbookFeed, Result};
use serde::Deserialize;
use serde_json::Value;

/// Decode a broker-flow payload. A missing or non-object `data` is malformed.
pub fn decode_broker_feed(payload: &Value) -> Result<RawBrokerFeed> {
    RawBrokerFeed::deserialize(payload)
        .map_err(|e| Error::malformed(format!("broker feed: {e}")))
}

/// Decode an order-book payload. A missing or non-object `data` is malformed.
pub fn decode_orderbook_feed(payload: &Value) -> Result<RawOrderbookFeed> {
    RawOrderbookFeed::deserialize(payload)
        .map_err(|e| Error::malformed(format!("orderbook feed: {e}")))
}
