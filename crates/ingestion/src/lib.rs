//! Feed ingestion and normalization for the bandar analytics pipeline.
//!
//! This crate handles:
//! - Payload shape checks for the broker-flow and order-book feeds
//! - Permissive numeric normalization (locale strings, nulls, gaps)
//! - Broker ranking by net buy value

pub mod payload;
pub mod normalizer;
pub mod ranker;

pub use payload::{decode_broker_feed, decode_orderbook_feed};
pub use normalizer::{parse_number, FeedNormalizer};
pub use ranker::BrokerRanker;
