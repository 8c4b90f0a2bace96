//! PyO3 bindings for the bandar analytics pipeline.
//!
//! Exposes the Rust pipeline to Python:
//! - Numeric normalization
//! - Top broker selection
//! - Derived analytics from raw JSON payloads

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use bandar_analytics::AnalyticsEngine;
use bandar_core::{
    BrokerRecord as RustBrokerRecord, Config as RustConfig, DerivedMetrics as RustDerivedMetrics,
    Error as RustError, MarketRecord as RustMarketRecord,
};
use bandar_ingestion::parse_number;
use serde_json::Value;

fn to_py_err(err: RustError) -> PyErr {
    PyValueError::new_err(format!("{}: {}", err.kind(), err))
}

fn parse_json(raw: &str) -> PyResult<Value> {
    serde_json::from_str(raw).map_err(|e| to_py_err(RustError::from(e)))
}

// ============================================================================
// Python-exposed Types
// ============================================================================

/// Normalized top broker.
#[pyclass]
#[derive(Clone)]
pub struct BrokerRecord {
    #[pyo3(get)]
    pub broker_code: String,
    #[pyo3(get)]
    pub net_buy_value: f64,
    #[pyo3(get)]
    pub accumulated_lots: i64,
    #[pyo3(get)]
    pub average_buy_price: i64,
}

#[pymethods]
impl BrokerRecord {
    fn __repr__(&self) -> String {
        format!(
            "BrokerRecord(broker_code={:?}, accumulated_lots={}, average_buy_price={})",
            self.broker_code, self.accumulated_lots, self.average_buy_price
        )
    }
}

impl From<RustBrokerRecord> for BrokerRecord {
    fn from(b: RustBrokerRecord) -> Self {
        BrokerRecord {
            broker_code: b.broker_code,
            net_buy_value: b.net_buy_value,
            accumulated_lots: b.accumulated_lots,
            average_buy_price: b.average_buy_price,
        }
    }
}

/// Normalized order-book snapshot.
#[pyclass]
#[derive(Clone)]
pub struct MarketRecord {
    #[pyo3(get)]
    pub last_price: i64,
    #[pyo3(get)]
    pub best_offer: i64,
    #[pyo3(get)]
    pub lowest_bid: i64,
    #[pyo3(get)]
    pub tick_size: f64,
    #[pyo3(get)]
    pub bid_volume: i64,
    #[pyo3(get)]
    pub offer_volume: i64,
}

impl From<RustMarketRecord> for MarketRecord {
    fn from(m: RustMarketRecord) -> Self {
        MarketRecord {
            last_price: m.last_price,
            best_offer: m.best_offer,
            lowest_bid: m.lowest_bid,
            tick_size: m.tick_size,
            bid_volume: m.bid_volume,
            offer_volume: m.offer_volume,
        }
    }
}

/// Derived analytics.
#[pyclass]
#[derive(Clone)]
pub struct DerivedMetrics {
    #[pyo3(get)]
    pub total_depth: i64,
    #[pyo3(get)]
    pub average_bid_offer: i64,
    #[pyo3(get)]
    pub board_levels: i64,
    #[pyo3(get)]
    pub accumulation: f64,
    #[pyo3(get)]
    pub price_step: f64,
    #[pyo3(get)]
    pub target_realistic: i64,
    #[pyo3(get)]
    pub target_max: i64,
}

#[pymethods]
impl DerivedMetrics {
    fn __repr__(&self) -> String {
        format!(
            "DerivedMetrics(total_depth={}, a={:.4}, p={:.2}, target_realistic={}, target_max={})",
            self.total_depth, self.accumulation, self.price_step, self.target_realistic, self.target_max
        )
    }
}

impl From<RustDerivedMetrics> for DerivedMetrics {
    fn from(d: RustDerivedMetrics) -> Self {
        DerivedMetrics {
            total_depth: d.total_depth,
            average_bid_offer: d.average_bid_offer,
            board_levels: d.board_levels,
            accumulation: d.accumulation,
            price_step: d.price_step,
            target_realistic: d.target_realistic,
            target_max: d.target_max,
        }
    }
}

// ============================================================================
// Engine
// ============================================================================

/// Analytics pipeline with an optional JSON config.
#[pyclass(name = "AnalyticsEngine")]
pub struct PyAnalyticsEngine {
    inner: AnalyticsEngine,
}

#[pymethods]
impl PyAnalyticsEngine {
    #[new]
    #[pyo3(signature = (config_json=None))]
    fn new(config_json: Option<&str>) -> PyResult<Self> {
        let config = match config_json {
            Some(raw) => RustConfig::from_json_str(raw).map_err(to_py_err)?,
            None => RustConfig::default(),
        };
        Ok(PyAnalyticsEngine {
            inner: AnalyticsEngine::new(&config).map_err(to_py_err)?,
        })
    }

    /// Compute derived metrics from two JSON payload strings.
    fn compute_analytics(&self, broker_json: &str, orderbook_json: &str) -> PyResult<DerivedMetrics> {
        let brokers = parse_json(broker_json)?;
        let orderbook = parse_json(orderbook_json)?;
        self.inner
            .compute_analytics(&brokers, &orderbook)
            .map(Into::into)
            .map_err(to_py_err)
    }

    /// Select the top broker from a broker-flow JSON string.
    fn top_broker(&self, broker_json: &str) -> PyResult<BrokerRecord> {
        let brokers = parse_json(broker_json)?;
        self.inner.top_broker(&brokers).map(Into::into).map_err(to_py_err)
    }

    /// Normalize an order-book JSON string.
    fn market_record(&self, orderbook_json: &str) -> PyResult<MarketRecord> {
        let orderbook = parse_json(orderbook_json)?;
        self.inner.market_record(&orderbook).map(Into::into).map_err(to_py_err)
    }
}

// ============================================================================
// Free functions
// ============================================================================

/// Compute derived metrics with the default configuration.
#[pyfunction]
fn compute_analytics(broker_json: &str, orderbook_json: &str) -> PyResult<DerivedMetrics> {
    PyAnalyticsEngine::new(None)?.compute_analytics(broker_json, orderbook_json)
}

/// Select the top broker with the default configuration.
#[pyfunction]
fn top_broker(broker_json: &str) -> PyResult<BrokerRecord> {
    PyAnalyticsEngine::new(None)?.top_broker(broker_json)
}

/// Normalize a str/int/float/None the way feed fields are normalized.
#[pyfunction]
fn normalize_number(value: &Bound<'_, PyAny>) -> f64 {
    let raw = if value.is_none() {
        Value::Null
    } else if let Ok(s) = value.extract::<String>() {
        Value::String(s)
    } else if let Ok(f) = value.extract::<f64>() {
        serde_json::Number::from_f64(f).map_or(Value::Null, Value::Number)
    } else {
        Value::Null
    };
    parse_number(&raw)
}

// ============================================================================
// Module Definition
// ============================================================================

/// Bandar Trader Core - broker accumulation analytics for Python.
#[pymodule]
fn bandar_trader_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Types
    m.add_class::<BrokerRecord>()?;
    m.add_class::<MarketRecord>()?;
    m.add_class::<DerivedMetrics>()?;

    // Engine classes
    m.add_class::<PyAnalyticsEngine>()?;

    // Functions
    m.add_function(wrap_pyfunction!(compute_analytics, m)?)?;
    m.add_function(wrap_pyfunction!(top_broker, m)?)?;
    m.add_function(wrap_pyfunction!(normalize_number, m)?)?;

    Ok(())
}
