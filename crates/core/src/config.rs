//! Configuration structures for the bandar analytics pipeline.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::StockQuery;

/// Main configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Numeric normalization configuration.
    pub normalization: NormalizationConfig,
    /// Tick size table.
    pub tick: TickConfig,
    /// Price target projection constants.
    pub targets: TargetConfig,
    /// Upstream feed description (consumed by the transport layer).
    pub feed: FeedConfig,
}

impl Config {
    /// Parse a (possibly partial) JSON config document and validate it.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config file and validate it.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<()> {
        self.tick.validate()?;
        self.targets.validate()
    }
}

/// Rounding rule applied to every integer-valued field and output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMode {
    /// 2.5 -> 3, -2.5 -> -3.
    #[default]
    HalfAwayFromZero,
    /// 2.5 -> 2, 3.5 -> 4.
    HalfEven,
}

impl RoundingMode {
    /// Round to the nearest whole unit.
    #[inline]
    pub fn round(self, value: f64) -> f64 {
        match self {
            RoundingMode::HalfAwayFromZero => value.round(),
            RoundingMode::HalfEven => value.round_ties_even(),
        }
    }

    /// Round to the nearest whole unit as an integer.
    #[inline]
    pub fn round_i64(self, value: f64) -> i64 {
        self.round(value) as i64
    }
}

/// Numeric normalization configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizationConfig {
    /// Rounding rule.
    pub rounding: RoundingMode,
}

/// One row of the exchange price-fraction table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickBand {
    /// Band applies to prices strictly below this bound (`None` = unbounded).
    pub below: Option<f64>,
    /// Tick size inside the band.
    pub tick: f64,
}

/// Tick size lookup configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TickConfig {
    /// Bands in ascending price order; the last one should be unbounded.
    pub bands: Vec<TickBand>,
}

impl Default for TickConfig {
    fn default() -> Self {
        // IDX equity price fractions.
        Self {
            bands: vec![
                TickBand { below: Some(200.0), tick: 1.0 },
                TickBand { below: Some(500.0), tick: 2.0 },
                TickBand { below: Some(2000.0), tick: 5.0 },
                TickBand { below: Some(5000.0), tick: 10.0 },
                TickBand { below: None, tick: 25.0 },
            ],
        }
    }
}

impl TickConfig {
    /// Tick size for a given price. Falls back to the last band.
    pub fn tick_for(&self, price: f64) -> f64 {
        self.bands
            .iter()
            .find(|band| band.below.map_or(true, |bound| price < bound))
            .or_else(|| self.bands.last())
            .map_or(0.0, |band| band.tick)
    }

    fn validate(&self) -> Result<()> {
        if self.bands.is_empty() {
            return Err(Error::config("tick table must have at least one band"));
        }
        let mut prev = f64::NEG_INFINITY;
        for band in &self.bands {
            if !(band.tick > 0.0) {
                return Err(Error::config(format!("tick size must be positive, got {}", band.tick)));
            }
            if let Some(bound) = band.below {
                if bound <= prev {
                    return Err(Error::config("tick bands must be in ascending price order"));
                }
                prev = bound;
            }
        }
        Ok(())
    }
}

/// Price target projection constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Ticks projected per unit of accumulation coefficient.
    pub accumulation_ticks: f64,
    /// Share of the price-step coefficient used by the realistic target.
    pub realistic_step_fraction: f64,
    /// Share of the price-step coefficient used by the maximum target.
    pub max_step_fraction: f64,
    /// Accumulation weight of the maximum target relative to the realistic one.
    pub max_accumulation_multiplier: f64,
    /// Markup over the accumulator's average buy price.
    pub cost_markup_rate: f64,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            accumulation_ticks: 10.0,
            realistic_step_fraction: 0.5,
            max_step_fraction: 1.0,
            max_accumulation_multiplier: 2.0,
            cost_markup_rate: 0.05,
        }
    }
}

impl TargetConfig {
    /// Reject constants that would break target ordering or monotonicity.
    pub fn validate(&self) -> Result<()> {
        let constants = [
            ("accumulation_ticks", self.accumulation_ticks),
            ("realistic_step_fraction", self.realistic_step_fraction),
            ("max_step_fraction", self.max_step_fraction),
            ("max_accumulation_multiplier", self.max_accumulation_multiplier),
            ("cost_markup_rate", self.cost_markup_rate),
        ];
        for (name, value) in constants {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::config(format!("{name} must be a non-negative number, got {value}")));
            }
        }
        if self.max_step_fraction < self.realistic_step_fraction {
            return Err(Error::config("max_step_fraction must be >= realistic_step_fraction"));
        }
        if self.max_accumulation_multiplier < 1.0 {
            return Err(Error::config("max_accumulation_multiplier must be >= 1"));
        }
        Ok(())
    }
}

/// Upstream feed description.
///
/// Credentials are passed in explicitly; nothing here reads the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Base URL of the market data API.
    pub base_url: String,
    /// Bearer token for the API.
    #[serde(skip_serializing)]
    pub auth_token: Option<String>,
    /// Maximum number of brokers per summary response.
    pub broker_limit: u32,
    /// Transaction type filter.
    pub transaction_type: String,
    /// Market board filter.
    pub market_board: String,
    /// Investor type filter.
    pub investor_type: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: "https://exodus.stockbit.com".to_string(),
            auth_token: None,
            broker_limit: 25,
            transaction_type: "TRANSACTION_TYPE_NET".to_string(),
            market_board: "MARKET_BOARD_REGULER".to_string(),
            investor_type: "INVESTOR_TYPE_ALL".to_string(),
        }
    }
}

impl FeedConfig {
    /// Set the bearer token.
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// URL of the broker summary endpoint for a query.
    pub fn broker_summary_url(&self, query: &StockQuery) -> String {
        format!(
            "{}/marketdetectors/{}?from={}&to={}&transaction_type={}&market_board={}&investor_type={}&limit={}",
            self.base_url.trim_end_matches('/'),
            query.emiten,
            query.from,
            query.to,
            self.transaction_type,
            self.market_board,
            self.investor_type,
            self.broker_limit,
        )
    }

    /// URL of the order book endpoint for an instrument.
    pub fn orderbook_url(&self, emiten: &str) -> String {
        format!(
            "{}/company-price-feed/v2/orderbook/companies/{}",
            self.base_url.trim_end_matches('/'),
            emiten,
        )
    }

    /// Value of the `authorization` header, if a token is set.
    pub fn authorization_header(&self) -> Option<String> {
        self.auth_token.as_ref().map(|token| format!("Bearer {token}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.normalization.rounding, RoundingMode::HalfAwayFromZero);
        assert_eq!(config.targets.max_step_fraction, 1.0);
    }

    #[test]
    fn test_rounding_modes() {
        assert_eq!(RoundingMode::HalfAwayFromZero.round(2.5), 3.0);
        assert_eq!(RoundingMode::HalfAwayFromZero.round(-2.5), -3.0);
        assert_eq!(RoundingMode::HalfEven.round(2.5), 2.0);
        assert_eq!(RoundingMode::HalfEven.round(3.5), 4.0);
        assert_eq!(RoundingMode::HalfEven.round_i64(2.6), 3);
    }

    #[test]
    fn test_tick_lookup() {
        let tick = TickConfig::default();
        assert_eq!(tick.tick_for(100.0), 1.0);
        assert_eq!(tick.tick_for(199.0), 1.0);
        assert_eq!(tick.tick_for(200.0), 2.0);
        assert_eq!(tick.tick_for(1500.0), 5.0);
        assert_eq!(tick.tick_for(4990.0), 10.0);
        assert_eq!(tick.tick_for(9000.0), 25.0);
    }

    #[test]
    fn test_partial_json() {
        let config = Config::from_json_str(
            r#"{"normalization": {"rounding": "half_even"}, "targets": {"accumulation_ticks": 4.0}}"#,
        )
        .unwrap();
        assert_eq!(config.normalization.rounding, RoundingMode::HalfEven);
        assert_eq!(config.targets.accumulation_ticks, 4.0);
        assert_eq!(config.targets.realistic_step_fraction, 0.5);
        assert_eq!(config.tick.bands.len(), 5);
    }

    #[test]
    fn test_rejects_inverted_targets() {
        let err = Config::from_json_str(
            r#"{"targets": {"realistic_step_fraction": 1.5, "max_step_fraction": 1.0}}"#,
        )
        .unwrap_err();
        assert_eq!(err.kind(), "config");

        let mut targets = TargetConfig::default();
        targets.accumulation_ticks = -1.0;
        assert!(targets.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_tick_table() {
        let tick = TickConfig {
            bands: vec![TickBand { below: None, tick: 0.0 }],
        };
        assert!(tick.validate().is_err());
        assert!(TickConfig { bands: vec![] }.validate().is_err());
    }

    #[test]
    fn test_feed_urls() {
        let feed = FeedConfig::default().with_auth_token("abc");
        let query = StockQuery::new(
            "soci",
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 1, 2).unwrap(),
        )
        .unwrap();

        assert_eq!(
            feed.broker_summary_url(&query),
            "https://exodus.stockbit.com/marketdetectors/SOCI?from=2026-01-01&to=2026-01-02\
             &transaction_type=TRANSACTION_TYPE_NET&market_board=MARKET_BOARD_REGULER\
             &investor_type=INVESTOR_TYPE_ALL&limit=25"
        );
        assert_eq!(
            feed.orderbook_url("SOCI"),
            "https://exodus.stockbit.com/company-price-feed/v2/orderbook/companies/SOCI"
        );
        assert_eq!(feed.authorization_header().as_deref(), Some("Bearer abc"));
    }
}
