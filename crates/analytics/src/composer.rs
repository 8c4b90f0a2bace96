//! Analytics composition.
//!
//! Merges the ranked broker with the order-book snapshot into the derived
//! metrics record. Pure arithmetic; it fails on a zero tick size or on
//! integer fields whose sum or difference leaves the `i64` range.

use bandar_core::config::TargetConfig;
use bandar_core::{BrokerRecord, Config, DerivedMetrics, Error, MarketRecord, Result, RoundingMode};
use tracing::info;

/// Total order-book depth: bid volume + offer volume.
#[inline]
pub fn total_depth(bid_volume: i64, offer_volume: i64) -> Result<i64> {
    bid_volume
        .checked_add(offer_volume)
        .ok_or_else(|| Error::overflow(format!("depth {bid_volume} + {offer_volume}")))
}

/// Accumulation coefficient `a`: accumulated lots over total depth.
///
/// Zero depth yields `0.0`; there is no visible liquidity to control.
#[inline]
pub fn accumulation_coefficient(accumulated_lots: i64, depth: i64) -> f64 {
    if depth > 0 {
        accumulated_lots as f64 / depth as f64
    } else {
        0.0
    }
}

/// Price-step coefficient `p`: ticks between average buy price and last price.
pub fn price_step_coefficient(last_price: i64, average_buy_price: i64, tick_size: f64) -> Result<f64> {
    check_tick(tick_size)?;
    let spread = last_price
        .checked_sub(average_buy_price)
        .ok_or_else(|| Error::overflow(format!("price step {last_price} - {average_buy_price}")))?;
    Ok(spread as f64 / tick_size)
}

fn check_tick(tick_size: f64) -> Result<()> {
    if tick_size == 0.0 {
        return Err(Error::division_by_zero("tick size normalized to zero"));
    }
    if !tick_size.is_finite() || tick_size < 0.0 {
        return Err(Error::division_by_zero(format!("tick size {tick_size} is not a usable divisor")));
    }
    Ok(())
}

/// Projected price targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetProjection {
    pub realistic: i64,
    pub max: i64,
}

/// Composes derived metrics from one broker and one market record.
#[derive(Debug, Clone)]
pub struct AnalyticsComposer {
    targets: TargetConfig,
    rounding: RoundingMode,
}

impl Default for AnalyticsComposer {
    fn default() -> Self {
        Self {
            targets: TargetConfig::default(),
            rounding: RoundingMode::default(),
        }
    }
}

impl AnalyticsComposer {
    /// Create a composer from configuration.
    ///
    /// Rejects target constants that would break `max >= realistic` or
    /// monotonicity.
    pub fn new(config: &Config) -> Result<Self> {
        config.targets.validate()?;
        Ok(Self {
            targets: config.targets.clone(),
            rounding: config.normalization.rounding,
        })
    }

    /// Compose the derived metrics. Fails as a whole on a zero tick size.
    pub fn compose(&self, broker: &BrokerRecord, market: &MarketRecord) -> Result<DerivedMetrics> {
        let tick = market.tick_size;
        let price_step = price_step_coefficient(market.last_price, broker.average_buy_price, tick)?;

        let depth = total_depth(market.bid_volume, market.offer_volume)?;
        let accumulation = accumulation_coefficient(broker.accumulated_lots, depth);
        let average_bid_offer = self.rounding.round_i64(depth as f64 / 2.0);

        let board_levels = if market.best_offer > market.lowest_bid {
            let span = market
                .best_offer
                .checked_sub(market.lowest_bid)
                .ok_or_else(|| Error::overflow("board span"))?;
            self.rounding.round_i64(span as f64 / tick)
        } else {
            0
        };

        let base = self.base_price(market.last_price, broker.average_buy_price);
        let targets = self.project_targets(base, accumulation, price_step, tick)?;

        let metrics = DerivedMetrics {
            total_depth: depth,
            average_bid_offer,
            board_levels,
            accumulation,
            price_step,
            target_realistic: targets.realistic,
            target_max: targets.max,
        };
        info!(
            broker = %broker.broker_code,
            depth,
            a = accumulation,
            p = price_step,
            target_realistic = targets.realistic,
            target_max = targets.max,
            "analytics composed"
        );
        Ok(metrics)
    }

    /// Projection anchor: the higher of last price and cost basis, plus markup.
    pub fn base_price(&self, last_price: i64, average_buy_price: i64) -> f64 {
        let anchor = last_price.max(average_buy_price) as f64;
        anchor + average_buy_price.max(0) as f64 * self.targets.cost_markup_rate
    }

    /// Project both targets from an anchor price and the two coefficients.
    ///
    /// Non-decreasing in `accumulation` and `price_step`; `max >= realistic`.
    pub fn project_targets(
        &self,
        base: f64,
        accumulation: f64,
        price_step: f64,
        tick_size: f64,
    ) -> Result<TargetProjection> {
        check_tick(tick_size)?;
        let t = &self.targets;
        let a = accumulation.max(0.0);
        let p = price_step.max(0.0);

        let realistic_ticks = a * t.accumulation_ticks + p * t.realistic_step_fraction;
        let max_ticks =
            a * t.accumulation_ticks * t.max_accumulation_multiplier + p * t.max_step_fraction;

        Ok(TargetProjection {
            realistic: self.snap(base + tick_size * realistic_ticks, tick_size),
            max: self.snap(base + tick_size * max_ticks, tick_size),
        })
    }

    /// Snap a price to the tick grid, then to a whole unit.
    fn snap(&self, price: f64, tick_size: f64) -> i64 {
        let on_grid = self.rounding.round(price / tick_size) * tick_size;
        self.rounding.round_i64(on_grid)
    }
}
