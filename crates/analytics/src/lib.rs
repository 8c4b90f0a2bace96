//! Derived analytics for the bandar analytics pipeline.
//!
//! This crate handles:
//! - Order-book depth and bid/offer averaging
//! - Accumulation and price-step coefficients
//! - Realistic and maximum price target projection
//! - The end-to-end `compute_analytics` pipeline

pub mod composer;
pub mod engine;

pub use composer::{AnalyticsComposer, TargetProjection};
pub use engine::{compute_analytics, AnalyticsEngine};
