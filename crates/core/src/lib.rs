//! Core types and configuration for the bandar analytics pipeline.
//!
//! This crate provides shared types used across all other crates:
//! - Raw feed payloads and normalized records
//! - Derived metrics and the persistence row
//! - Configuration structures
//! - Common error types

pub mod config;
pub mod error;
pub mod types;

pub use config::{Config, RoundingMode};
pub use error::{Error, Result};
pub use types::*;
