//! Core domain types and logic.

pub mod ohlcv;
pub mod bias;
pub mod indicator;
pub mod regime;
pub mod confluence;
pub mod risk;
pub mod recommendation;
pub mod signal;
pub mod backtest;
pub mod metrics;
pub mod config_validation;
pub mod universe;
pub mod error;
