//! Core domain types and logic.

pub mod ohlcv;
pub mod position;
pub mod portfolio;
pub mod execution;
pub mod backtest;
pub mod metrics;
pub mod indicator;
pub mod strategy;
pub mod report;
pub mod batch;
pub mod config_validation;
pub mod error;
