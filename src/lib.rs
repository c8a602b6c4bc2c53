//! Merchant payout risk engine.
//!
//! Scores merchants from weighted behavioral signals, maps the score onto a payout policy tier,
//! explains the outcome, and evaluates merchant batches under a bounded worker pool.

pub mod config;
pub mod error;
pub mod risk;
pub mod telemetry;
