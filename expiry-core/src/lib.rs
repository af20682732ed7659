//! Expiry Core: session resampling, indicators, expiry cycles, signals, outcomes.
//!
//! This crate contains the single-instrument signal engine:
//! - Domain types (minute bars, session bars, indicator rows, signals)
//! - Session resampler anchored to market open/close
//! - Indicator pipeline (RSI, Bollinger bands) behind the `Indicator` trait
//! - Monthly expiry calendar and cycle partitioning
//! - Cycle-scoped signal generation (at most one BULL and one BEAR per cycle)
//! - Outcome evaluation against the expiry-day close and win-rate aggregation

pub mod calendar;
pub mod components;
pub mod domain;
pub mod engine;
pub mod indicators;
