//! Pluggable components: indicators and signal checks.

pub mod check;
pub mod indicator;

pub use check::{all_pass, SignalCheck, SignalChecks};
pub use indicator::{Column, Indicator};
