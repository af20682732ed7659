//! Domain types for the expiry-cycle backtester

pub mod bar;
pub mod session;
pub mod signal;

pub use bar::Bar;
pub use session::{IndicatorRow, SessionBar};
pub use signal::{EvaluatedSignal, ExpiryCycle, Signal, SignalType};
