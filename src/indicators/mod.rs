// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the fixed indicator set computed
// by the metrics engine.  Every function takes the series explicitly and
// returns a fresh value; indicators that need more history than the series
// has return `None` instead of guessing.

pub mod drawdown;
pub mod moving_average;
pub mod returns;
pub mod rolling;
pub mod rsi;
