// =============================================================================
// Equity Analyst — library root
// =============================================================================
//
// Metrics engine, price providers, chart data and reports.  The binary in
// `main.rs` wires these into the `analyze` and `serve` commands.
// =============================================================================

pub mod analysis;
pub mod api;
pub mod app_state;
pub mod charts;
pub mod error;
pub mod indicators;
pub mod market_data;
pub mod metrics;
pub mod report;
pub mod runtime_config;
pub mod types;
