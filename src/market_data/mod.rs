pub mod json_file;
pub mod provider;
pub mod request;
pub mod yahoo;

// Re-exports for convenient access (e.g. `use crate::market_data::HistoryRequest`).
pub use json_file::JsonFileProvider;
pub use provider::{fetch_series, PriceHistoryProvider};
pub use request::HistoryRequest;
pub use yahoo::YahooChartProvider;
