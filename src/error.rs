// =============================================================================
// Error types
// =============================================================================
//
// `MetricsError` covers input that the engine refuses to compute on.  Missing
// history is NOT an error: indicators surface it as `None`.
//
// `ProviderError` covers everything that can go wrong while obtaining a price
// series.  Application layers wrap both in `anyhow` with context.
// =============================================================================

use chrono::NaiveDate;
use thiserror::Error;

/// Input rejected by the metrics engine before any computation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MetricsError {
    #[error("price series is empty")]
    EmptySeries,

    #[error("bar {index} ({date}) has invalid close {close}: must be finite and positive")]
    InvalidClose {
        index: usize,
        date: NaiveDate,
        close: f64,
    },

    #[error("bar {index} repeats date {date}")]
    DuplicateDate { index: usize, date: NaiveDate },

    #[error("bar {index} ({date}) is not after the previous bar ({previous})")]
    UnsortedDates {
        index: usize,
        previous: NaiveDate,
        date: NaiveDate,
    },

    #[error("{name} window must be positive, got {window}")]
    InvalidWindow { name: &'static str, window: usize },
}

/// Structured failure from a price-history provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The request itself is malformed (ticker, date format, date order).
    #[error("invalid request: {0}")]
    Validation(String),

    /// Transport-level failure (connect, timeout, body decode).
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The upstream service answered with an error for this symbol.
    #[error("{symbol}: {reason}")]
    Api { symbol: String, reason: String },

    #[error("no data found for {symbol}")]
    NoData { symbol: String },

    #[error("{symbol}: failed to read price file: {source}")]
    Io {
        symbol: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{symbol}: failed to parse price data: {source}")]
    Parse {
        symbol: String,
        #[source]
        source: serde_json::Error,
    },

    /// Bars survived cleaning but still do not form a valid series.
    #[error("invalid price series: {0}")]
    Series(#[from] MetricsError),
}

/// Failure of one end-to-end analysis run.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Metrics(#[from] MetricsError),
}

impl AnalysisError {
    pub fn symbol(&self) -> Option<&str> {
        match self {
            Self::Provider(e) => e.symbol(),
            Self::Metrics(_) => None,
        }
    }
}

impl ProviderError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Symbol the failure refers to, when one is known.
    pub fn symbol(&self) -> Option<&str> {
        match self {
            Self::Api { symbol, .. }
            | Self::NoData { symbol }
            | Self::Io { symbol, .. }
            | Self::Parse { symbol, .. } => Some(symbol),
            Self::Validation(_) | Self::Request(_) | Self::Series(_) => None,
        }
    }
}
