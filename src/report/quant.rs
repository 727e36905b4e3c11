use serde::{Deserialize, Serialize};

use crate::indicators::rsi::{rsi_zone, RsiZone};
use crate::types::MetricsResult;

/// Neutral RSI substituted when the series is too short for a reading.
pub const DEFAULT_RSI_FALLBACK: f64 = 50.0;

/// Quantitative figures as the report presents them.
///
/// This is the presentation boundary: an undefined RSI is replaced with the
/// caller's fallback here.  Volatility and average return stay optional and
/// render as `N/A`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantSummary {
    pub avg_return: Option<f64>,
    pub volatility: Option<f64>,
    pub rsi: f64,
    /// True when `rsi` is the fallback rather than a computed value.
    pub rsi_substituted: bool,
    /// Zone of the computed RSI; `None` when the fallback was used.
    pub rsi_zone: Option<RsiZone>,
    pub total_return: f64,
    pub max_drawdown: f64,
}

impl QuantSummary {
    pub fn from_metrics(metrics: &MetricsResult, rsi_fallback: f64) -> Self {
        Self {
            avg_return: metrics.avg_daily_return,
            volatility: metrics.volatility_annual,
            rsi: metrics.rsi_current.unwrap_or(rsi_fallback),
            rsi_substituted: metrics.rsi_current.is_none(),
            rsi_zone: metrics.rsi_current.map(rsi_zone),
            total_return: metrics.total_return,
            max_drawdown: metrics.max_drawdown,
        }
    }
}
