// =============================================================================
// Metrics Engine — aggregation of the fixed indicator set
// =============================================================================
//
// Assembles period bounds, total return, annualised volatility, maximum
// drawdown, current RSI and average daily return into one `MetricsResult`.
//
// Rounding (half away from zero):
//   total_return, volatility_annual, max_drawdown  -> 4 digits
//   rsi_current                                    -> 2 digits
//   avg_daily_return                               -> 6 digits
//
// Undefined indicators stay `None` through rounding.
// =============================================================================

use tracing::debug;

use crate::error::MetricsError;
use crate::indicators::{drawdown, returns, rsi};
use crate::types::{MetricsResult, Period, PriceSeries};

/// Knobs the caller may set; the formulas themselves are fixed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricsParams {
    pub rsi_period: usize,
}

impl Default for MetricsParams {
    fn default() -> Self {
        Self {
            rsi_period: rsi::DEFAULT_RSI_PERIOD,
        }
    }
}

/// Round `value` to `digits` decimal places.  Never returns `-0.0`.
pub fn round_to(value: f64, digits: i32) -> f64 {
    let scale = 10f64.powi(digits);
    let rounded = (value * scale).round() / scale;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

pub fn round_opt(value: Option<f64>, digits: i32) -> Option<f64> {
    value.map(|v| round_to(v, digits))
}

/// Compute the full metrics bundle with the default RSI period.
pub fn compute_all_metrics(ticker: &str, series: &PriceSeries) -> Result<MetricsResult, MetricsError> {
    compute_all_metrics_with(ticker, series, &MetricsParams::default())
}

pub fn compute_all_metrics_with(
    ticker: &str,
    series: &PriceSeries,
    params: &MetricsParams,
) -> Result<MetricsResult, MetricsError> {
    let dd = drawdown::max_drawdown(series);
    let rsi_current = rsi::current_rsi(series, params.rsi_period)?;

    let result = MetricsResult {
        ticker: ticker.trim().to_uppercase(),
        period: Period::of(series),
        total_return: round_to(returns::total_return(series), 4),
        volatility_annual: round_opt(returns::volatility(series, true), 4),
        max_drawdown: round_to(dd.max_drawdown, 4),
        drawdown_peak_date: dd.peak_date,
        drawdown_trough_date: dd.trough_date,
        rsi_current: round_opt(rsi_current, 2),
        avg_daily_return: round_opt(returns::average_daily_return(series), 6),
    };

    debug!(
        ticker = %result.ticker,
        bars = series.len(),
        total_return = result.total_return,
        volatility = ?result.volatility_annual,
        max_drawdown = result.max_drawdown,
        rsi = ?result.rsi_current,
        "metrics computed"
    );

    Ok(result)
}
