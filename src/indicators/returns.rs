// =============================================================================
// Returns & Volatility
// =============================================================================
//
// Daily return:   r_i = close_i / close_{i-1} - 1      (first bar has none)
// Volatility:     sample standard deviation of r (divide by n - 1),
//                 optionally scaled by sqrt(252) to an annual figure.
// Total return:   (last_close - first_close) / first_close
// =============================================================================

use chrono::NaiveDate;

use crate::types::PriceSeries;

/// Trading days per year used for annualisation.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Simple daily returns, one per bar after the first, keyed by the later date.
///
/// Always `series.len() - 1` elements long.
pub fn daily_returns(series: &PriceSeries) -> Vec<(NaiveDate, f64)> {
    series
        .bars()
        .windows(2)
        .map(|w| (w[1].date, w[1].close / w[0].close - 1.0))
        .collect()
}

fn return_values(series: &PriceSeries) -> Vec<f64> {
    daily_returns(series).into_iter().map(|(_, r)| r).collect()
}

/// Sample standard deviation (unbiased, n - 1 denominator).
///
/// `None` for fewer than two values.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Some(variance.sqrt())
}

/// Standard deviation of daily returns, annualised when `annualize` is set.
///
/// Needs at least two returns (three bars); otherwise `None`.
pub fn volatility(series: &PriceSeries, annualize: bool) -> Option<f64> {
    let daily = sample_std(&return_values(series))?;
    if annualize {
        Some(daily * TRADING_DAYS_PER_YEAR.sqrt())
    } else {
        Some(daily)
    }
}

/// Arithmetic mean of daily returns; `None` for a single-bar series.
pub fn average_daily_return(series: &PriceSeries) -> Option<f64> {
    let returns = return_values(series);
    if returns.is_empty() {
        return None;
    }
    Some(returns.iter().sum::<f64>() / returns.len() as f64)
}

/// Return over the whole period.  A single-bar series yields 0.0.
pub fn total_return(series: &PriceSeries) -> f64 {
    let first = series.first().close;
    let last = series.last().close;
    (last - first) / first
}
