// =============================================================================
// Maximum Drawdown
// =============================================================================
//
// running_max_i = max(close_0 ..= close_i)
// drawdown_i    = (close_i - running_max_i) / running_max_i      (always <= 0)
//
// The trough is the first bar with the most negative drawdown.  The peak is
// the bar that held the running maximum at the trough, i.e. the earliest
// highest close in the prefix ending at the trough.  A later, higher peak is
// never selected.
// =============================================================================

use crate::types::{DrawdownResult, PriceSeries};

/// Drawdown fraction at every bar, aligned with the series.
pub fn drawdown_series(series: &PriceSeries) -> Vec<f64> {
    let mut running_max = f64::MIN;
    series
        .bars()
        .iter()
        .map(|b| {
            running_max = running_max.max(b.close);
            (b.close - running_max) / running_max
        })
        .collect()
}

/// Worst peak-to-trough decline with its dates.
///
/// A non-decreasing series yields 0.0 with peak == trough == first date.
pub fn max_drawdown(series: &PriceSeries) -> DrawdownResult {
    let bars = series.bars();

    let mut peak_idx = 0;
    let mut best = (0.0_f64, 0_usize, 0_usize); // (drawdown, peak, trough)

    for (i, bar) in bars.iter().enumerate() {
        // Strict comparison keeps the earliest bar on equal highs.
        if bar.close > bars[peak_idx].close {
            peak_idx = i;
        }
        let peak = bars[peak_idx].close;
        let dd = (bar.close - peak) / peak;
        if dd < best.0 {
            best = (dd, peak_idx, i);
        }
    }

    let (max_drawdown, peak, trough) = best;
    DrawdownResult {
        max_drawdown,
        peak_date: bars[peak].date,
        trough_date: bars[trough].date,
    }
}
