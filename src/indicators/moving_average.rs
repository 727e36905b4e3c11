// =============================================================================
// Moving Averages — SMA and unadjusted EMA
// =============================================================================
//
// SMA_w[i]  = mean(close[i-w+1 ..= i])          undefined for i < w - 1
//
// EMA_w:
//   alpha    = 2 / (w + 1)
//   EMA[0]   = close[0]
//   EMA[i]   = alpha * close[i] + (1 - alpha) * EMA[i-1]
//
// The EMA is seeded with the first close (recursive "unadjusted" form), so it
// is defined at every bar.  Both outputs are aligned index-for-index with the
// input series.
// =============================================================================

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::MetricsError;
use crate::indicators::rolling::RollingMean;
use crate::types::PriceSeries;

/// Default window set used for charts and reports.
pub const DEFAULT_MA_WINDOWS: [usize; 2] = [20, 50];

fn check_window(name: &'static str, window: usize) -> Result<(), MetricsError> {
    if window == 0 {
        return Err(MetricsError::InvalidWindow { name, window });
    }
    Ok(())
}

/// Simple moving average aligned with the series.
pub fn sma(series: &PriceSeries, window: usize) -> Result<Vec<Option<f64>>, MetricsError> {
    check_window("SMA", window)?;
    let mut acc = RollingMean::new(window);
    Ok(series.bars().iter().map(|b| acc.push(b.close)).collect())
}

/// Exponential moving average aligned with the series.
pub fn ema(series: &PriceSeries, window: usize) -> Result<Vec<f64>, MetricsError> {
    check_window("EMA", window)?;
    let alpha = 2.0 / (window as f64 + 1.0);

    let mut result = Vec::with_capacity(series.len());
    let mut prev = series.first().close;
    result.push(prev);
    for bar in &series.bars()[1..] {
        prev = alpha * bar.close + (1.0 - alpha) * prev;
        result.push(prev);
    }
    Ok(result)
}

/// SMA and EMA for one window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovingAveragePair {
    pub sma: Vec<Option<f64>>,
    pub ema: Vec<f64>,
}

/// SMA/EMA pairs keyed by window size.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovingAverages {
    pub windows: BTreeMap<usize, MovingAveragePair>,
}

impl MovingAverages {
    pub fn get(&self, window: usize) -> Option<&MovingAveragePair> {
        self.windows.get(&window)
    }
}

/// Compute SMA and EMA for every requested window.  Duplicate windows are
/// computed once.
pub fn moving_averages(
    series: &PriceSeries,
    windows: &[usize],
) -> Result<MovingAverages, MetricsError> {
    let mut out = MovingAverages::default();
    for &w in windows {
        if out.windows.contains_key(&w) {
            continue;
        }
        let pair = MovingAveragePair {
            sma: sma(series, w)?,
            ema: ema(series, w)?,
        };
        out.windows.insert(w, pair);
    }
    Ok(out)
}
