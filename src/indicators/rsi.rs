// =============================================================================
// Relative Strength Index (RSI) — plain rolling-mean variant
// =============================================================================
//
// Step 1 — delta_i = close_i - close_{i-1}
// Step 2 — gain_i = max(delta_i, 0), loss_i = max(-delta_i, 0)
// Step 3 — avg_gain / avg_loss = SIMPLE rolling mean of the trailing `period`
//          gains / losses.  This is deliberately not Wilder's smoothing;
//          downstream reports are calibrated against these values.
// Step 4 — RS  = avg_gain / avg_loss
//          RSI = 100 - 100 / (1 + RS)
//
// Thresholds:  RSI >= 70 => OVERBOUGHT,  RSI <= 30 => OVERSOLD.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::error::MetricsError;
use crate::indicators::rolling::RollingMean;
use crate::types::PriceSeries;

pub const DEFAULT_RSI_PERIOD: usize = 14;
pub const OVERBOUGHT: f64 = 70.0;
pub const OVERSOLD: f64 = 30.0;

/// Full RSI series aligned with the bars.
///
/// The first `period` entries are `None`: bar `period` is the first with
/// `period` deltas behind it.
///
/// # Edge cases
/// - `period == 0` => `InvalidWindow`
/// - avg_loss == 0 and avg_gain > 0 => 100.0
/// - avg_loss == 0 and avg_gain == 0 (flat window) => 50.0
pub fn rsi_series(series: &PriceSeries, period: usize) -> Result<Vec<Option<f64>>, MetricsError> {
    if period == 0 {
        return Err(MetricsError::InvalidWindow {
            name: "RSI",
            window: period,
        });
    }

    let mut gains = RollingMean::new(period);
    let mut losses = RollingMean::new(period);

    let mut result = Vec::with_capacity(series.len());
    result.push(None);

    for w in series.bars().windows(2) {
        let delta = w[1].close - w[0].close;
        let avg_gain = gains.push(delta.max(0.0));
        let avg_loss = losses.push((-delta).max(0.0));

        let value = match (avg_gain, avg_loss) {
            (Some(g), Some(l)) => Some(rsi_from_averages(g, l)),
            _ => None,
        };
        result.push(value);
    }

    Ok(result)
}

/// RSI at the last bar, or `None` when the series is shorter than
/// `period + 1` bars.
pub fn current_rsi(series: &PriceSeries, period: usize) -> Result<Option<f64>, MetricsError> {
    Ok(rsi_series(series, period)?.last().copied().flatten())
}

/// Convert average gain / average loss into an RSI value in [0, 100].
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 && avg_gain == 0.0 {
        50.0 // No movement at all — neutral.
    } else if avg_loss == 0.0 {
        100.0
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - 100.0 / (1.0 + rs)
    }
}

/// Momentum zone of an RSI reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RsiZone {
    Overbought,
    Oversold,
    Neutral,
}

impl std::fmt::Display for RsiZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Overbought => write!(f, "OVERBOUGHT"),
            Self::Oversold => write!(f, "OVERSOLD"),
            Self::Neutral => write!(f, "NEUTRAL"),
        }
    }
}

pub fn rsi_zone(value: f64) -> RsiZone {
    if value >= OVERBOUGHT {
        RsiZone::Overbought
    } else if value <= OVERSOLD {
        RsiZone::Oversold
    } else {
        RsiZone::Neutral
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::test_support::series_from_closes;

    fn closes(range: impl Iterator<Item = i32>) -> PriceSeries {
        let v: Vec<f64> = range.map(|x| x as f64).collect();
        series_from_closes(&v)
    }

    #[test]
    fn rsi_period_zero() {
        assert!(rsi_series(&closes(1..=5), 0).is_err());
    }

    #[test]
    fn rsi_insufficient_data() {
        // 14 closes => 13 deltas < 14.
        let series = closes(1..=14);
        let out = rsi_series(&series, 14).unwrap();
        assert_eq!(out.len(), 14);
        assert!(out.iter().all(Option::is_none));
        assert_eq!(current_rsi(&series, 14).unwrap(), None);
    }

    #[test]
    fn rsi_first_defined_at_index_period() {
        let out = rsi_series(&closes(1..=20), 14).unwrap();
        assert!(out[13].is_none());
        assert!(out[14].is_some());
    }

    #[test]
    fn rsi_all_gains() {
        let out = rsi_series(&closes(1..=30), 14).unwrap();
        for v in out.iter().flatten() {
            assert!((v - 100.0).abs() < 1e-10, "expected 100.0, got {v}");
        }
    }

    #[test]
    fn rsi_all_losses() {
        let out = rsi_series(&closes((1..=30).rev()), 14).unwrap();
        let defined: Vec<f64> = out.into_iter().flatten().collect();
        assert!(!defined.is_empty());
        for v in defined {
            assert!(v.abs() < 1e-10, "expected 0.0, got {v}");
        }
    }

    #[test]
    fn rsi_flat_market_is_neutral() {
        let series = series_from_closes(&[100.0; 30]);
        let value = current_rsi(&series, 14).unwrap().unwrap();
        assert!((value - 50.0).abs() < 1e-10);
    }

    #[test]
    fn rsi_flat_after_moves_is_neutral() {
        // Moves leave residue in a running sum; a flat trailing window must
        // still read exactly 50.
        let mut v = vec![100.1, 100.3, 99.7, 100.2];
        v.extend(std::iter::repeat(100.2).take(5));
        let series = series_from_closes(&v);
        assert_eq!(current_rsi(&series, 3).unwrap(), Some(50.0));
    }

    #[test]
    fn rsi_up_streak_then_one_down_day() {
        // 14 +1 moves then a single -1 move.
        let mut v: Vec<f64> = (100..=114).map(|x| x as f64).collect();
        v.push(113.0);
        let series = series_from_closes(&v);
        let value = current_rsi(&series, 14).unwrap().unwrap();
        // window: 13 gains of 1, 1 loss of 1 => RS = 13
        let expected = 100.0 - 100.0 / 14.0;
        assert!((value - expected).abs() < 1e-10);
        assert!(value > 50.0 && value < 100.0);
    }

    #[test]
    fn rsi_uses_plain_rolling_mean() {
        // period 2, deltas: +2, -1, +1
        let series = series_from_closes(&[10.0, 12.0, 11.0, 12.0]);
        let out = rsi_series(&series, 2).unwrap();
        // bar 2: gains (2, 0) / losses (0, 1) => RS 2 => 66.67
        assert!((out[2].unwrap() - (100.0 - 100.0 / 3.0)).abs() < 1e-10);
        // bar 3: gains (0, 1) / losses (1, 0) => RS 1 => 50
        assert!((out[3].unwrap() - 50.0).abs() < 1e-10);
    }

    #[test]
    fn rsi_range_check() {
        let v = vec![
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08, 45.89, 46.03,
            44.18, 44.22, 44.57, 43.42, 42.66, 43.13,
        ];
        let out = rsi_series(&series_from_closes(&v), 14).unwrap();
        for v in out.into_iter().flatten() {
            assert!((0.0..=100.0).contains(&v), "RSI {v} out of range");
        }
    }

    #[test]
    fn zones() {
        assert_eq!(rsi_zone(75.0), RsiZone::Overbought);
        assert_eq!(rsi_zone(70.0), RsiZone::Overbought);
        assert_eq!(rsi_zone(30.0), RsiZone::Oversold);
        assert_eq!(rsi_zone(50.0), RsiZone::Neutral);
        assert_eq!(RsiZone::Oversold.to_string(), "OVERSOLD");
    }
}
