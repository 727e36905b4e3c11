// =============================================================================
// Shared types used across the analysis pipeline
// =============================================================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::MetricsError;

/// One trading day's closing price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub close: f64,
}

impl PriceBar {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// A validated, date-ascending series of daily bars.
///
/// Construction is the only place the series invariants are checked, so every
/// indicator can index into `closes()` without re-validating:
/// - at least one bar
/// - dates strictly increasing (sorted, no duplicates)
/// - every close finite and positive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PriceBar>", into = "Vec<PriceBar>")]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn new(bars: Vec<PriceBar>) -> Result<Self, MetricsError> {
        if bars.is_empty() {
            return Err(MetricsError::EmptySeries);
        }

        for (index, bar) in bars.iter().enumerate() {
            if !bar.close.is_finite() || bar.close <= 0.0 {
                return Err(MetricsError::InvalidClose {
                    index,
                    date: bar.date,
                    close: bar.close,
                });
            }
        }

        for (offset, pair) in bars.windows(2).enumerate() {
            let index = offset + 1;
            if pair[1].date == pair[0].date {
                return Err(MetricsError::DuplicateDate {
                    index,
                    date: pair[1].date,
                });
            }
            if pair[1].date < pair[0].date {
                return Err(MetricsError::UnsortedDates {
                    index,
                    previous: pair[0].date,
                    date: pair[1].date,
                });
            }
        }

        Ok(Self { bars })
    }

    /// Convenience constructor from `(date, close)` pairs.
    pub fn from_pairs<I>(pairs: I) -> Result<Self, MetricsError>
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        Self::new(
            pairs
                .into_iter()
                .map(|(date, close)| PriceBar::new(date, close))
                .collect(),
        )
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|b| b.date).collect()
    }

    pub fn first(&self) -> &PriceBar {
        // Non-empty by construction.
        &self.bars[0]
    }

    pub fn last(&self) -> &PriceBar {
        &self.bars[self.bars.len() - 1]
    }
}

impl TryFrom<Vec<PriceBar>> for PriceSeries {
    type Error = MetricsError;

    fn try_from(bars: Vec<PriceBar>) -> Result<Self, Self::Error> {
        Self::new(bars)
    }
}

impl From<PriceSeries> for Vec<PriceBar> {
    fn from(series: PriceSeries) -> Self {
        series.bars
    }
}

/// Bounds of the analysed period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Period {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub trading_day_count: usize,
}

impl Period {
    pub fn of(series: &PriceSeries) -> Self {
        Self {
            start_date: series.first().date,
            end_date: series.last().date,
            trading_day_count: series.len(),
        }
    }
}

/// Worst peak-to-trough decline of a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawdownResult {
    /// Non-positive fraction, e.g. -0.18 for an 18 % decline.
    pub max_drawdown: f64,
    pub peak_date: NaiveDate,
    pub trough_date: NaiveDate,
}

/// The fixed metrics bundle produced for one ticker.
///
/// `None` marks an indicator that is undefined for the given history (too few
/// bars).  It serialises as `null`; substituting a display default is the
/// report layer's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsResult {
    pub ticker: String,
    pub period: Period,
    pub total_return: f64,
    pub volatility_annual: Option<f64>,
    pub max_drawdown: f64,
    pub drawdown_peak_date: NaiveDate,
    pub drawdown_trough_date: NaiveDate,
    pub rsi_current: Option<f64>,
    pub avg_daily_return: Option<f64>,
}

/// Overall market sentiment label supplied by the sentiment provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SentimentLabel {
    Bullish,
    Bearish,
    #[default]
    Neutral,
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bullish => write!(f, "Bullish"),
            Self::Bearish => write!(f, "Bearish"),
            Self::Neutral => write!(f, "Neutral"),
        }
    }
}
