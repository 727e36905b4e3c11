// =============================================================================
// Chart data — numeric series for the chart renderer
// =============================================================================
//
// Three charts, all aligned with the price series dates:
//   price     close + SMA/EMA per configured window (default 20, 50)
//   rsi       RSI line with fixed reference bands at 70 / 30
//   drawdown  drawdown in percent (fraction * 100), drawn as a filled area
//
// Rasterisation is left to whatever consumes the JSON files.
// =============================================================================

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::MetricsError;
use crate::indicators::{drawdown, moving_average, rsi};
use crate::types::PriceSeries;

#[derive(Debug, Clone, PartialEq)]
pub struct ChartParams {
    pub ma_windows: Vec<usize>,
    pub rsi_period: usize,
}

impl Default for ChartParams {
    fn default() -> Self {
        Self {
            ma_windows: moving_average::DEFAULT_MA_WINDOWS.to_vec(),
            rsi_period: rsi::DEFAULT_RSI_PERIOD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceChart {
    pub dates: Vec<NaiveDate>,
    pub close: Vec<f64>,
    pub sma: BTreeMap<usize, Vec<Option<f64>>>,
    pub ema: BTreeMap<usize, Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RsiChart {
    pub period: usize,
    pub dates: Vec<NaiveDate>,
    pub values: Vec<Option<f64>>,
    pub overbought: f64,
    pub oversold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawdownChart {
    pub dates: Vec<NaiveDate>,
    pub values_pct: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub ticker: String,
    pub price: PriceChart,
    pub rsi: RsiChart,
    pub drawdown: DrawdownChart,
}

/// Paths of the files written by [`write_chart_files`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartFiles {
    pub price: PathBuf,
    pub rsi: PathBuf,
    pub drawdown: PathBuf,
}

pub fn build_chart_data(
    ticker: &str,
    series: &PriceSeries,
    params: &ChartParams,
) -> Result<ChartData, MetricsError> {
    let dates = series.dates();
    let mas = moving_average::moving_averages(series, &params.ma_windows)?;

    let mut sma = BTreeMap::new();
    let mut ema = BTreeMap::new();
    for (window, pair) in mas.windows {
        sma.insert(window, pair.sma);
        ema.insert(window, pair.ema);
    }

    let price = PriceChart {
        dates: dates.clone(),
        close: series.closes(),
        sma,
        ema,
    };

    let rsi = RsiChart {
        period: params.rsi_period,
        dates: dates.clone(),
        values: rsi::rsi_series(series, params.rsi_period)?,
        overbought: rsi::OVERBOUGHT,
        oversold: rsi::OVERSOLD,
    };

    let drawdown = DrawdownChart {
        dates,
        values_pct: drawdown::drawdown_series(series)
            .into_iter()
            .map(|d| d * 100.0)
            .collect(),
    };

    Ok(ChartData {
        ticker: ticker.trim().to_uppercase(),
        price,
        rsi,
        drawdown,
    })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value)
        .with_context(|| format!("failed to serialise chart data for {}", path.display()))?;
    std::fs::write(path, content)
        .with_context(|| format!("failed to write chart file {}", path.display()))
}

/// Write one JSON file per chart into `dir`, creating it if needed.
pub fn write_chart_files(dir: impl AsRef<Path>, data: &ChartData) -> Result<ChartFiles> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create chart directory {}", dir.display()))?;

    let files = ChartFiles {
        price: dir.join(format!("{}_price.json", data.ticker)),
        rsi: dir.join(format!("{}_rsi.json", data.ticker)),
        drawdown: dir.join(format!("{}_drawdown.json", data.ticker)),
    };

    write_json(&files.price, &data.price)?;
    write_json(&files.rsi, &data.rsi)?;
    write_json(&files.drawdown, &data.drawdown)?;

    info!(ticker = %data.ticker, dir = %dir.display(), "chart data written");
    Ok(files)
}
