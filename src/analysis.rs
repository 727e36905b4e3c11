// =============================================================================
// Analysis Orchestrator
// =============================================================================
//
// One run = validate request -> fetch + clean history -> metrics -> chart
// data.  Runs share nothing but the provider handle, so a batch of tickers is
// simply a set of independent futures polled together.
// =============================================================================

use std::sync::Arc;

use anyhow::Result;
use futures_util::future::join_all;
use serde::Serialize;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::charts::{build_chart_data, ChartData, ChartParams};
use crate::error::AnalysisError;
use crate::indicators::rsi::{rsi_zone, RsiZone};
use crate::market_data::{
    fetch_series, HistoryRequest, JsonFileProvider, PriceHistoryProvider, YahooChartProvider,
};
use crate::metrics::{compute_all_metrics_with, MetricsParams};
use crate::runtime_config::{AnalystConfig, ProviderKind};
use crate::types::MetricsResult;

/// Indicator settings applied to every run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisSettings {
    pub metrics: MetricsParams,
    pub charts: ChartParams,
}

impl From<&AnalystConfig> for AnalysisSettings {
    fn from(config: &AnalystConfig) -> Self {
        Self {
            metrics: config.metrics_params(),
            charts: config.chart_params(),
        }
    }
}

/// Result of one successful run.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisOutcome {
    pub run_id: Uuid,
    pub request: HistoryRequest,
    pub metrics: MetricsResult,
    /// Zone of `metrics.rsi_current`, when defined.
    pub rsi_zone: Option<RsiZone>,
    pub charts: ChartData,
}

/// One requested analysis as supplied by a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisJob {
    pub ticker: String,
    pub start: String,
    pub end: String,
}

impl AnalysisJob {
    pub fn new(ticker: impl Into<String>, start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            start: start.into(),
            end: end.into(),
        }
    }
}

/// Build the provider selected by `config`.
pub fn build_provider(config: &AnalystConfig) -> Result<Arc<dyn PriceHistoryProvider>> {
    let provider: Arc<dyn PriceHistoryProvider> = match config.provider {
        ProviderKind::Yahoo => Arc::new(YahooChartProvider::new(config.request_timeout())?),
        ProviderKind::JsonFile => Arc::new(JsonFileProvider::new(&config.data_dir)),
    };
    info!(provider = provider.name(), "price provider ready");
    Ok(provider)
}

#[derive(Clone)]
pub struct Analyst {
    provider: Arc<dyn PriceHistoryProvider>,
    settings: AnalysisSettings,
}

impl Analyst {
    pub fn new(provider: Arc<dyn PriceHistoryProvider>, settings: AnalysisSettings) -> Self {
        Self { provider, settings }
    }

    pub fn settings(&self) -> &AnalysisSettings {
        &self.settings
    }

    /// Run the full pipeline for one ticker.
    pub async fn run(&self, ticker: &str, start: &str, end: &str) -> Result<AnalysisOutcome, AnalysisError> {
        let run_id = Uuid::new_v4();
        let span = info_span!("analysis", %run_id, ticker = %ticker.trim().to_uppercase());

        async move {
            let request = HistoryRequest::parse(ticker, start, end)?;
            let series = fetch_series(self.provider.as_ref(), &request).await?;

            let metrics = compute_all_metrics_with(&request.symbol, &series, &self.settings.metrics)?;
            let charts = build_chart_data(&request.symbol, &series, &self.settings.charts)?;

            info!(
                trading_days = metrics.period.trading_day_count,
                total_return = metrics.total_return,
                "analysis complete"
            );

            Ok::<_, AnalysisError>(AnalysisOutcome {
                run_id,
                request,
                rsi_zone: metrics.rsi_current.map(rsi_zone),
                metrics,
                charts,
            })
        }
        .instrument(span)
        .await
    }

    /// Run independent analyses concurrently; results keep the job order.
    pub async fn run_batch(&self, jobs: &[AnalysisJob]) -> Vec<Result<AnalysisOutcome, AnalysisError>> {
        info!(count = jobs.len(), "starting analysis batch");
        let results = join_all(
            jobs.iter()
                .map(|job| self.run(&job.ticker, &job.start, &job.end)),
        )
        .await;

        let failed = results.iter().filter(|r| r.is_err()).count();
        if failed > 0 {
            warn!(failed, total = jobs.len(), "some analyses failed");
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{MetricsError, ProviderError};
    use crate::market_data::provider::test_support::StaticProvider;
    use crate::types::PriceBar;

    fn bars_from(closes: &[f64]) -> Vec<PriceBar> {
        let start = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| PriceBar::new(start + chrono::Duration::days(i as i64), c))
            .collect()
    }

    fn analyst(closes: &[f64]) -> Analyst {
        Analyst::new(
            Arc::new(StaticProvider(bars_from(closes))),
            AnalysisSettings::default(),
        )
    }

    #[tokio::test]
    async fn run_produces_metrics_and_charts() {
        let a = analyst(&[100.0, 102.0, 101.0, 105.0, 95.0]);
        let outcome = a.run("abc", "2024-01-01", "2024-02-01").await.unwrap();
        assert_eq!(outcome.request.symbol, "ABC");
        assert_eq!(outcome.metrics.ticker, "ABC");
        assert_eq!(outcome.metrics.max_drawdown, -0.0952);
        assert_eq!(outcome.charts.price.close.len(), 5);
        assert_eq!(outcome.rsi_zone, None);
    }

    #[tokio::test]
    async fn invalid_request_fails_before_fetch() {
        let a = analyst(&[1.0]);
        let err = a.run("AAPL", "2024-02-01", "2024-01-01").await.unwrap_err();
        assert!(matches!(err, AnalysisError::Provider(ProviderError::Validation(_))));
    }

    #[tokio::test]
    async fn invalid_window_is_metrics_error() {
        let settings = AnalysisSettings {
            metrics: MetricsParams { rsi_period: 0 },
            charts: ChartParams::default(),
        };
        let a = Analyst::new(Arc::new(StaticProvider(bars_from(&[1.0, 2.0]))), settings);
        let err = a.run("X", "2024-01-01", "2024-02-01").await.unwrap_err();
        assert!(matches!(err, AnalysisError::Metrics(MetricsError::InvalidWindow { .. })));
    }

    #[tokio::test]
    async fn batch_keeps_order_and_isolates_failures() {
        let a = analyst(&[10.0, 11.0, 12.0]);
        let jobs = vec![
            AnalysisJob::new("AAA", "2024-01-01", "2024-02-01"),
            AnalysisJob::new("", "2024-01-01", "2024-02-01"),
            AnalysisJob::new("CCC", "2024-01-01", "2024-02-01"),
        ];
        let results = a.run_batch(&jobs).await;
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().metrics.ticker, "AAA");
        assert!(results[1].is_err());
        assert_eq!(results[2].as_ref().unwrap().metrics.ticker, "CCC");
        assert_ne!(
            results[0].as_ref().unwrap().run_id,
            results[2].as_ref().unwrap().run_id
        );
    }

    #[test]
    fn settings_from_config() {
        let mut cfg = AnalystConfig::default();
        cfg.rsi_period = 9;
        cfg.ma_windows = vec![10];
        let s = AnalysisSettings::from(&cfg);
        assert_eq!(s.metrics.rsi_period, 9);
        assert_eq!(s.charts.ma_windows, vec![10]);
        assert_eq!(s.charts.rsi_period, 9);
    }

    #[test]
    fn json_provider_from_config() {
        let mut cfg = AnalystConfig::default();
        cfg.provider = ProviderKind::JsonFile;
        let provider = build_provider(&cfg).unwrap();
        assert_eq!(provider.name(), "json_file");
    }
}
