// =============================================================================
// Equity Analyst — Main Entry Point
// =============================================================================
//
// Two modes:
//   analyze  one-shot batch: metrics, chart data and a text report per ticker
//   serve    HTTP API until Ctrl+C
// =============================================================================

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use equity_analyst::analysis::{build_provider, AnalysisJob, AnalysisSettings, Analyst};
use equity_analyst::api;
use equity_analyst::app_state::AppState;
use equity_analyst::charts::write_chart_files;
use equity_analyst::report::{
    render_text_report, write_report, QuantSummary, ReportInput, SentimentBundle,
};
use equity_analyst::runtime_config::AnalystConfig;

const DEFAULT_CONFIG_PATH: &str = "analyst_config.json";

#[derive(Parser)]
#[command(name = "equity-analyst", version, about = "Daily price metrics, charts and reports")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyse one or more tickers over a date window and write reports.
    Analyze {
        /// Comma-separated ticker symbols, e.g. AAPL,MSFT
        #[arg(long = "ticker", value_delimiter = ',', required = true)]
        tickers: Vec<String>,

        /// Window start, YYYY-MM-DD (inclusive)
        #[arg(long)]
        start: String,

        /// Window end, YYYY-MM-DD (exclusive)
        #[arg(long)]
        end: String,

        /// JSON sentiment bundle to include in every report
        #[arg(long)]
        sentiment: Option<PathBuf>,

        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
    },
    /// Run the HTTP API.
    Serve {
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & logging ─────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Analyze {
            tickers,
            start,
            end,
            sentiment,
            config,
        } => {
            let config = load_config(&config)?;
            analyze(&config, &tickers, &start, &end, sentiment.as_deref()).await
        }
        Command::Serve { config: path } => {
            let config = load_config(&path)?;
            serve(config, path).await
        }
    }
}

/// Load the config file (or defaults), apply environment overrides and
/// validate the combined result.
fn load_config(path: &Path) -> anyhow::Result<AnalystConfig> {
    let mut config = AnalystConfig::load_or_default(path);
    config.apply_env_overrides();
    config
        .validate()
        .context("invalid configuration after environment overrides")?;
    info!(
        provider = %config.provider,
        rsi_period = config.rsi_period,
        ma_windows = ?config.ma_windows,
        "configuration ready"
    );
    Ok(config)
}

fn load_sentiment(path: Option<&Path>) -> SentimentBundle {
    match path {
        Some(p) => SentimentBundle::load(p).unwrap_or_else(|e| {
            warn!(error = %format!("{e:#}"), "sentiment unavailable, using neutral fallback");
            SentimentBundle::unavailable()
        }),
        None => SentimentBundle::unavailable(),
    }
}

// =============================================================================
// analyze
// =============================================================================

async fn analyze(
    config: &AnalystConfig,
    tickers: &[String],
    start: &str,
    end: &str,
    sentiment_path: Option<&Path>,
) -> anyhow::Result<()> {
    let provider = build_provider(config)?;
    let analyst = Analyst::new(provider, AnalysisSettings::from(config));
    let sentiment = load_sentiment(sentiment_path);

    let jobs: Vec<AnalysisJob> = tickers
        .iter()
        .map(|t| AnalysisJob::new(t.as_str(), start, end))
        .collect();

    let results = analyst.run_batch(&jobs).await;
    let mut succeeded = 0usize;

    for (job, result) in jobs.iter().zip(results) {
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(ticker = %job.ticker, error = %e, "analysis failed");
                eprintln!("{}: {e}", job.ticker);
                continue;
            }
        };

        let symbol = outcome.metrics.ticker.as_str();
        let charts = match write_chart_files(&config.chart_dir, &outcome.charts) {
            Ok(files) => Some(files),
            Err(e) => {
                warn!(ticker = symbol, error = %format!("{e:#}"), "chart files not written");
                None
            }
        };

        let quant = QuantSummary::from_metrics(&outcome.metrics, config.rsi_fallback);
        let text = render_text_report(&ReportInput {
            ticker: symbol,
            period: &outcome.metrics.period,
            quant: &quant,
            sentiment: &sentiment,
            charts: charts.as_ref(),
            generated_at: Utc::now(),
        });

        let path = write_report(
            &config.report_dir,
            symbol,
            outcome.metrics.period.end_date,
            &text,
        )?;
        println!("{text}");
        println!("Report saved to {}\n", path.display());
        succeeded += 1;
    }

    info!(succeeded, total = jobs.len(), "batch finished");
    if succeeded == 0 {
        bail!("all {} analyses failed", jobs.len());
    }
    Ok(())
}

// =============================================================================
// serve
// =============================================================================

async fn serve(config: AnalystConfig, config_path: PathBuf) -> anyhow::Result<()> {
    let provider = build_provider(&config)?;
    let bind_addr = config.bind_addr.clone();
    let state = Arc::new(AppState::new(config, Some(config_path), provider));
    let app = api::rest::router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind API server to {bind_addr}"))?;
    info!(addr = %bind_addr, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "failed to listen for Ctrl+C");
            }
            info!("shutdown signal received");
        })
        .await
        .context("API server failed")?;

    info!("API server stopped");
    Ok(())
}
