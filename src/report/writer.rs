// =============================================================================
// Text report writer
// =============================================================================
//
// Sections, in order: title, period, market sentiment, key metrics, key
// highlights, key risks, chart files, disclaimer.  Ratios are shown as
// percentages with two decimals; undefined values print as `N/A`.
// =============================================================================

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use tracing::info;

use crate::charts::ChartFiles;
use crate::report::{QuantSummary, SentimentBundle};
use crate::types::Period;

const DISCLAIMER: &str = "This report is generated automatically and is for informational purposes only. \
It does not constitute financial advice, investment recommendations, or an offer to buy or sell securities. \
Past performance is not indicative of future results.";

/// Everything the report needs, borrowed from the analysis outcome.
pub struct ReportInput<'a> {
    pub ticker: &'a str,
    pub period: &'a Period,
    pub quant: &'a QuantSummary,
    pub sentiment: &'a SentimentBundle,
    pub charts: Option<&'a ChartFiles>,
    pub generated_at: DateTime<Utc>,
}

fn pct(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

fn pct_opt(value: Option<f64>) -> String {
    value.map(pct).unwrap_or_else(|| "N/A".to_string())
}

fn bullets(out: &mut String, items: &[String]) {
    if items.is_empty() {
        out.push_str("- (none)\n");
    }
    for item in items {
        let _ = writeln!(out, "- {item}");
    }
}

pub fn render_text_report(input: &ReportInput<'_>) -> String {
    let mut out = String::new();
    let q = input.quant;
    let s = input.sentiment;

    let _ = writeln!(out, "FINANCIAL ANALYSIS REPORT");
    let _ = writeln!(out, "=========================");
    let _ = writeln!(out, "Ticker: {}", input.ticker);
    let _ = writeln!(
        out,
        "Analysis Period: {} to {} ({} trading days)",
        input.period.start_date, input.period.end_date, input.period.trading_day_count
    );
    let _ = writeln!(
        out,
        "Generated: {}",
        input.generated_at.format("%Y-%m-%d %H:%M UTC")
    );

    let _ = writeln!(out, "\nMarket Sentiment:");
    let _ = writeln!(
        out,
        "{} (Confidence: {:.0}%)",
        s.sentiment,
        s.confidence_score * 100.0
    );

    let _ = writeln!(out, "\nKey Metrics:");
    let _ = writeln!(out, "- Total Return: {}", pct(q.total_return));
    let _ = writeln!(out, "- Average Daily Return: {}", pct_opt(q.avg_return));
    let _ = writeln!(out, "- Annual Volatility: {}", pct_opt(q.volatility));
    let rsi_note = match q.rsi_zone {
        Some(zone) if !q.rsi_substituted => format!(" ({zone})"),
        _ => " (insufficient history, neutral default)".to_string(),
    };
    let _ = writeln!(out, "- RSI: {:.2}{}", q.rsi, rsi_note);
    let _ = writeln!(out, "- Max Drawdown: {}", pct(q.max_drawdown));

    let _ = writeln!(out, "\nKey Highlights:");
    bullets(&mut out, &s.summary);

    let _ = writeln!(out, "\nKey Risks:");
    bullets(&mut out, &s.key_risks);

    if let Some(charts) = input.charts {
        let _ = writeln!(out, "\nCharts:");
        let _ = writeln!(out, "- Price with Moving Averages: {}", charts.price.display());
        let _ = writeln!(out, "- Relative Strength Index: {}", charts.rsi.display());
        let _ = writeln!(out, "- Drawdown: {}", charts.drawdown.display());
    }

    let _ = writeln!(out, "\nDisclaimer:");
    let _ = writeln!(out, "{DISCLAIMER}");
    out
}

/// Write `text` to `{dir}/{TICKER}_report_{end}.txt` and return the path.
pub fn write_report(
    dir: impl AsRef<Path>,
    ticker: &str,
    end_date: NaiveDate,
    text: &str,
) -> Result<PathBuf> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create report directory {}", dir.display()))?;

    let path = dir.join(format!("{ticker}_report_{end_date}.txt"));
    std::fs::write(&path, text)
        .with_context(|| format!("failed to write report {}", path.display()))?;

    info!(ticker, path = %path.display(), "report written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    use crate::indicators::rsi::RsiZone;
    use crate::types::SentimentLabel;

    fn period() -> Period {
        Period {
            start_date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 12, 30).unwrap(),
            trading_day_count: 251,
        }
    }

    fn quant() -> QuantSummary {
        QuantSummary {
            avg_return: Some(0.0015),
            volatility: Some(0.21),
            rsi: 62.0,
            rsi_substituted: false,
            rsi_zone: Some(RsiZone::Neutral),
            total_return: 0.35,
            max_drawdown: -0.18,
        }
    }

    fn sentiment() -> SentimentBundle {
        SentimentBundle {
            sentiment: SentimentLabel::Bullish,
            confidence_score: 0.72,
            key_risks: vec!["Inflation".into(), "Regulatory pressure".into()],
            summary: vec!["Strong earnings".into()],
        }
    }

    fn render(quant: &QuantSummary, charts: Option<&ChartFiles>) -> String {
        let period = period();
        let sentiment = sentiment();
        render_text_report(&ReportInput {
            ticker: "AAPL",
            period: &period,
            quant,
            sentiment: &sentiment,
            charts,
            generated_at: Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap(),
        })
    }

    #[test]
    fn report_contains_all_sections() {
        let text = render(&quant(), None);
        assert!(text.starts_with("FINANCIAL ANALYSIS REPORT"));
        assert!(text.contains("Analysis Period: 2024-01-02 to 2024-12-30 (251 trading days)"));
        assert!(text.contains("Bullish (Confidence: 72%)"));
        assert!(text.contains("- Total Return: 35.00%"));
        assert!(text.contains("- Annual Volatility: 21.00%"));
        assert!(text.contains("- Average Daily Return: 0.15%"));
        assert!(text.contains("- RSI: 62.00 (NEUTRAL)\n"));
        assert!(text.contains("- Max Drawdown: -18.00%"));
        assert!(text.contains("- Regulatory pressure"));
        assert!(text.contains("- Strong earnings"));
        assert!(text.contains("Disclaimer:"));
        assert!(!text.contains("Charts:"));
    }

    #[test]
    fn undefined_values_render_as_na() {
        let mut q = quant();
        q.volatility = None;
        q.avg_return = None;
        q.rsi = 50.0;
        q.rsi_substituted = true;
        q.rsi_zone = None;
        let text = render(&q, None);
        assert!(text.contains("- Annual Volatility: N/A"));
        assert!(text.contains("- Average Daily Return: N/A"));
        assert!(text.contains("- RSI: 50.00 (insufficient history"));
    }

    #[test]
    fn rsi_line_names_the_zone() {
        let mut q = quant();
        q.rsi = 74.5;
        q.rsi_zone = Some(RsiZone::Overbought);
        assert!(render(&q, None).contains("- RSI: 74.50 (OVERBOUGHT)\n"));

        q.rsi = 22.0;
        q.rsi_zone = Some(RsiZone::Oversold);
        assert!(render(&q, None).contains("- RSI: 22.00 (OVERSOLD)\n"));
    }

    #[test]
    fn chart_section_lists_files() {
        let charts = ChartFiles {
            price: PathBuf::from("out/AAPL_price.json"),
            rsi: PathBuf::from("out/AAPL_rsi.json"),
            drawdown: PathBuf::from("out/AAPL_drawdown.json"),
        };
        let text = render(&quant(), Some(&charts));
        assert!(text.contains("Charts:"));
        assert!(text.contains("AAPL_rsi.json"));
    }

    #[test]
    fn writes_report_file() {
        let tmp = tempfile::tempdir().unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        let path = write_report(tmp.path().join("reports"), "AAPL", end, "hello").unwrap();
        assert!(path.ends_with("AAPL_report_2024-12-31.txt"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "hello");
    }
}
