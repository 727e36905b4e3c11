// =============================================================================
// Yahoo Finance chart API provider
// =============================================================================
//
// GET {base}/v8/finance/chart/{symbol}?period1=..&period2=..&interval=1d
//
// period1/period2 are UNIX seconds at UTC midnight; period2 is exclusive.
// Timestamps in the response mark the session open in UTC, so they are
// shifted by the exchange `gmtoffset` before taking the calendar date.  The
// adjusted close is preferred over the raw close when present.
// =============================================================================

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::error::ProviderError;
use crate::market_data::{HistoryRequest, PriceHistoryProvider};
use crate::types::PriceBar;

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
const USER_AGENT: &str = "Mozilla/5.0 (compatible; equity-analyst/1.0)";

#[derive(Clone)]
pub struct YahooChartProvider {
    base_url: String,
    client: reqwest::Client,
}

impl YahooChartProvider {
    pub fn new(timeout: Duration) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self::with_base_url(DEFAULT_BASE_URL, client))
    }

    /// Point the provider at another chart host (mirror, proxy, test server).
    pub fn with_base_url(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        let base_url: String = base_url.into();
        let base_url = base_url.trim_end_matches('/').to_string();
        debug!(base_url = %base_url, "YahooChartProvider initialised");
        Self { base_url, client }
    }
}

#[async_trait]
impl PriceHistoryProvider for YahooChartProvider {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    #[instrument(skip(self), fields(symbol = %request.symbol), name = "yahoo::fetch_bars")]
    async fn fetch_bars(&self, request: &HistoryRequest) -> Result<Vec<PriceBar>, ProviderError> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, request.symbol);
        let query = [
            ("period1", midnight_utc(request.start).to_string()),
            ("period2", midnight_utc(request.end).to_string()),
            ("interval", "1d".to_string()),
            ("events", "history".to_string()),
        ];

        let resp = self.client.get(&url).query(&query).send().await?;
        let status = resp.status();
        let text = resp.text().await?;

        match serde_json::from_str::<ChartEnvelope>(&text) {
            Ok(envelope) => parse_chart(&request.symbol, envelope),
            Err(source) if status.is_success() => Err(ProviderError::Parse {
                symbol: request.symbol.clone(),
                source,
            }),
            Err(_) => {
                warn!(%status, "chart request failed");
                Err(ProviderError::Api {
                    symbol: request.symbol.clone(),
                    reason: format!("HTTP {status}"),
                })
            }
        }
    }
}

fn midnight_utc(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

// -----------------------------------------------------------------------------
// Response shape
// -----------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Debug, Default, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<QuoteBlock>,
    #[serde(default)]
    adjclose: Vec<AdjCloseBlock>,
}

#[derive(Debug, Deserialize)]
struct QuoteBlock {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseBlock {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

fn parse_chart(symbol: &str, envelope: ChartEnvelope) -> Result<Vec<PriceBar>, ProviderError> {
    if let Some(err) = envelope.chart.error {
        return Err(ProviderError::Api {
            symbol: symbol.to_string(),
            reason: format!("{}: {}", err.code, err.description),
        });
    }

    let Some(result) = envelope.chart.result.and_then(|r| r.into_iter().next()) else {
        return Err(ProviderError::NoData {
            symbol: symbol.to_string(),
        });
    };

    let closes = result
        .indicators
        .adjclose
        .into_iter()
        .next()
        .map(|b| b.adjclose)
        .filter(|c| c.len() == result.timestamp.len())
        .or_else(|| result.indicators.quote.into_iter().next().map(|q| q.close))
        .unwrap_or_default();

    let offset = result.meta.gmtoffset;
    let bars = result
        .timestamp
        .iter()
        .zip(closes)
        .filter_map(|(&ts, close)| {
            let date = DateTime::from_timestamp(ts + offset, 0)?.date_naive();
            Some(PriceBar::new(date, close?))
        })
        .collect();

    Ok(bars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use axum::extract::{Path, Query};
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use axum::routing::get;
    use axum::Router;

    use crate::market_data::fetch_series;

    fn envelope(json: &str) -> ChartEnvelope {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn parses_adjusted_closes_with_gmt_offset() {
        // 2024-01-02 14:30 UTC = 09:30 New York
        let body = r#"{"chart":{"result":[{
            "meta":{"gmtoffset":-18000},
            "timestamp":[1704205800,1704292200,1704378600],
            "indicators":{
                "quote":[{"close":[185.6,184.2,null]}],
                "adjclose":[{"adjclose":[184.9,183.5,null]}]
            }}],"error":null}}"#;
        let bars = parse_chart("AAPL", envelope(body)).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(bars[0].close, 184.9);
        assert_eq!(bars[1].date, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
    }

    #[test]
    fn falls_back_to_raw_close() {
        let body = r#"{"chart":{"result":[{
            "meta":{"gmtoffset":0},
            "timestamp":[1704240000],
            "indicators":{"quote":[{"close":[10.5]}]}}],"error":null}}"#;
        let bars = parse_chart("X", envelope(body)).unwrap();
        assert_eq!(bars, vec![PriceBar::new(NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(), 10.5)]);
    }

    #[test]
    fn api_error_is_structured() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        let err = parse_chart("XYZFAKE", envelope(body)).unwrap_err();
        match err {
            ProviderError::Api { symbol, reason } => {
                assert_eq!(symbol, "XYZFAKE");
                assert!(reason.contains("delisted"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn empty_result_is_no_data() {
        let body = r#"{"chart":{"result":[],"error":null}}"#;
        assert!(matches!(
            parse_chart("X", envelope(body)),
            Err(ProviderError::NoData { .. })
        ));
    }

    // -------------------------------------------------------------------------
    // HTTP round trips against a local chart server
    // -------------------------------------------------------------------------

    const CHART_BODY: &str = r#"{"chart":{"result":[{
        "meta":{"gmtoffset":-18000},
        "timestamp":[1704205800,1704292200,1704378600],
        "indicators":{"quote":[{"close":[185.6,184.2,181.9]}]}}],"error":null}}"#;

    async fn chart(
        Path(symbol): Path<String>,
        Query(query): Query<HashMap<String, String>>,
    ) -> Response {
        match symbol.as_str() {
            "GONE" => (StatusCode::NOT_FOUND, "Not Found").into_response(),
            "GARBLED" => (StatusCode::OK, "<html>maintenance</html>").into_response(),
            _ if query.get("interval").map(String::as_str) != Some("1d")
                || !query.contains_key("period1")
                || !query.contains_key("period2") =>
            {
                (StatusCode::BAD_REQUEST, "missing query").into_response()
            }
            _ => (
                [(axum::http::header::CONTENT_TYPE, "application/json")],
                CHART_BODY,
            )
                .into_response(),
        }
    }

    async fn local_provider() -> YahooChartProvider {
        let app = Router::new().route("/v8/finance/chart/:symbol", get(chart));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        YahooChartProvider::with_base_url(format!("http://{addr}/"), client)
    }

    fn request(symbol: &str) -> HistoryRequest {
        HistoryRequest::parse(symbol, "2024-01-01", "2024-01-05").unwrap()
    }

    #[tokio::test]
    async fn fetches_bars_over_http() {
        let provider = local_provider().await;
        let bars = provider.fetch_bars(&request("AAPL")).await.unwrap();
        assert_eq!(bars.len(), 3);
        assert_eq!(bars[2].date, NaiveDate::from_ymd_opt(2024, 1, 4).unwrap());
        assert_eq!(bars[2].close, 181.9);

        let series = fetch_series(&provider, &request("AAPL")).await.unwrap();
        assert_eq!(series.len(), 3);
    }

    #[tokio::test]
    async fn non_json_error_status_is_api_error() {
        let provider = local_provider().await;
        match provider.fetch_bars(&request("GONE")).await.unwrap_err() {
            ProviderError::Api { symbol, reason } => {
                assert_eq!(symbol, "GONE");
                assert!(reason.contains("404"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_json_success_is_parse_error() {
        let provider = local_provider().await;
        let err = provider.fetch_bars(&request("GARBLED")).await.unwrap_err();
        assert!(matches!(err, ProviderError::Parse { .. }));
    }

    #[test]
    fn midnight_timestamps() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(midnight_utc(d), 1_704_067_200);
    }
}
