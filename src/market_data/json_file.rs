use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::error::ProviderError;
use crate::market_data::{HistoryRequest, PriceHistoryProvider};
use crate::types::PriceBar;

/// Reads `{dir}/{SYMBOL}.json`, a JSON array of `{"date": "YYYY-MM-DD",
/// "close": f64}` objects, and keeps the bars inside the request window.
#[derive(Debug, Clone)]
pub struct JsonFileProvider {
    dir: PathBuf,
}

impl JsonFileProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{symbol}.json"))
    }
}

#[async_trait]
impl PriceHistoryProvider for JsonFileProvider {
    fn name(&self) -> &'static str {
        "json_file"
    }

    async fn fetch_bars(&self, request: &HistoryRequest) -> Result<Vec<PriceBar>, ProviderError> {
        let path = self.path_for(&request.symbol);
        debug!(path = %path.display(), "reading price file");

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ProviderError::NoData {
                    symbol: request.symbol.clone(),
                });
            }
            Err(source) => {
                return Err(ProviderError::Io {
                    symbol: request.symbol.clone(),
                    source,
                });
            }
        };

        let bars: Vec<PriceBar> =
            serde_json::from_str(&content).map_err(|source| ProviderError::Parse {
                symbol: request.symbol.clone(),
                source,
            })?;

        Ok(bars.into_iter().filter(|b| request.contains(b.date)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::fetch_series;

    fn write_file(dir: &Path, symbol: &str, body: &str) {
        std::fs::write(dir.join(format!("{symbol}.json")), body).unwrap();
    }

    #[tokio::test]
    async fn reads_and_filters_to_window() {
        let tmp = tempfile::tempdir().unwrap();
        write_file(
            tmp.path(),
            "ACME",
            r#"[
                {"date": "2023-12-29", "close": 9.0},
                {"date": "2024-01-02", "close": 10.0},
                {"date": "2024-01-03", "close": 11.0},
                {"date": "2024-01-05", "close": 12.0}
            ]"#,
        );
        let provider = JsonFileProvider::new(tmp.path());
        let req = HistoryRequest::parse("acme", "2024-01-01", "2024-01-05").unwrap();

        let bars = provider.fetch_bars(&req).await.unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].close, 10.0);

        let series = fetch_series(&provider, &req).await.unwrap();
        assert_eq!(series.len(), 2);
    }

    #[tokio::test]
    async fn missing_file_is_no_data() {
        let tmp = tempfile::tempdir().unwrap();
        let provider = JsonFileProvider::new(tmp.path());
        let req = HistoryRequest::parse("NOPE", "2024-01-01", "2024-02-01").unwrap();
        let err = provider.fetch_bars(&req).await.unwrap_err();
        assert!(matches!(err, ProviderError::NoData { .. }));
    }

    #[tokio::test]
    async fn malformed_file_is_parse_error() {
        let tmp = tempfile::tempdir().unwrap();
        write_file(tmp.path(), "BAD", "{ not json");
        let provider = JsonFileProvider::new(tmp.path());
        let req = HistoryRequest::parse("BAD", "2024-01-01", "2024-02-01").unwrap();
        let err = provider.fetch_bars(&req).await.unwrap_err();
        assert!(matches!(err, ProviderError::Parse { .. }));
        assert_eq!(err.symbol(), Some("BAD"));
    }
}
