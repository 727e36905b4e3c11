// =============================================================================
// Price-history provider abstraction
// =============================================================================
//
// A provider turns a validated `HistoryRequest` into raw daily bars.  Raw
// bars may arrive unsorted, with gaps (NaN closes) or repeated dates;
// `fetch_series` cleans them and builds the validated `PriceSeries` the
// metrics engine consumes.
// =============================================================================

use std::collections::BTreeMap;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::error::ProviderError;
use crate::market_data::HistoryRequest;
use crate::types::{PriceBar, PriceSeries};

#[async_trait]
pub trait PriceHistoryProvider: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    async fn fetch_bars(&self, request: &HistoryRequest) -> Result<Vec<PriceBar>, ProviderError>;
}

/// Drop unusable rows, sort by date and keep the last bar per date.
pub fn clean_bars(bars: Vec<PriceBar>) -> Vec<PriceBar> {
    let total = bars.len();
    let mut by_date: BTreeMap<_, PriceBar> = BTreeMap::new();
    for bar in bars {
        if bar.close.is_finite() && bar.close > 0.0 {
            by_date.insert(bar.date, bar);
        }
    }
    let cleaned: Vec<PriceBar> = by_date.into_values().collect();

    if cleaned.len() != total {
        debug!(
            raw = total,
            kept = cleaned.len(),
            "dropped missing or duplicate bars"
        );
    }
    cleaned
}

/// Fetch, clean and validate one series.
pub async fn fetch_series(
    provider: &dyn PriceHistoryProvider,
    request: &HistoryRequest,
) -> Result<PriceSeries, ProviderError> {
    info!(
        provider = provider.name(),
        symbol = %request.symbol,
        start = %request.start,
        end = %request.end,
        "fetching price history"
    );

    let raw = provider.fetch_bars(request).await?;
    let bars = clean_bars(raw);
    if bars.is_empty() {
        warn!(symbol = %request.symbol, "provider returned no usable bars");
        return Err(ProviderError::NoData {
            symbol: request.symbol.clone(),
        });
    }

    let series = PriceSeries::new(bars)?;
    info!(
        symbol = %request.symbol,
        trading_days = series.len(),
        actual_start = %series.first().date,
        actual_end = %series.last().date,
        "price history ready"
    );
    Ok(series)
}
