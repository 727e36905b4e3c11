use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// Longest ticker accepted before assuming a typo.
const MAX_TICKER_LEN: usize = 10;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A validated request for daily history of one symbol over `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRequest {
    pub symbol: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl HistoryRequest {
    /// Parse and validate user input.
    ///
    /// - ticker non-empty, at most 10 characters, upper-cased
    /// - both dates in `YYYY-MM-DD`
    /// - start strictly before end
    pub fn parse(ticker: &str, start: &str, end: &str) -> Result<Self, ProviderError> {
        let symbol = ticker.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(ProviderError::validation("ticker must be a non-empty string"));
        }
        if symbol.chars().count() > MAX_TICKER_LEN {
            return Err(ProviderError::validation(format!(
                "ticker '{symbol}' seems too long"
            )));
        }

        let start = parse_date("start_date", start)?;
        let end = parse_date("end_date", end)?;
        Self::new(symbol, start, end)
    }

    pub fn new(symbol: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Result<Self, ProviderError> {
        if start >= end {
            return Err(ProviderError::validation("start_date must be before end_date"));
        }
        Ok(Self {
            symbol: symbol.into(),
            start,
            end,
        })
    }

    /// Whether `date` falls inside the half-open request window.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end
    }
}

fn parse_date(field: &str, raw: &str) -> Result<NaiveDate, ProviderError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|_| {
        ProviderError::validation(format!("{field} '{raw}' is not in YYYY-MM-DD format"))
    })
}
