use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::types::SentimentLabel;

/// Output of the sentiment provider, merged into the report next to the
/// quantitative metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentBundle {
    pub sentiment: SentimentLabel,
    /// Confidence in [0, 1].
    pub confidence_score: f64,
    pub key_risks: Vec<String>,
    pub summary: Vec<String>,
}

impl SentimentBundle {
    /// Placeholder used when no sentiment source is available.
    pub fn unavailable() -> Self {
        Self {
            sentiment: SentimentLabel::Neutral,
            confidence_score: 0.0,
            key_risks: vec!["Unable to fetch news data".to_string()],
            summary: vec!["Market research unavailable".to_string()],
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.confidence_score) {
            bail!(
                "confidence_score must be within [0, 1], got {}",
                self.confidence_score
            );
        }
        Ok(())
    }

    /// Load a bundle from a JSON file and validate it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read sentiment from {}", path.display()))?;
        let bundle: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse sentiment from {}", path.display()))?;
        bundle
            .validate()
            .with_context(|| format!("invalid sentiment in {}", path.display()))?;

        info!(
            path = %path.display(),
            sentiment = %bundle.sentiment,
            confidence = bundle.confidence_score,
            "sentiment loaded"
        );
        Ok(bundle)
    }
}
