// =============================================================================
// Runtime Configuration — analyst settings with atomic save
// =============================================================================
//
// Every tunable of the pipeline lives here: which price provider to use,
// where charts and reports go, the indicator lookbacks, the display fallback
// for an undefined RSI, and the HTTP bind address.
//
// Persistence uses an atomic tmp + rename pattern to prevent corruption on
// crash.  All fields carry `#[serde(default)]` so that adding new fields
// never breaks loading an older config file.
//
// =============================================================================

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::charts::ChartParams;
use crate::indicators::{moving_average, rsi};
use crate::metrics::MetricsParams;
use crate::report::DEFAULT_RSI_FALLBACK;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_chart_dir() -> PathBuf {
    PathBuf::from("outputs")
}

fn default_report_dir() -> PathBuf {
    PathBuf::from("reports")
}

fn default_rsi_period() -> usize {
    rsi::DEFAULT_RSI_PERIOD
}

fn default_ma_windows() -> Vec<usize> {
    moving_average::DEFAULT_MA_WINDOWS.to_vec()
}

fn default_rsi_fallback() -> f64 {
    DEFAULT_RSI_FALLBACK
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_bind_addr() -> String {
    "0.0.0.0:3001".to_string()
}

// =============================================================================
// ProviderKind
// =============================================================================

/// Which price-history source to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    #[default]
    Yahoo,
    JsonFile,
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Yahoo => write!(f, "yahoo"),
            Self::JsonFile => write!(f, "json_file"),
        }
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "yahoo" => Ok(Self::Yahoo),
            "json_file" | "json" | "file" => Ok(Self::JsonFile),
            other => bail!("unknown provider '{other}' (expected yahoo or json_file)"),
        }
    }
}

// =============================================================================
// AnalystConfig
// =============================================================================

/// Top-level configuration for the analysis pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalystConfig {
    // --- Data source ---------------------------------------------------------

    #[serde(default)]
    pub provider: ProviderKind,

    /// Directory of `{TICKER}.json` price files for the `json_file` provider.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// HTTP timeout for remote providers.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    // --- Output --------------------------------------------------------------

    #[serde(default = "default_chart_dir")]
    pub chart_dir: PathBuf,

    #[serde(default = "default_report_dir")]
    pub report_dir: PathBuf,

    // --- Indicators ----------------------------------------------------------

    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,

    /// Moving-average windows drawn on the price chart.
    #[serde(default = "default_ma_windows")]
    pub ma_windows: Vec<usize>,

    /// RSI shown in reports when the history is too short for a reading.
    #[serde(default = "default_rsi_fallback")]
    pub rsi_fallback: f64,

    // --- HTTP API ------------------------------------------------------------

    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for AnalystConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            data_dir: default_data_dir(),
            request_timeout_secs: default_request_timeout_secs(),
            chart_dir: default_chart_dir(),
            report_dir: default_report_dir(),
            rsi_period: default_rsi_period(),
            ma_windows: default_ma_windows(),
            rsi_fallback: default_rsi_fallback(),
            bind_addr: default_bind_addr(),
        }
    }
}

impl AnalystConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read analyst config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse analyst config from {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("invalid analyst config in {}", path.display()))?;

        info!(
            path = %path.display(),
            provider = %config.provider,
            rsi_period = config.rsi_period,
            ma_windows = ?config.ma_windows,
            "analyst config loaded"
        );

        Ok(config)
    }

    /// Load from `path`, falling back to defaults (with a warning) on any
    /// failure.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            warn!(error = %format!("{e:#}"), "Failed to load config, using defaults");
            Self::default()
        })
    }

    /// Persist the current configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise analyst config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "analyst config saved (atomic)");
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.rsi_period == 0 {
            bail!("rsi_period must be positive");
        }
        if self.ma_windows.is_empty() {
            bail!("ma_windows must not be empty");
        }
        if self.ma_windows.iter().any(|&w| w == 0) {
            bail!("ma_windows must all be positive, got {:?}", self.ma_windows);
        }
        if !(0.0..=100.0).contains(&self.rsi_fallback) {
            bail!("rsi_fallback must be within [0, 100], got {}", self.rsi_fallback);
        }
        if self.request_timeout_secs == 0 {
            bail!("request_timeout_secs must be positive");
        }
        if self.bind_addr.parse::<SocketAddr>().is_err() {
            bail!("bind_addr must be an ip:port address, got '{}'", self.bind_addr);
        }
        Ok(())
    }

    /// Apply `ANALYST_PROVIDER`, `ANALYST_DATA_DIR` and `ANALYST_BIND_ADDR`.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(raw) = std::env::var("ANALYST_PROVIDER") {
            match raw.parse() {
                Ok(kind) => self.provider = kind,
                Err(e) => warn!(error = %e, "ignoring ANALYST_PROVIDER"),
            }
        }
        if let Ok(dir) = std::env::var("ANALYST_DATA_DIR") {
            if !dir.trim().is_empty() {
                self.data_dir = PathBuf::from(dir.trim());
            }
        }
        if let Ok(addr) = std::env::var("ANALYST_BIND_ADDR") {
            if !addr.trim().is_empty() {
                self.bind_addr = addr.trim().to_string();
            }
        }
    }

    pub fn metrics_params(&self) -> MetricsParams {
        MetricsParams {
            rsi_period: self.rsi_period,
        }
    }

    pub fn chart_params(&self) -> ChartParams {
        ChartParams {
            ma_windows: self.ma_windows.clone(),
            rsi_period: self.rsi_period,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
