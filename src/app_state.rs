// =============================================================================
// Central Application State — Equity Analyst API
// =============================================================================
//
// Shared by every HTTP handler via `Arc<AppState>`.  The provider handle is
// fixed for the life of the process; indicator settings are read from the
// live config on every request so a config update applies to the next run.
//
// Thread safety:
//   - Atomic counters for lock-free version tracking.
//   - parking_lot::RwLock around the mutable config.
// =============================================================================

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use parking_lot::RwLock;
use tracing::info;

use crate::analysis::{AnalysisSettings, Analyst};
use crate::market_data::PriceHistoryProvider;
use crate::runtime_config::AnalystConfig;

pub struct AppState {
    // ── Version tracking ────────────────────────────────────────────────
    /// Incremented on every accepted config change.
    pub config_version: AtomicU64,

    /// Number of analysis requests served (successful or not).
    pub analyses_served: AtomicU64,

    // ── Configuration ───────────────────────────────────────────────────
    pub runtime_config: Arc<RwLock<AnalystConfig>>,

    /// Where accepted config changes are persisted. `None` keeps them in
    /// memory only.
    pub config_path: Option<PathBuf>,

    // ── Data source ─────────────────────────────────────────────────────
    provider: Arc<dyn PriceHistoryProvider>,

    // ── Timing ──────────────────────────────────────────────────────────
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        config: AnalystConfig,
        config_path: Option<PathBuf>,
        provider: Arc<dyn PriceHistoryProvider>,
    ) -> Self {
        Self {
            config_version: AtomicU64::new(1),
            analyses_served: AtomicU64::new(0),
            runtime_config: Arc::new(RwLock::new(config)),
            config_path,
            provider,
            start_time: Instant::now(),
        }
    }

    /// Analyst bound to the current indicator settings.
    pub fn analyst(&self) -> Analyst {
        let settings = AnalysisSettings::from(&*self.runtime_config.read());
        Analyst::new(Arc::clone(&self.provider), settings)
    }

    pub fn config_snapshot(&self) -> AnalystConfig {
        self.runtime_config.read().clone()
    }

    /// Validate, persist and then install `next`.
    ///
    /// When validation or the save fails the live config and version are
    /// left untouched.
    pub fn replace_config(&self, next: AnalystConfig) -> Result<()> {
        next.validate()?;
        if let Some(path) = &self.config_path {
            next.save(path)?;
        }

        let mut config = self.runtime_config.write();
        *config = next;
        let version = self.config_version.fetch_add(1, Ordering::SeqCst) + 1;
        info!(
            version,
            rsi_period = config.rsi_period,
            ma_windows = ?config.ma_windows,
            rsi_fallback = config.rsi_fallback,
            "analyst config updated"
        );
        Ok(())
    }

    pub fn current_config_version(&self) -> u64 {
        self.config_version.load(Ordering::SeqCst)
    }

    pub fn record_analysis(&self) -> u64 {
        self.analyses_served.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn analyses_served(&self) -> u64 {
        self.analyses_served.load(Ordering::Relaxed)
    }

    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
