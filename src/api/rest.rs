// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
// All endpoints live under `/api/v1/`.  Analysis failures are returned as a
// JSON body `{ "error": ..., "symbol": ... }` with a status that names the
// failure class:
//
//   400  malformed request (ticker, dates, missing query parameters)
//   404  the provider has no bars for the symbol in the window
//   422  bars were found but do not form a valid series
//   502  the upstream price source failed
//
// CORS is configured permissively; the API is read-mostly and unauthenticated.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::app_state::AppState;
use crate::error::{AnalysisError, ProviderError};
use crate::runtime_config::AnalystConfig;

// =============================================================================
// Router construction
// =============================================================================

/// Build the full REST API router with CORS middleware and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/analysis/:ticker", get(analysis))
        .route("/api/v1/config", get(get_config).post(update_config))
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    symbol: Option<String>,
}

fn error_response(status: StatusCode, error: String, symbol: Option<String>) -> Response {
    (status, Json(ErrorBody { error, symbol })).into_response()
}

fn status_for(err: &AnalysisError) -> StatusCode {
    match err {
        AnalysisError::Provider(ProviderError::Validation(_)) => StatusCode::BAD_REQUEST,
        AnalysisError::Provider(ProviderError::NoData { .. }) => StatusCode::NOT_FOUND,
        AnalysisError::Provider(ProviderError::Series(_)) | AnalysisError::Metrics(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        AnalysisError::Provider(
            ProviderError::Request(_)
            | ProviderError::Api { .. }
            | ProviderError::Io { .. }
            | ProviderError::Parse { .. },
        ) => StatusCode::BAD_GATEWAY,
    }
}

// =============================================================================
// Health
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
    analyses_served: u64,
    config_version: u64,
    server_time: i64,
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: state.uptime_secs(),
        analyses_served: state.analyses_served(),
        config_version: state.current_config_version(),
        server_time: chrono::Utc::now().timestamp_millis(),
    })
}

// =============================================================================
// Analysis
// =============================================================================

#[derive(Debug, Deserialize)]
struct AnalysisQuery {
    start: Option<String>,
    end: Option<String>,
}

async fn analysis(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
    Query(query): Query<AnalysisQuery>,
) -> Response {
    let served = state.record_analysis();

    let (Some(start), Some(end)) = (query.start, query.end) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "query parameters 'start' and 'end' are required (YYYY-MM-DD)".to_string(),
            Some(ticker.trim().to_uppercase()),
        );
    };

    match state.analyst().run(&ticker, &start, &end).await {
        Ok(outcome) => {
            info!(served, ticker = %outcome.request.symbol, "analysis served");
            Json(outcome).into_response()
        }
        Err(e) => {
            let status = status_for(&e);
            warn!(served, ticker = %ticker, status = status.as_u16(), error = %e, "analysis failed");
            let symbol = e
                .symbol()
                .map(str::to_string)
                .or_else(|| Some(ticker.trim().to_uppercase()));
            error_response(status, e.to_string(), symbol)
        }
    }
}

// =============================================================================
// Config
// =============================================================================

#[derive(Serialize)]
struct ConfigResponse {
    version: u64,
    config: AnalystConfig,
    changes: Vec<String>,
}

async fn get_config(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ConfigResponse {
        version: state.current_config_version(),
        config: state.config_snapshot(),
        changes: Vec::new(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigUpdate {
    #[serde(default)]
    rsi_period: Option<usize>,
    #[serde(default)]
    ma_windows: Option<Vec<usize>>,
    #[serde(default)]
    rsi_fallback: Option<f64>,
}

impl ConfigUpdate {
    /// Apply the present fields to `config`, returning a description of each
    /// real change.
    fn apply(self, config: &mut AnalystConfig) -> Vec<String> {
        let mut changes = Vec::new();
        if let Some(period) = self.rsi_period {
            if config.rsi_period != period {
                changes.push(format!("rsi_period: {} -> {}", config.rsi_period, period));
                config.rsi_period = period;
            }
        }
        if let Some(windows) = self.ma_windows {
            if config.ma_windows != windows {
                changes.push(format!("ma_windows: {:?} -> {:?}", config.ma_windows, windows));
                config.ma_windows = windows;
            }
        }
        if let Some(fallback) = self.rsi_fallback {
            if config.rsi_fallback != fallback {
                changes.push(format!("rsi_fallback: {} -> {}", config.rsi_fallback, fallback));
                config.rsi_fallback = fallback;
            }
        }
        changes
    }
}

async fn update_config(
    State(state): State<Arc<AppState>>,
    Json(update): Json<ConfigUpdate>,
) -> Response {
    let mut next = state.config_snapshot();
    let changes = update.apply(&mut next);

    if let Err(e) = next.validate() {
        return error_response(StatusCode::BAD_REQUEST, format!("{e:#}"), None);
    }

    if !changes.is_empty() {
        if let Err(e) = state.replace_config(next) {
            warn!(error = %format!("{e:#}"), "failed to persist analyst config");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, format!("{e:#}"), None);
        }
        info!(changes = ?changes, "config updated via API");
    }

    Json(ConfigResponse {
        version: state.current_config_version(),
        config: state.config_snapshot(),
        changes,
    })
    .into_response()
}
