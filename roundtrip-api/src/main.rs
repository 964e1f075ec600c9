use anyhow::Result;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use roundtrip_core::{
    analysis::{analyze, AnalysisOutcome},
    config::AnalyzerConfig,
    error::AnalysisError,
    explorer::ExplorerClient,
    models::AnalysisParams,
    request::{AnalysisRequest, RawQuery},
    source::TransferSource,
};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[derive(Clone)]
struct AppState {
    source: Arc<dyn TransferSource>,
    defaults: AnalysisParams,
}

struct ApiError(AnalysisError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            tracing::error!("analysis failed: {:?}", self.0);
            StatusCode::INTERNAL_SERVER_ERROR
        };

        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

impl From<AnalysisError> for ApiError {
    fn from(err: AnalysisError) -> Self {
        ApiError(err)
    }
}

async fn health() -> &'static str {
    "ok"
}

async fn analyze_handler(
    State(state): State<AppState>,
    Query(q): Query<RawQuery>,
) -> Result<Response, ApiError> {
    let request = AnalysisRequest::parse(q, &state.defaults)?;
    let outcome = analyze(state.source.as_ref(), &request).await?;

    let response = match outcome {
        AnalysisOutcome::Report(report) => Json(report).into_response(),
        empty => Json(json!({ "message": empty.message() })).into_response(),
    };
    Ok(response)
}

fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/analyze_usdt_transactions", get(analyze_handler))
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = AnalyzerConfig::from_env()?;
    tracing::info!("Starting analyzer with config: {:?}", config.runtime);

    let explorer = ExplorerClient::new(config.explorer.clone())?;
    let state = AppState {
        source: Arc::new(explorer),
        defaults: config.analysis_params(),
    };

    let addr: SocketAddr = config.api.bind_addr.parse()?;
    tracing::info!("Starting API server on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}
