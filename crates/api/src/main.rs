use axum::{
    extract::{Path, Query, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stocklens_core::chart::{self, ChartView};
use stocklens_core::domain::insights::StockInsights;
use stocklens_core::domain::price::{PricePoint, TimeRange};
use stocklens_core::domain::ticker::normalize_ticker;
use stocklens_core::ingest::fmp::FmpClient;
use stocklens_core::ingest::provider::{DataFetchError, PriceHistoryProvider};
use stocklens_core::llm::error::InsightError;
use stocklens_core::llm::gemini::GeminiClient;
use stocklens_core::llm::InsightClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = stocklens_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    // Both upstream keys are startup preconditions.
    let insights = GeminiClient::from_settings(&settings).inspect_err(|e| {
        sentry_anyhow::capture_anyhow(e);
        tracing::error!(error = %e, "Gemini client unavailable; refusing to start");
    })?;
    let prices = FmpClient::from_settings(&settings).inspect_err(|e| {
        sentry_anyhow::capture_anyhow(e);
        tracing::error!(error = %e, "FMP client unavailable; refusing to start");
    })?;
    tracing::info!(model = %insights.model(), "upstream clients ready");

    let state = AppState {
        insights: Arc::new(insights),
        prices: Arc::new(prices),
    };

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET]);

    Router::new()
        .route("/healthz", get(healthz))
        .route("/insights/:ticker", get(get_insights))
        .route("/prices/:ticker", get(get_prices))
        .route("/chart/:ticker", get(get_chart))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Clone)]
struct AppState {
    insights: Arc<dyn InsightClient>,
    prices: Arc<dyn PriceHistoryProvider>,
}

#[derive(Debug, Deserialize)]
struct RangeQuery {
    range: Option<String>,
}

impl RangeQuery {
    fn time_range(&self) -> Result<TimeRange, ApiError> {
        match self.range.as_deref() {
            None => Ok(TimeRange::default()),
            Some(raw) => raw
                .parse::<TimeRange>()
                .map_err(|e| ApiError::bad_request(e.to_string())),
        }
    }
}

#[derive(Debug, Serialize)]
struct ApiPriceHistory {
    ticker: String,
    range: TimeRange,
    fetched_at: DateTime<Utc>,
    no_data: bool,
    points: Vec<PricePoint>,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    kind: &'static str,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            kind: "bad_request",
            message: message.into(),
        }
    }
}

impl From<InsightError> for ApiError {
    fn from(err: InsightError) -> Self {
        sentry::capture_error(&err);
        Self {
            status: StatusCode::BAD_GATEWAY,
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl From<DataFetchError> for ApiError {
    fn from(err: DataFetchError) -> Self {
        sentry::capture_error(&err);
        Self {
            status: StatusCode::BAD_GATEWAY,
            kind: err.kind(),
            message: chart::display_error(&err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.message, "kind": self.kind });
        (self.status, Json(body)).into_response()
    }
}

async fn get_insights(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> Result<Json<StockInsights>, ApiError> {
    let ticker = normalize_ticker(&ticker).map_err(|e| ApiError::bad_request(e.to_string()))?;
    let insights = state.insights.fetch_insights(&ticker).await.inspect_err(|e| {
        tracing::warn!(%ticker, kind = e.kind(), error = %e, "insight request failed");
    })?;
    Ok(Json(insights))
}

async fn get_prices(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<ApiPriceHistory>, ApiError> {
    let ticker = normalize_ticker(&ticker).map_err(|e| ApiError::bad_request(e.to_string()))?;
    let range = query.time_range()?;
    let points = fetch_points(&state, &ticker, range).await?;

    Ok(Json(ApiPriceHistory {
        no_data: points.is_empty(),
        ticker,
        range,
        fetched_at: Utc::now(),
        points,
    }))
}

async fn get_chart(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<ChartView>, ApiError> {
    let ticker = normalize_ticker(&ticker).map_err(|e| ApiError::bad_request(e.to_string()))?;
    let range = query.time_range()?;
    let points = fetch_points(&state, &ticker, range).await?;
    Ok(Json(ChartView::from_points(&ticker, range, points)))
}

async fn fetch_points(
    state: &AppState,
    ticker: &str,
    range: TimeRange,
) -> Result<Vec<PricePoint>, ApiError> {
    let points = state
        .prices
        .fetch_price_history(ticker, range)
        .await
        .inspect_err(|e| {
            tracing::warn!(%ticker, %range, kind = e.kind(), error = %e, "price request failed");
        })?;
    if points.is_empty() {
        tracing::info!(%ticker, %range, "no price data for ticker/range");
    }
    Ok(points)
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &stocklens_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
