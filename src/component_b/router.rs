//! HTTP routes and middleware.
//!
//! - `GET /health` — liveness probe
//! - `GET /metrics.json` — pipeline counters
//! - `GET /api/v1/ws` — labeled event stream (single consumer)
//!
//! Every response passes through the request logger and gets a permissive
//! CORS header for the browser dashboard.

use axum::{
    Json, Router,
    extract::{Request, State},
    http::{HeaderValue, StatusCode, header},
    middleware::{self, Next},
    response::Response,
    routing::get,
};
use log::info;
use tokio::time::Instant;

use crate::component_b::{health, sink::{self, SinkHandle}};
use crate::utils::metrics::{SharedStats, StatsSnapshot};

#[derive(Clone)]
pub struct AppState {
    pub sink: SinkHandle,
    pub stats: SharedStats,
}

pub fn build_router(state: AppState) -> Router {
    let api = Router::new().route("/ws", get(sink::ws_handler));

    Router::new()
        .route("/health", get(health::liveness))
        .route("/metrics.json", get(metrics_json))
        .nest("/api/v1", api)
        .fallback(|| async { StatusCode::NOT_FOUND })
        .layer(middleware::from_fn(log_requests))
        .with_state(state)
}

async fn metrics_json(State(state): State<AppState>) -> Json<StatsSnapshot> {
    Json(state.stats.snapshot())
}

/// Logs `[METHOD] path status latency` and stamps the CORS header.
async fn log_requests(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_owned();

    let mut response = next.run(req).await;
    response
        .headers_mut()
        .insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));

    info!(
        "[{}] {} {} {:?}",
        method,
        path,
        response.status().as_u16(),
        start.elapsed()
    );
    response
}
