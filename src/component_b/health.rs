//! Liveness probe. Answers without touching pipeline state.

use axum::Json;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Liveness {
    pub status: &'static str,
}

/// `GET /health`
pub async fn liveness() -> Json<Liveness> {
    Json(Liveness { status: "healthy" })
}
