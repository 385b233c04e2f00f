//! Dashboard API route handlers.
//!
//! All endpoints return JSON. State is shared via `Arc<ServerState>`.
//! Invalid input surfaces as 400, upstream provider failures as 502.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

use crate::chatbot::ChatBot;
use crate::snapshot::SnapshotBuilder;
use crate::types::{CityPulseError, CitySnapshot};

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Shared state accessible by all route handlers.
pub struct ServerState {
    pub snapshots: SnapshotBuilder,
    pub chatbot: ChatBot,
}

pub type AppState = Arc<ServerState>;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotParams {
    pub city: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub query: String,
    pub city: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub answer: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Wrapper that maps domain errors onto HTTP status codes.
pub struct ApiError(CityPulseError);

impl From<CityPulseError> for ApiError {
    fn from(err: CityPulseError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            CityPulseError::InputInvalid(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::BAD_GATEWAY,
        };
        let body = ErrorBody {
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// GET /api/snapshot?city=Pune
pub async fn get_snapshot(
    State(state): State<AppState>,
    Query(params): Query<SnapshotParams>,
) -> Result<Json<CitySnapshot>, ApiError> {
    let city = params
        .city
        .ok_or_else(|| CityPulseError::InputInvalid("city query parameter is required".into()))?;

    let snapshot = state.snapshots.build(&city).await?;
    Ok(Json(snapshot))
}

/// POST /api/chat
pub async fn post_chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let answer = state
        .chatbot
        .answer(&req.query, req.city.as_deref())
        .await
        .map_err(|err| {
            if !matches!(err, CityPulseError::InputInvalid(_)) {
                warn!(error = %err, "Chat request failed upstream");
            }
            err
        })?;

    Ok(Json(ChatResponse { answer }))
}

/// GET /health
pub async fn health() -> StatusCode {
    StatusCode::OK
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
