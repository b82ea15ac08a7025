// SPDX-FileCopyrightText: 2026 Hintly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the API endpoints.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use hintly_core::HintlyError;
use hintly_core::types::{AuthIdentity, SessionSummary};
use hintly_tutor::{SessionHistory, TurnReply, TurnRequest};
use serde::{Deserialize, Serialize};

use crate::server::GatewayState;

/// Error body returned by every failing endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// An error on its way to becoming an HTTP response.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<HintlyError> for ApiError {
    fn from(err: HintlyError) -> Self {
        let status = match &err {
            HintlyError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            HintlyError::Forbidden { .. } => StatusCode::FORBIDDEN,
            HintlyError::NotFound(_) => StatusCode::NOT_FOUND,
            HintlyError::Conflict(_) => StatusCode::CONFLICT,
            HintlyError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, error = %self.message, "request failed");
        } else {
            tracing::debug!(status = %self.status, error = %self.message, "request rejected");
        }
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionListResponse {
    pub sessions: Vec<SessionSummary>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MeResponse {
    pub user_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// POST /query
///
/// Runs one tutoring turn for the authenticated user.
pub async fn post_query(
    State(state): State<GatewayState>,
    Extension(identity): Extension<AuthIdentity>,
    Json(request): Json<TurnRequest>,
) -> Result<Json<TurnReply>, ApiError> {
    if request.problem.trim().is_empty() {
        return Err(ApiError::bad_request("problem must not be empty"));
    }
    let reply = state
        .orchestrator
        .submit_turn(&identity.user_id, request)
        .await?;
    Ok(Json(reply))
}

/// GET /sessions
pub async fn get_sessions(
    State(state): State<GatewayState>,
    Extension(identity): Extension<AuthIdentity>,
) -> Result<Json<SessionListResponse>, ApiError> {
    let sessions = state.orchestrator.list_sessions(&identity.user_id).await?;
    Ok(Json(SessionListResponse { sessions }))
}

/// GET /sessions/{session_id}
pub async fn get_session_history(
    State(state): State<GatewayState>,
    Extension(identity): Extension<AuthIdentity>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionHistory>, ApiError> {
    let history = state
        .orchestrator
        .session_history(&identity.user_id, &session_id)
        .await?;
    Ok(Json(history))
}

/// GET /me
pub async fn get_me(Extension(identity): Extension<AuthIdentity>) -> Json<MeResponse> {
    Json(MeResponse {
        user_id: identity.user_id,
    })
}

/// GET /health (unauthenticated)
pub async fn get_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
