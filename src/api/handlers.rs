//! HTTP request handlers
//!
//! The webhook endpoint answers 200 once a transition committed (or was
//! deliberately ignored) and 500 when it was abandoned, so the platform
//! redelivers the event; redelivery is safe because abandoned transitions
//! mutate nothing.

use super::types::{ErrorResponse, Update, WebhookAck};
use super::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/webhook", post(receive_update))
        .route("/healthz", get(healthz))
        .with_state(state)
}

async fn healthz() -> impl IntoResponse {
    Json(WebhookAck { ok: true })
}

async fn receive_update(
    State(state): State<AppState>,
    Json(update): Json<Update>,
) -> Result<Json<WebhookAck>, AppError> {
    let update_id = update.update_id;
    let incoming = update.into_incoming().map_err(|error| {
        tracing::warn!(update_id, %error, "Dropping unusable update");
        AppError::BadRequest(error.to_string())
    })?;

    match state.driver.advance(&incoming).await {
        Ok(outcome) => {
            tracing::debug!(update_id, chat_id = %incoming.chat_id, ?outcome, "Update handled");
            Ok(Json(WebhookAck { ok: true }))
        }
        Err(error) => {
            tracing::error!(update_id, chat_id = %incoming.chat_id, %error, "Update failed");
            Err(AppError::Internal(error.to_string()))
        }
    }
}

// ============================================================
// Error Handling
// ============================================================

enum AppError {
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
