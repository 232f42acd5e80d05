use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::MessageData;
use crate::identity::ports::IdentityServicePort;
use crate::inbound::http::router::AppState;

/// Revoke a refresh token. Unknown tokens are accepted so retries are safe.
pub async fn logout(
    State(state): State<AppState>,
    Json(body): Json<RefreshTokenBody>,
) -> Result<ApiSuccess<MessageData>, ApiError> {
    state
        .identity_service
        .logout(&body.refresh_token)
        .await
        .map_err(ApiError::from)
        .map(|_| ApiSuccess::new(StatusCode::OK, MessageData::new("Logged out")))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RefreshTokenBody {
    pub refresh_token: String,
}
