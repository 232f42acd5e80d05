use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::MessageData;
use crate::identity::errors::IdentityError;
use crate::identity::models::EmailAddress;
use crate::identity::ports::IdentityServicePort;
use crate::inbound::http::router::AppState;

/// Send a password reset code. The caller proves ownership with the
/// current password first.
pub async fn request_password_reset(
    State(state): State<AppState>,
    Json(body): Json<PasswordResetRequest>,
) -> Result<ApiSuccess<MessageData>, ApiError> {
    let email = EmailAddress::new(body.email).map_err(IdentityError::from)?;

    state
        .identity_service
        .request_password_reset(&email, &body.current_password)
        .await
        .map_err(ApiError::from)
        .map(|_| ApiSuccess::new(StatusCode::OK, MessageData::new("Reset code sent")))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PasswordResetRequest {
    email: String,
    current_password: String,
}
