use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::MessageData;
use crate::identity::errors::IdentityError;
use crate::identity::models::EmailAddress;
use crate::identity::models::Password;
use crate::identity::ports::IdentityServicePort;
use crate::inbound::http::router::AppState;

pub async fn confirm_password_reset(
    State(state): State<AppState>,
    Json(body): Json<ConfirmPasswordResetRequest>,
) -> Result<ApiSuccess<MessageData>, ApiError> {
    let email = EmailAddress::new(body.email).map_err(IdentityError::from)?;
    let new_password = Password::new(body.new_password).map_err(IdentityError::from)?;

    state
        .identity_service
        .confirm_password_reset(&email, &new_password, &body.code)
        .await
        .map_err(ApiError::from)
        .map(|_| ApiSuccess::new(StatusCode::OK, MessageData::new("Password updated")))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConfirmPasswordResetRequest {
    email: String,
    new_password: String,
    code: String,
}
