use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::MessageData;
use crate::identity::errors::IdentityError;
use crate::identity::models::CodeType;
use crate::identity::models::EmailAddress;
use crate::identity::ports::IdentityServicePort;
use crate::inbound::http::router::AppState;

pub async fn resend_code(
    State(state): State<AppState>,
    Json(body): Json<ResendCodeRequest>,
) -> Result<ApiSuccess<MessageData>, ApiError> {
    let email = EmailAddress::new(body.email).map_err(IdentityError::from)?;
    let code_type: CodeType = body.code_type.parse().map_err(IdentityError::from)?;

    state
        .identity_service
        .resend_code(&email, code_type)
        .await
        .map_err(ApiError::from)
        .map(|_| ApiSuccess::new(StatusCode::OK, MessageData::new("Code sent")))
}

/// `code_type` is `EmailConfirmation` or `PasswordReset`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResendCodeRequest {
    email: String,
    code_type: String,
}
