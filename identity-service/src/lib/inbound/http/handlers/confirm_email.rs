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

pub async fn confirm_email(
    State(state): State<AppState>,
    Json(body): Json<ConfirmEmailRequest>,
) -> Result<ApiSuccess<MessageData>, ApiError> {
    let email = EmailAddress::new(body.email).map_err(IdentityError::from)?;

    state
        .identity_service
        .confirm_email(&email, &body.code)
        .await
        .map_err(ApiError::from)
        .map(|_| ApiSuccess::new(StatusCode::OK, MessageData::new("Email confirmed")))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConfirmEmailRequest {
    email: String,
    code: String,
}
