use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::identity::errors::IdentityError;
use crate::identity::models::TokenPair;
use crate::identity::ports::IdentityServicePort;
use crate::inbound::http::router::AppState;

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequestBody>,
) -> Result<ApiSuccess<LoginResponseData>, ApiError> {
    let tokens = state
        .identity_service
        .login(&body.email_or_username, &body.password)
        .await
        .map_err(|e| match e {
            // Unknown account and wrong password look the same from outside.
            IdentityError::UserNotFound(_) | IdentityError::InvalidCredentials => {
                ApiError::Unauthorized("Invalid credentials".to_string())
            }
            _ => ApiError::from(e),
        })?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        LoginResponseData::new(&tokens, Utc::now()),
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequestBody {
    email_or_username: String,
    password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginResponseData {
    pub user_id: String,
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Seconds until the access token expires
    pub expires_in: i64,
    /// Seconds until the refresh token expires
    pub refresh_expires_in: i64,
}

impl LoginResponseData {
    fn new(tokens: &TokenPair, now: DateTime<Utc>) -> Self {
        Self {
            user_id: tokens.user_id.to_string(),
            access_token: tokens.access.access_token.clone(),
            refresh_token: tokens.refresh_token.clone(),
            token_type: "Bearer".to_string(),
            expires_in: seconds_until(tokens.access.expires_at, now),
            refresh_expires_in: seconds_until(tokens.refresh_expires_at, now),
        }
    }
}

pub(super) fn seconds_until(instant: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (instant - now).num_seconds().max(0)
}
