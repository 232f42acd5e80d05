use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use super::login::seconds_until;
use super::logout::RefreshTokenBody;
use super::ApiError;
use super::ApiSuccess;
use crate::identity::ports::IdentityServicePort;
use crate::inbound::http::router::AppState;

pub async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshTokenBody>,
) -> Result<ApiSuccess<RefreshResponseData>, ApiError> {
    let grant = state
        .identity_service
        .refresh(&body.refresh_token)
        .await
        .map_err(ApiError::from)?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        RefreshResponseData {
            expires_in: seconds_until(grant.expires_at, Utc::now()),
            access_token: grant.access_token,
            token_type: "Bearer".to_string(),
        },
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshResponseData {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}
