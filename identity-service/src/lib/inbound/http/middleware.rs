use axum::extract::Request;
use axum::extract::State;
use axum::http::{self};
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;

use crate::identity::errors::IdentityError;
use crate::identity::models::User;
use crate::identity::ports::IdentityServicePort;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::router::AppState;

/// Extension type carrying the user resolved from the access token
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

/// Middleware that validates the bearer access token and adds the user to
/// request extensions
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    // Request is not Sync; no borrow of it may live across the await.
    let token = extract_token_from_header(&req)?.to_string();

    let user = state
        .identity_service
        .authenticate(&token)
        .await
        .map_err(|e| {
            tracing::warn!("Access token rejected: {}", e);
            match e {
                IdentityError::TokenExpired => unauthorized("Token is expired"),
                IdentityError::InvalidToken(_) | IdentityError::UserNotFound(_) => {
                    unauthorized("Invalid token")
                }
                _ => ApiError::from(e).into_response(),
            }
        })?;

    req.extensions_mut().insert(AuthenticatedUser(user));

    Ok(next.run(req).await)
}

fn unauthorized(message: &str) -> Response {
    ApiError::Unauthorized(message.to_string()).into_response()
}

fn extract_token_from_header(req: &Request) -> Result<&str, Response> {
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .ok_or_else(|| unauthorized("Missing Authorization header"))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| unauthorized("Invalid Authorization header"))?;

    auth_str.strip_prefix("Bearer ").ok_or_else(|| {
        unauthorized("Invalid Authorization header format. Expected: Bearer <token>")
    })
}
