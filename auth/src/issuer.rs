use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use crate::jwt::AccessClaims;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::random::SecureRandom;

/// Number of random bytes behind every refresh token.
pub const REFRESH_TOKEN_BYTES: usize = 64;

/// A freshly signed access token and the instant it stops being accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues and verifies session credentials.
///
/// Access tokens are stateless HS256 JWTs bound to a subject and a short
/// lifetime. Refresh tokens are opaque random strings with no embedded
/// claims; they only mean something to whoever stores them.
pub struct TokenIssuer {
    jwt_handler: JwtHandler,
    random: Arc<dyn SecureRandom>,
    access_token_ttl: Duration,
}

impl TokenIssuer {
    /// Create a token issuer.
    ///
    /// # Arguments
    /// * `secret` - HMAC signing secret for access tokens
    /// * `access_token_ttl` - Lifetime of issued access tokens
    /// * `random` - Entropy source for refresh tokens
    ///
    /// # Errors
    /// * `MissingSecret` - The secret is empty
    pub fn new(
        secret: &[u8],
        access_token_ttl: Duration,
        random: Arc<dyn SecureRandom>,
    ) -> Result<Self, JwtError> {
        Ok(Self {
            jwt_handler: JwtHandler::new(secret)?,
            random,
            access_token_ttl,
        })
    }

    /// Sign an access token for `subject`, valid from now.
    ///
    /// # Errors
    /// * `EncodingFailed` - Signing failed
    pub fn issue_access(&self, subject: impl ToString) -> Result<AccessToken, JwtError> {
        let claims = AccessClaims::for_subject(subject, Utc::now(), self.access_token_ttl);
        let token = self.jwt_handler.encode(&claims)?;

        Ok(AccessToken {
            token,
            expires_at: claims.expires_at(),
        })
    }

    /// Verify an access token and return its subject.
    ///
    /// # Errors
    /// * `InvalidToken` - Bad signature, malformed token or missing subject
    /// * `TokenExpired` - Token is past its expiry
    pub fn verify_access(&self, token: &str) -> Result<String, JwtError> {
        let claims: AccessClaims = self.jwt_handler.decode(token)?;

        if claims.sub.is_empty() {
            return Err(JwtError::InvalidToken("empty subject".to_string()));
        }

        Ok(claims.sub)
    }

    /// Generate an opaque refresh token: 64 random bytes, URL-safe base64.
    pub fn issue_refresh(&self) -> String {
        let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
        self.random.fill_bytes(&mut bytes);
        URL_SAFE.encode(bytes)
    }
}
