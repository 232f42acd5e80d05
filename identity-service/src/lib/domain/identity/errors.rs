use thiserror::Error;

use crate::domain::identity::models::CodeType;

/// Error for UserId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserIdError {
    #[error("Invalid user id: {0}")]
    InvalidFormat(String),
}

/// Error for Username validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UsernameError {
    #[error("Username too short: minimum {min} characters, got {actual}")]
    TooShort { min: usize, actual: usize },

    #[error("Username too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },

    #[error(
        "Username contains invalid characters (only alphanumeric, underscore, and hyphen allowed)"
    )]
    InvalidCharacters,
}

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Invalid email format: {0}")]
    InvalidFormat(String),
}

/// Error for passwords that do not meet the policy for new passwords
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordPolicyError {
    #[error("Password too short: minimum {min} characters, got {actual}")]
    TooShort { min: usize, actual: usize },
}

/// Error for unrecognised one-time code purposes
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodeTypeError {
    #[error("Unknown code type '{0}' (expected EmailConfirmation or PasswordReset)")]
    Unknown(String),
}

/// Error for notification gateway failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NotificationError {
    #[error("Invalid recipient address: {0}")]
    InvalidRecipient(String),

    #[error("Failed to build message: {0}")]
    BuildFailed(String),

    #[error("Failed to deliver message: {0}")]
    DeliveryFailed(String),
}

/// Caller-facing classification of every identity failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input rejected before any state was consulted
    Validation,
    /// Uniqueness violation
    Conflict,
    /// User, code or token absent
    NotFound,
    /// Supplied code differs from the live code
    CodeMismatch,
    /// Password mismatch
    InvalidCredential,
    /// Token malformed, forged or unknown
    Invalid,
    /// Token past its expiry
    Expired,
    /// Collaborator failure not attributable to caller input
    Internal,
}

/// Top-level error for all identity operations
#[derive(Debug, Clone, Error)]
pub enum IdentityError {
    // Value object validation errors (automatically converted via #[from])
    #[error("Invalid username: {0}")]
    InvalidUsername(#[from] UsernameError),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Invalid password: {0}")]
    InvalidPassword(#[from] PasswordPolicyError),

    #[error("Invalid code type: {0}")]
    InvalidCodeType(#[from] CodeTypeError),

    // Domain-level errors
    #[error("Email already exists: {0}")]
    EmailAlreadyExists(String),

    #[error("Username already exists: {0}")]
    UsernameAlreadyExists(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("No live {0} code")]
    CodeNotFound(CodeType),

    #[error("Code does not match")]
    CodeMismatch,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token is expired")]
    TokenExpired,

    // Infrastructure errors
    #[error("Password hashing failed: {0}")]
    PasswordHashing(String),

    #[error("Token issuance failed: {0}")]
    TokenIssuance(String),

    #[error("Notification error: {0}")]
    Notification(#[from] NotificationError),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl IdentityError {
    /// Project the error onto the caller-facing taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            IdentityError::InvalidUsername(_)
            | IdentityError::InvalidEmail(_)
            | IdentityError::InvalidPassword(_)
            | IdentityError::InvalidCodeType(_) => ErrorKind::Validation,
            IdentityError::EmailAlreadyExists(_) | IdentityError::UsernameAlreadyExists(_) => {
                ErrorKind::Conflict
            }
            IdentityError::UserNotFound(_) | IdentityError::CodeNotFound(_) => ErrorKind::NotFound,
            IdentityError::CodeMismatch => ErrorKind::CodeMismatch,
            IdentityError::InvalidCredentials => ErrorKind::InvalidCredential,
            IdentityError::InvalidToken(_) => ErrorKind::Invalid,
            IdentityError::TokenExpired => ErrorKind::Expired,
            IdentityError::PasswordHashing(_)
            | IdentityError::TokenIssuance(_)
            | IdentityError::Notification(_)
            | IdentityError::DatabaseError(_) => ErrorKind::Internal,
        }
    }
}

impl From<auth::PasswordError> for IdentityError {
    fn from(err: auth::PasswordError) -> Self {
        IdentityError::PasswordHashing(err.to_string())
    }
}

impl From<auth::JwtError> for IdentityError {
    fn from(err: auth::JwtError) -> Self {
        match &err {
            auth::JwtError::TokenExpired => IdentityError::TokenExpired,
            auth::JwtError::InvalidToken(msg) => IdentityError::InvalidToken(msg.clone()),
            auth::JwtError::MissingSecret | auth::JwtError::EncodingFailed(_) => {
                IdentityError::TokenIssuance(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_taxonomy() {
        assert_eq!(
            IdentityError::EmailAlreadyExists("a@x.com".into()).kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            IdentityError::CodeNotFound(CodeType::PasswordReset).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(IdentityError::CodeMismatch.kind(), ErrorKind::CodeMismatch);
        assert_eq!(
            IdentityError::InvalidCredentials.kind(),
            ErrorKind::InvalidCredential
        );
        assert_eq!(IdentityError::TokenExpired.kind(), ErrorKind::Expired);
        assert_eq!(
            IdentityError::from(NotificationError::DeliveryFailed("smtp down".into())).kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn test_jwt_errors_are_wrapped() {
        assert!(matches!(
            IdentityError::from(auth::JwtError::TokenExpired),
            IdentityError::TokenExpired
        ));
        assert!(matches!(
            IdentityError::from(auth::JwtError::InvalidToken("bad".into())),
            IdentityError::InvalidToken(_)
        ));
        assert_eq!(
            IdentityError::from(auth::JwtError::EncodingFailed("boom".into())).kind(),
            ErrorKind::Internal
        );
    }
}
