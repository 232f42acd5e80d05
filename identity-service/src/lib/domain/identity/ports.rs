use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::identity::errors::IdentityError;
use crate::domain::identity::errors::NotificationError;
use crate::domain::identity::models::AccessGrant;
use crate::domain::identity::models::CodeType;
use crate::domain::identity::models::EmailAddress;
use crate::domain::identity::models::NewUser;
use crate::domain::identity::models::Notification;
use crate::domain::identity::models::OneTimeCode;
use crate::domain::identity::models::Password;
use crate::domain::identity::models::RefreshToken;
use crate::domain::identity::models::RegisterCommand;
use crate::domain::identity::models::Registration;
use crate::domain::identity::models::TokenPair;
use crate::domain::identity::models::User;
use crate::domain::identity::models::UserId;

/// Port for identity and credential lifecycle operations.
#[async_trait]
pub trait IdentityServicePort: Send + Sync + 'static {
    /// Create an unconfirmed account and send it an email confirmation code.
    ///
    /// # Arguments
    /// * `command` - Validated email, username and password
    ///
    /// # Returns
    /// Created user and whether the confirmation code was delivered
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `UsernameAlreadyExists` - Username is already taken
    /// * `PasswordHashing` - Hashing failed
    /// * `DatabaseError` - Database operation failed
    async fn register(&self, command: RegisterCommand) -> Result<Registration, IdentityError>;

    /// Confirm ownership of an email address with a live confirmation code.
    ///
    /// # Errors
    /// * `UserNotFound` - No account for this email
    /// * `CodeNotFound` - No live confirmation code (never issued, consumed or expired)
    /// * `CodeMismatch` - Code differs from the live one; it stays usable
    /// * `DatabaseError` - Database operation failed
    async fn confirm_email(&self, email: &EmailAddress, code: &str) -> Result<(), IdentityError>;

    /// Send a password reset code after checking the current password.
    ///
    /// # Errors
    /// * `UserNotFound` - No account for this email
    /// * `InvalidCredentials` - Current password does not match
    /// * `Notification` - Code could not be delivered
    /// * `DatabaseError` - Database operation failed
    async fn request_password_reset(
        &self,
        email: &EmailAddress,
        current_password: &str,
    ) -> Result<(), IdentityError>;

    /// Replace the password once a live reset code is presented.
    ///
    /// # Errors
    /// * `UserNotFound` - No account for this email
    /// * `CodeNotFound` - No live reset code
    /// * `CodeMismatch` - Code differs from the live one
    /// * `PasswordHashing` - Hashing failed
    /// * `DatabaseError` - Database operation failed
    async fn confirm_password_reset(
        &self,
        email: &EmailAddress,
        new_password: &Password,
        code: &str,
    ) -> Result<(), IdentityError>;

    /// Drop any live code of this type and deliver a fresh one.
    ///
    /// # Errors
    /// * `UserNotFound` - No account for this email
    /// * `Notification` - Code could not be delivered
    /// * `DatabaseError` - Database operation failed
    async fn resend_code(
        &self,
        email: &EmailAddress,
        code_type: CodeType,
    ) -> Result<(), IdentityError>;

    /// Authenticate by email or username and open a session.
    ///
    /// # Returns
    /// Access token and a persisted refresh token
    ///
    /// # Errors
    /// * `UserNotFound` - Neither email nor username matches
    /// * `InvalidCredentials` - Password does not match
    /// * `TokenIssuance` - Access token could not be signed
    /// * `DatabaseError` - Refresh token could not be persisted
    async fn login(&self, email_or_username: &str, password: &str)
        -> Result<TokenPair, IdentityError>;

    /// Revoke a refresh token. Revoking an unknown token succeeds.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn logout(&self, refresh_token: &str) -> Result<(), IdentityError>;

    /// Mint a new access token from a live refresh token.
    ///
    /// # Errors
    /// * `InvalidToken` - Refresh token unknown or revoked
    /// * `TokenExpired` - Refresh token past its expiry
    /// * `DatabaseError` - Database operation failed
    async fn refresh(&self, refresh_token: &str) -> Result<AccessGrant, IdentityError>;

    /// Resolve the user behind an access token.
    ///
    /// # Errors
    /// * `InvalidToken` - Bad signature or malformed token
    /// * `TokenExpired` - Token past its expiry
    /// * `UserNotFound` - Account no longer exists
    async fn authenticate(&self, access_token: &str) -> Result<User, IdentityError>;
}

/// Persistence operations for user records.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist a new user; the store assigns its ID.
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `UsernameAlreadyExists` - Username is already taken
    /// * `DatabaseError` - Database operation failed
    async fn create_user(&self, user: NewUser) -> Result<User, IdentityError>;

    /// Set `email_confirmed`; no other column is written.
    ///
    /// # Errors
    /// * `UserNotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn mark_email_confirmed(&self, id: &UserId) -> Result<(), IdentityError>;

    /// Replace the stored password hash; no other column is written.
    ///
    /// # Errors
    /// * `UserNotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn set_password_hash(&self, id: &UserId, password_hash: &str)
        -> Result<(), IdentityError>;

    async fn find_user_by_id(&self, id: &UserId) -> Result<Option<User>, IdentityError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, IdentityError>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, IdentityError>;
}

/// Persistence operations for one-time codes.
///
/// At most one code exists per (email, code type); saving replaces it.
#[async_trait]
pub trait CodeRepository: Send + Sync + 'static {
    /// Insert or replace the code for (email, code type).
    async fn save_code(&self, code: OneTimeCode) -> Result<(), IdentityError>;

    /// Code for (email, code type) whose expiry is after `now`.
    async fn find_live_code(
        &self,
        email: &str,
        code_type: CodeType,
        now: DateTime<Utc>,
    ) -> Result<Option<OneTimeCode>, IdentityError>;

    /// Atomically delete the code if it is still live and equals `code`.
    ///
    /// # Returns
    /// Whether this call removed it; of two concurrent callers at most one
    /// sees `true`.
    async fn consume_code(
        &self,
        email: &str,
        code_type: CodeType,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, IdentityError>;

    /// Delete any code for (email, code type), returning how many rows went.
    async fn delete_codes(&self, email: &str, code_type: CodeType) -> Result<u64, IdentityError>;

    async fn purge_expired_codes(&self, now: DateTime<Utc>) -> Result<u64, IdentityError>;
}

/// Persistence operations for refresh tokens.
#[async_trait]
pub trait RefreshTokenRepository: Send + Sync + 'static {
    /// # Errors
    /// * `DatabaseError` - Insert failed (including a duplicate token value)
    async fn save_refresh_token(&self, token: RefreshToken) -> Result<(), IdentityError>;

    /// Raw row lookup; expiry is the caller's to check.
    async fn find_refresh_token(&self, token: &str)
        -> Result<Option<RefreshToken>, IdentityError>;

    /// # Returns
    /// Whether a row was deleted
    async fn delete_refresh_token(&self, token: &str) -> Result<bool, IdentityError>;

    async fn purge_expired_refresh_tokens(&self, now: DateTime<Utc>)
        -> Result<u64, IdentityError>;
}

/// Everything the identity core reads and writes.
pub trait CredentialStore: UserRepository + CodeRepository + RefreshTokenRepository {}

impl<T> CredentialStore for T where T: UserRepository + CodeRepository + RefreshTokenRepository {}

/// Outbound delivery of messages to users (mail, SMS, ...).
#[async_trait]
pub trait Notifier: Send + Sync + 'static {
    /// # Errors
    /// * `InvalidRecipient` - Recipient address rejected by the transport
    /// * `BuildFailed` - Message could not be assembled
    /// * `DeliveryFailed` - Transport failed to hand the message off
    async fn send(&self, notification: &Notification) -> Result<(), NotificationError>;
}

/// Source of the current instant for expiry decisions.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
