use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use crate::domain::identity::errors::CodeTypeError;
use crate::domain::identity::errors::EmailError;
use crate::domain::identity::errors::PasswordPolicyError;
use crate::domain::identity::errors::UserIdError;
use crate::domain::identity::errors::UsernameError;

/// Whether a persisted row with the given expiry is still usable at `now`.
///
/// Every expiry decision (one-time codes, refresh tokens) goes through here.
pub fn is_live(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    expires_at > now
}

/// User aggregate entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub email: EmailAddress,
    pub username: Username,
    pub password_hash: String,
    pub email_confirmed: bool,
    pub created_at: DateTime<Utc>,
}

/// User row as submitted for creation; the store assigns the identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: EmailAddress,
    pub username: Username,
    pub password_hash: String,
}

/// User unique identifier, assigned by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(pub i64);

impl UserId {
    /// Parse a user ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a decimal integer
    pub fn from_string(s: &str) -> Result<Self, UserIdError> {
        s.parse::<i64>()
            .map(UserId)
            .map_err(|e| UserIdError::InvalidFormat(format!("{s}: {e}")))
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Username value type
///
/// Ensures username is 3-32 characters and contains only alphanumeric, underscore, and hyphen.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    const MIN_LENGTH: usize = 3;
    const MAX_LENGTH: usize = 32;

    /// Create a new valid username.
    ///
    /// # Errors
    /// * `TooShort` - Username shorter than 3 characters
    /// * `TooLong` - Username longer than 32 characters
    /// * `InvalidCharacters` - Contains non-alphanumeric characters (except _ and -)
    pub fn new(username: String) -> Result<Self, UsernameError> {
        let username = Self::with_valid_length(username)?;
        let username = Self::with_valid_chars(username)?;
        Ok(Self(username))
    }

    fn with_valid_length(username: String) -> Result<String, UsernameError> {
        let length = username.chars().count();
        if length < Self::MIN_LENGTH {
            Err(UsernameError::TooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            })
        } else if length > Self::MAX_LENGTH {
            Err(UsernameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(username)
        }
    }

    fn with_valid_chars(username: String) -> Result<String, UsernameError> {
        if username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            Ok(username)
        } else {
            Err(UsernameError::InvalidCharacters)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Validates format with an RFC 5322 parser. Stored and compared exactly as
/// given (case-sensitive).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated email address.
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Plaintext password that satisfies the policy for newly chosen passwords.
///
/// Only used where a password is being set (registration, reset). Login
/// accepts whatever the caller typed.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    const MIN_LENGTH: usize = 8;

    /// # Errors
    /// * `TooShort` - Fewer than 8 characters
    pub fn new(password: String) -> Result<Self, PasswordPolicyError> {
        let length = password.chars().count();
        if length < Self::MIN_LENGTH {
            return Err(PasswordPolicyError::TooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            });
        }
        Ok(Self(password))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Purpose a one-time code was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodeType {
    EmailConfirmation,
    PasswordReset,
}

impl CodeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CodeType::EmailConfirmation => "EmailConfirmation",
            CodeType::PasswordReset => "PasswordReset",
        }
    }
}

impl FromStr for CodeType {
    type Err = CodeTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EmailConfirmation" => Ok(CodeType::EmailConfirmation),
            "PasswordReset" => Ok(CodeType::PasswordReset),
            other => Err(CodeTypeError::Unknown(other.to_string())),
        }
    }
}

impl fmt::Display for CodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Short-lived numeric secret proving control of an email address.
#[derive(Clone, PartialEq, Eq)]
pub struct OneTimeCode {
    pub email: String,
    pub code: String,
    pub code_type: CodeType,
    pub expires_at: DateTime<Utc>,
}

impl OneTimeCode {
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        is_live(self.expires_at, now)
    }
}

impl fmt::Debug for OneTimeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OneTimeCode")
            .field("email", &self.email)
            .field("code", &"***")
            .field("code_type", &self.code_type)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Store-backed credential used solely to mint new access tokens.
#[derive(Clone, PartialEq, Eq)]
pub struct RefreshToken {
    pub user_id: UserId,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl RefreshToken {
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        is_live(self.expires_at, now)
    }
}

impl fmt::Debug for RefreshToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshToken")
            .field("user_id", &self.user_id)
            .field("token", &"***")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Command to register a new account with validated fields.
#[derive(Debug)]
pub struct RegisterCommand {
    pub email: EmailAddress,
    pub username: Username,
    pub password: Password,
}

impl RegisterCommand {
    pub fn new(email: EmailAddress, username: Username, password: Password) -> Self {
        Self {
            email,
            username,
            password,
        }
    }
}

/// Whether the confirmation code reached the notification gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeDelivery {
    Sent,
    Failed,
}

/// Outcome of a registration.
///
/// The account exists even when `code_delivery` is `Failed`; the caller is
/// expected to request a resend.
#[derive(Debug, Clone)]
pub struct Registration {
    pub user: User,
    pub code_delivery: CodeDelivery,
}

/// Signed access token plus its expiry.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessGrant {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

impl fmt::Debug for AccessGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessGrant")
            .field("access_token", &"***")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Credentials handed out by a successful login.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub user_id: UserId,
    pub access: AccessGrant,
    pub refresh_token: String,
    pub refresh_expires_at: DateTime<Utc>,
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("user_id", &self.user_id)
            .field("access", &self.access)
            .field("refresh_token", &"***")
            .field("refresh_expires_at", &self.refresh_expires_at)
            .finish()
    }
}

/// Message handed to the notification gateway.
#[derive(Clone, PartialEq, Eq)]
pub struct Notification {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

impl fmt::Debug for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notification")
            .field("recipient", &self.recipient)
            .field("subject", &self.subject)
            .field("body", &"***")
            .finish()
    }
}

impl Notification {
    /// Compose the message that carries a one-time code to its owner.
    pub fn one_time_code(recipient: &str, code_type: CodeType, code: &str, ttl: Duration) -> Self {
        let minutes = ttl.num_minutes();
        let (subject, body) = match code_type {
            CodeType::EmailConfirmation => (
                "Your verification code",
                format!(
                    "To finish setting up your account, please verify your email with the code: {code}\n\nThe code expires in {minutes} minutes."
                ),
            ),
            CodeType::PasswordReset => (
                "Reset your password",
                format!(
                    "To reset your password, please confirm your account with the code: {code}\n\nThe code expires in {minutes} minutes. If you did not ask for a reset, ignore this message."
                ),
            ),
        };

        Self {
            recipient: recipient.to_string(),
            subject: subject.to_string(),
            body,
        }
    }
}

/// Lifetimes and sizes governing codes and refresh tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentitySettings {
    pub code_length: usize,
    pub code_ttl: Duration,
    pub refresh_token_ttl: Duration,
}

impl Default for IdentitySettings {
    fn default() -> Self {
        Self {
            code_length: 6,
            code_ttl: Duration::minutes(10),
            refresh_token_ttl: Duration::days(7),
        }
    }
}
