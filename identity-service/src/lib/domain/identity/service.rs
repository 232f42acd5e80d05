use std::sync::Arc;

use async_trait::async_trait;

use crate::identity::errors::IdentityError;
use crate::identity::models::AccessGrant;
use crate::identity::models::CodeDelivery;
use crate::identity::models::CodeType;
use crate::identity::models::EmailAddress;
use crate::identity::models::IdentitySettings;
use crate::identity::models::NewUser;
use crate::identity::models::Notification;
use crate::identity::models::OneTimeCode;
use crate::identity::models::Password;
use crate::identity::models::RefreshToken;
use crate::identity::models::RegisterCommand;
use crate::identity::models::Registration;
use crate::identity::models::TokenPair;
use crate::identity::models::User;
use crate::identity::models::UserId;
use crate::identity::ports::Clock;
use crate::identity::ports::CredentialStore;
use crate::identity::ports::IdentityServicePort;
use crate::identity::ports::Notifier;
use crate::identity::ports::SystemClock;

/// Domain service implementation for identity operations.
///
/// Concrete implementation of IdentityServicePort with dependency injection.
/// Holds no per-user state; every call re-reads what it needs from the store.
pub struct IdentityService<S, N>
where
    S: CredentialStore,
    N: Notifier,
{
    store: Arc<S>,
    notifier: Arc<N>,
    token_issuer: Arc<auth::TokenIssuer>,
    code_generator: auth::CodeGenerator,
    password_hasher: auth::PasswordHasher,
    clock: Arc<dyn Clock>,
    settings: IdentitySettings,
}

impl<S, N> IdentityService<S, N>
where
    S: CredentialStore,
    N: Notifier,
{
    /// Create a new identity service with injected dependencies.
    ///
    /// # Arguments
    /// * `store` - Credential store implementation
    /// * `notifier` - Notification gateway implementation
    /// * `token_issuer` - Access and refresh token issuer
    /// * `code_generator` - One-time code generator
    /// * `settings` - Code and refresh token lifetimes
    ///
    /// # Returns
    /// Service using the system clock and the default Argon2 work factor
    pub fn new(
        store: Arc<S>,
        notifier: Arc<N>,
        token_issuer: Arc<auth::TokenIssuer>,
        code_generator: auth::CodeGenerator,
        settings: IdentitySettings,
    ) -> Self {
        Self {
            store,
            notifier,
            token_issuer,
            code_generator,
            password_hasher: auth::PasswordHasher::new(),
            clock: Arc::new(SystemClock),
            settings,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_password_hasher(mut self, password_hasher: auth::PasswordHasher) -> Self {
        self.password_hasher = password_hasher;
        self
    }

    async fn require_user_by_email(&self, email: &EmailAddress) -> Result<User, IdentityError> {
        self.store
            .find_user_by_email(email.as_str())
            .await?
            .ok_or_else(|| IdentityError::UserNotFound(email.to_string()))
    }

    fn verify_password(&self, user: &User, password: &str) -> Result<(), IdentityError> {
        if self.password_hasher.verify(password, &user.password_hash)? {
            Ok(())
        } else {
            Err(IdentityError::InvalidCredentials)
        }
    }

    /// Generate, persist and deliver a fresh code, replacing any earlier one.
    async fn issue_code(&self, email: &str, code_type: CodeType) -> Result<(), IdentityError> {
        let code = self.code_generator.generate(self.settings.code_length);
        let expires_at = self.clock.now() + self.settings.code_ttl;

        self.store
            .save_code(OneTimeCode {
                email: email.to_string(),
                code: code.clone(),
                code_type,
                expires_at,
            })
            .await?;

        let notification =
            Notification::one_time_code(email, code_type, &code, self.settings.code_ttl);
        self.notifier.send(&notification).await?;

        tracing::debug!(email = %email, code_type = %code_type, "One-time code delivered");
        Ok(())
    }

    /// Check `code` against the live code and consume it.
    ///
    /// A mismatch leaves the live code in place. The final delete is
    /// conditional, so two callers racing on the same code cannot both win.
    async fn consume_live_code(
        &self,
        email: &str,
        code_type: CodeType,
        code: &str,
    ) -> Result<(), IdentityError> {
        let now = self.clock.now();

        let live = self
            .store
            .find_live_code(email, code_type, now)
            .await?
            .filter(|c| c.is_live(now))
            .ok_or(IdentityError::CodeNotFound(code_type))?;

        if live.code != code {
            tracing::warn!(email = %email, code_type = %code_type, "One-time code mismatch");
            return Err(IdentityError::CodeMismatch);
        }

        if !self
            .store
            .consume_code(email, code_type, code, now)
            .await?
        {
            return Err(IdentityError::CodeNotFound(code_type));
        }

        Ok(())
    }

    /// Delete every expired one-time code and refresh token.
    ///
    /// # Returns
    /// Number of codes and refresh tokens removed
    pub async fn purge_expired(&self) -> Result<(u64, u64), IdentityError> {
        let now = self.clock.now();
        let codes = self.store.purge_expired_codes(now).await?;
        let tokens = self.store.purge_expired_refresh_tokens(now).await?;
        Ok((codes, tokens))
    }
}

#[async_trait]
impl<S, N> IdentityServicePort for IdentityService<S, N>
where
    S: CredentialStore,
    N: Notifier,
{
    async fn register(&self, command: RegisterCommand) -> Result<Registration, IdentityError> {
        if self
            .store
            .find_user_by_email(command.email.as_str())
            .await?
            .is_some()
        {
            return Err(IdentityError::EmailAlreadyExists(command.email.to_string()));
        }

        if self
            .store
            .find_user_by_username(command.username.as_str())
            .await?
            .is_some()
        {
            return Err(IdentityError::UsernameAlreadyExists(
                command.username.to_string(),
            ));
        }

        let password_hash = self.password_hasher.hash(command.password.expose())?;

        let user = self
            .store
            .create_user(NewUser {
                email: command.email,
                username: command.username,
                password_hash,
            })
            .await?;

        tracing::info!(user_id = %user.id, username = %user.username, "User registered");

        // The account stays even if the code never leaves; a resend recovers it.
        let code_delivery = match self
            .issue_code(user.email.as_str(), CodeType::EmailConfirmation)
            .await
        {
            Ok(()) => CodeDelivery::Sent,
            Err(e) => {
                tracing::error!(
                    "Failed to deliver confirmation code for user {}: {}",
                    user.id,
                    e
                );
                CodeDelivery::Failed
            }
        };

        Ok(Registration {
            user,
            code_delivery,
        })
    }

    async fn confirm_email(&self, email: &EmailAddress, code: &str) -> Result<(), IdentityError> {
        let user = self.require_user_by_email(email).await?;

        self.consume_live_code(email.as_str(), CodeType::EmailConfirmation, code)
            .await?;

        self.store.mark_email_confirmed(&user.id).await?;

        tracing::info!(user_id = %user.id, "Email confirmed");
        Ok(())
    }

    async fn request_password_reset(
        &self,
        email: &EmailAddress,
        current_password: &str,
    ) -> Result<(), IdentityError> {
        let user = self.require_user_by_email(email).await?;

        if let Err(e) = self.verify_password(&user, current_password) {
            tracing::warn!(user_id = %user.id, "Password reset refused: {}", e);
            return Err(e);
        }

        self.issue_code(email.as_str(), CodeType::PasswordReset)
            .await?;

        tracing::info!(user_id = %user.id, "Password reset requested");
        Ok(())
    }

    async fn confirm_password_reset(
        &self,
        email: &EmailAddress,
        new_password: &Password,
        code: &str,
    ) -> Result<(), IdentityError> {
        let user = self.require_user_by_email(email).await?;

        self.consume_live_code(email.as_str(), CodeType::PasswordReset, code)
            .await?;

        let password_hash = self.password_hasher.hash(new_password.expose())?;
        self.store.set_password_hash(&user.id, &password_hash).await?;

        tracing::info!(user_id = %user.id, "Password reset");
        Ok(())
    }

    async fn resend_code(
        &self,
        email: &EmailAddress,
        code_type: CodeType,
    ) -> Result<(), IdentityError> {
        let user = self.require_user_by_email(email).await?;

        let deleted = self.store.delete_codes(email.as_str(), code_type).await?;
        tracing::debug!(user_id = %user.id, code_type = %code_type, deleted, "Previous codes dropped");

        self.issue_code(email.as_str(), code_type).await
    }

    async fn login(
        &self,
        email_or_username: &str,
        password: &str,
    ) -> Result<TokenPair, IdentityError> {
        let user = match self.store.find_user_by_email(email_or_username).await? {
            Some(user) => user,
            None => self
                .store
                .find_user_by_username(email_or_username)
                .await?
                .ok_or_else(|| IdentityError::UserNotFound(email_or_username.to_string()))?,
        };

        if let Err(e) = self.verify_password(&user, password) {
            tracing::warn!(user_id = %user.id, "Login refused: {}", e);
            return Err(e);
        }

        let access = self.token_issuer.issue_access(user.id)?;
        let refresh_token = self.token_issuer.issue_refresh();
        let refresh_expires_at = self.clock.now() + self.settings.refresh_token_ttl;

        self.store
            .save_refresh_token(RefreshToken {
                user_id: user.id,
                token: refresh_token.clone(),
                expires_at: refresh_expires_at,
            })
            .await?;

        tracing::info!(user_id = %user.id, "User logged in");

        Ok(TokenPair {
            user_id: user.id,
            access: AccessGrant {
                access_token: access.token,
                expires_at: access.expires_at,
            },
            refresh_token,
            refresh_expires_at,
        })
    }

    async fn logout(&self, refresh_token: &str) -> Result<(), IdentityError> {
        if self.store.delete_refresh_token(refresh_token).await? {
            tracing::info!("Refresh token revoked");
        } else {
            tracing::debug!("Logout with unknown refresh token");
        }
        Ok(())
    }

    async fn refresh(&self, refresh_token: &str) -> Result<AccessGrant, IdentityError> {
        let now = self.clock.now();

        let stored = self
            .store
            .find_refresh_token(refresh_token)
            .await?
            .ok_or_else(|| IdentityError::InvalidToken("unknown refresh token".to_string()))?;

        if !stored.is_live(now) {
            if let Err(e) = self.store.delete_refresh_token(refresh_token).await {
                tracing::warn!(user_id = %stored.user_id, "Failed to drop expired refresh token: {}", e);
            }
            return Err(IdentityError::TokenExpired);
        }

        let access = self.token_issuer.issue_access(stored.user_id)?;

        Ok(AccessGrant {
            access_token: access.token,
            expires_at: access.expires_at,
        })
    }

    async fn authenticate(&self, access_token: &str) -> Result<User, IdentityError> {
        let subject = self.token_issuer.verify_access(access_token)?;
        let user_id = UserId::from_string(&subject)
            .map_err(|e| IdentityError::InvalidToken(e.to_string()))?;

        self.store
            .find_user_by_id(&user_id)
            .await?
            .ok_or_else(|| IdentityError::UserNotFound(user_id.to_string()))
    }
}
