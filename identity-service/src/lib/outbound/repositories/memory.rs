use std::collections::BTreeMap;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::MutexGuard;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::identity::errors::IdentityError;
use crate::identity::models::is_live;
use crate::identity::models::CodeType;
use crate::identity::models::NewUser;
use crate::identity::models::OneTimeCode;
use crate::identity::models::RefreshToken;
use crate::identity::models::User;
use crate::identity::models::UserId;
use crate::identity::ports::CodeRepository;
use crate::identity::ports::RefreshTokenRepository;
use crate::identity::ports::UserRepository;

#[derive(Default)]
struct State {
    next_user_id: i64,
    users: BTreeMap<i64, User>,
    codes: HashMap<(String, CodeType), OneTimeCode>,
    refresh_tokens: HashMap<String, RefreshToken>,
}

/// Process-local credential store.
///
/// Same contract as the PostgreSQL store, including uniqueness and atomic
/// code consumption, behind a single mutex. Used by tests and for running
/// the service without a database.
#[derive(Default)]
pub struct InMemoryCredentialStore {
    state: Mutex<State>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<MutexGuard<'_, State>, IdentityError> {
        self.state
            .lock()
            .map_err(|_| IdentityError::DatabaseError("in-memory store poisoned".to_string()))
    }
}

#[async_trait]
impl UserRepository for InMemoryCredentialStore {
    async fn create_user(&self, user: NewUser) -> Result<User, IdentityError> {
        let mut state = self.state()?;

        if state.users.values().any(|u| u.email == user.email) {
            return Err(IdentityError::EmailAlreadyExists(user.email.to_string()));
        }
        if state.users.values().any(|u| u.username == user.username) {
            return Err(IdentityError::UsernameAlreadyExists(
                user.username.to_string(),
            ));
        }

        state.next_user_id += 1;
        let created = User {
            id: UserId(state.next_user_id),
            email: user.email,
            username: user.username,
            password_hash: user.password_hash,
            email_confirmed: false,
            created_at: Utc::now(),
        };
        state.users.insert(created.id.0, created.clone());

        Ok(created)
    }

    async fn mark_email_confirmed(&self, id: &UserId) -> Result<(), IdentityError> {
        let mut state = self.state()?;
        let user = state
            .users
            .get_mut(&id.0)
            .ok_or_else(|| IdentityError::UserNotFound(id.to_string()))?;
        user.email_confirmed = true;
        Ok(())
    }

    async fn set_password_hash(
        &self,
        id: &UserId,
        password_hash: &str,
    ) -> Result<(), IdentityError> {
        let mut state = self.state()?;
        let user = state
            .users
            .get_mut(&id.0)
            .ok_or_else(|| IdentityError::UserNotFound(id.to_string()))?;
        user.password_hash = password_hash.to_string();
        Ok(())
    }

    async fn find_user_by_id(&self, id: &UserId) -> Result<Option<User>, IdentityError> {
        Ok(self.state()?.users.get(&id.0).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, IdentityError> {
        Ok(self
            .state()?
            .users
            .values()
            .find(|u| u.email.as_str() == email)
            .cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, IdentityError> {
        Ok(self
            .state()?
            .users
            .values()
            .find(|u| u.username.as_str() == username)
            .cloned())
    }
}

#[async_trait]
impl CodeRepository for InMemoryCredentialStore {
    async fn save_code(&self, code: OneTimeCode) -> Result<(), IdentityError> {
        self.state()?
            .codes
            .insert((code.email.clone(), code.code_type), code);
        Ok(())
    }

    async fn find_live_code(
        &self,
        email: &str,
        code_type: CodeType,
        now: DateTime<Utc>,
    ) -> Result<Option<OneTimeCode>, IdentityError> {
        Ok(self
            .state()?
            .codes
            .get(&(email.to_string(), code_type))
            .filter(|c| c.is_live(now))
            .cloned())
    }

    async fn consume_code(
        &self,
        email: &str,
        code_type: CodeType,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, IdentityError> {
        let mut state = self.state()?;
        let key = (email.to_string(), code_type);

        let matches = state
            .codes
            .get(&key)
            .is_some_and(|c| c.code == code && c.is_live(now));
        if matches {
            state.codes.remove(&key);
        }

        Ok(matches)
    }

    async fn delete_codes(&self, email: &str, code_type: CodeType) -> Result<u64, IdentityError> {
        let removed = self
            .state()?
            .codes
            .remove(&(email.to_string(), code_type));
        Ok(u64::from(removed.is_some()))
    }

    async fn purge_expired_codes(&self, now: DateTime<Utc>) -> Result<u64, IdentityError> {
        let mut state = self.state()?;
        let before = state.codes.len();
        state.codes.retain(|_, c| c.is_live(now));
        Ok((before - state.codes.len()) as u64)
    }
}

#[async_trait]
impl RefreshTokenRepository for InMemoryCredentialStore {
    async fn save_refresh_token(&self, token: RefreshToken) -> Result<(), IdentityError> {
        let mut state = self.state()?;

        if state.refresh_tokens.contains_key(&token.token) {
            return Err(IdentityError::DatabaseError(
                "duplicate refresh token".to_string(),
            ));
        }
        if !state.users.contains_key(&token.user_id.0) {
            return Err(IdentityError::DatabaseError(format!(
                "refresh token for unknown user {}",
                token.user_id
            )));
        }

        state.refresh_tokens.insert(token.token.clone(), token);
        Ok(())
    }

    async fn find_refresh_token(
        &self,
        token: &str,
    ) -> Result<Option<RefreshToken>, IdentityError> {
        Ok(self.state()?.refresh_tokens.get(token).cloned())
    }

    async fn delete_refresh_token(&self, token: &str) -> Result<bool, IdentityError> {
        Ok(self.state()?.refresh_tokens.remove(token).is_some())
    }

    async fn purge_expired_refresh_tokens(
        &self,
        now: DateTime<Utc>,
    ) -> Result<u64, IdentityError> {
        let mut state = self.state()?;
        let before = state.refresh_tokens.len();
        state
            .refresh_tokens
            .retain(|_, t| is_live(t.expires_at, now));
        Ok((before - state.refresh_tokens.len()) as u64)
    }
}
