use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use super::database_error;
use super::PostgresCredentialStore;
use crate::identity::errors::IdentityError;
use crate::identity::models::EmailAddress;
use crate::identity::models::NewUser;
use crate::identity::models::User;
use crate::identity::models::UserId;
use crate::identity::models::Username;
use crate::identity::ports::UserRepository;

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    email: String,
    username: String,
    password_hash: String,
    email_confirmed: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = IdentityError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: UserId(row.id),
            email: EmailAddress::new(row.email)?,
            username: Username::new(row.username)?,
            password_hash: row.password_hash,
            email_confirmed: row.email_confirmed,
            created_at: row.created_at,
        })
    }
}

/// Map a write failure, turning unique violations into conflicts.
fn write_error(e: sqlx::Error, email: &EmailAddress, username: &Username) -> IdentityError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            if db_err.constraint() == Some("users_username_key") {
                return IdentityError::UsernameAlreadyExists(username.to_string());
            }
            if db_err.constraint() == Some("users_email_key") {
                return IdentityError::EmailAlreadyExists(email.to_string());
            }
        }
    }
    database_error(e)
}

#[async_trait]
impl UserRepository for PostgresCredentialStore {
    async fn create_user(&self, user: NewUser) -> Result<User, IdentityError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (email, username, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, email, username, password_hash, email_confirmed, created_at
            "#,
        )
        .bind(user.email.as_str())
        .bind(user.username.as_str())
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| write_error(e, &user.email, &user.username))?;

        row.try_into()
    }

    async fn mark_email_confirmed(&self, id: &UserId) -> Result<(), IdentityError> {
        let result = sqlx::query("UPDATE users SET email_confirmed = TRUE WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        if result.rows_affected() == 0 {
            return Err(IdentityError::UserNotFound(id.to_string()));
        }

        Ok(())
    }

    async fn set_password_hash(
        &self,
        id: &UserId,
        password_hash: &str,
    ) -> Result<(), IdentityError> {
        let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id.0)
            .bind(password_hash)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        if result.rows_affected() == 0 {
            return Err(IdentityError::UserNotFound(id.to_string()));
        }

        Ok(())
    }

    async fn find_user_by_id(&self, id: &UserId) -> Result<Option<User>, IdentityError> {
        sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, username, password_hash, email_confirmed, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?
        .map(User::try_from)
        .transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, IdentityError> {
        sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, username, password_hash, email_confirmed, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?
        .map(User::try_from)
        .transpose()
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, IdentityError> {
        sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, username, password_hash, email_confirmed, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?
        .map(User::try_from)
        .transpose()
    }
}
