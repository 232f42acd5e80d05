use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use super::database_error;
use super::PostgresCredentialStore;
use crate::identity::errors::IdentityError;
use crate::identity::models::RefreshToken;
use crate::identity::models::UserId;
use crate::identity::ports::RefreshTokenRepository;

#[derive(Debug, sqlx::FromRow)]
struct RefreshTokenRow {
    user_id: i64,
    token: String,
    expires_at: DateTime<Utc>,
}

impl From<RefreshTokenRow> for RefreshToken {
    fn from(row: RefreshTokenRow) -> Self {
        RefreshToken {
            user_id: UserId(row.user_id),
            token: row.token,
            expires_at: row.expires_at,
        }
    }
}

#[async_trait]
impl RefreshTokenRepository for PostgresCredentialStore {
    async fn save_refresh_token(&self, token: RefreshToken) -> Result<(), IdentityError> {
        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (user_id, token, expires_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(token.user_id.0)
        .bind(&token.token)
        .bind(token.expires_at)
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(())
    }

    async fn find_refresh_token(
        &self,
        token: &str,
    ) -> Result<Option<RefreshToken>, IdentityError> {
        let row = sqlx::query_as::<_, RefreshTokenRow>(
            r#"
            SELECT user_id, token, expires_at
            FROM refresh_tokens
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(row.map(RefreshToken::from))
    }

    async fn delete_refresh_token(&self, token: &str) -> Result<bool, IdentityError> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn purge_expired_refresh_tokens(
        &self,
        now: DateTime<Utc>,
    ) -> Result<u64, IdentityError> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        Ok(result.rows_affected())
    }
}
