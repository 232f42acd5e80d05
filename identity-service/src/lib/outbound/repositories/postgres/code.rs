use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use super::database_error;
use super::PostgresCredentialStore;
use crate::identity::errors::IdentityError;
use crate::identity::models::CodeType;
use crate::identity::models::OneTimeCode;
use crate::identity::ports::CodeRepository;

#[derive(Debug, sqlx::FromRow)]
struct CodeRow {
    user_email: String,
    code_type: String,
    code: String,
    expires_at: DateTime<Utc>,
}

impl TryFrom<CodeRow> for OneTimeCode {
    type Error = IdentityError;

    fn try_from(row: CodeRow) -> Result<Self, Self::Error> {
        Ok(OneTimeCode {
            email: row.user_email,
            code_type: row.code_type.parse()?,
            code: row.code,
            expires_at: row.expires_at,
        })
    }
}

#[async_trait]
impl CodeRepository for PostgresCredentialStore {
    async fn save_code(&self, code: OneTimeCode) -> Result<(), IdentityError> {
        sqlx::query(
            r#"
            INSERT INTO one_time_codes (user_email, code_type, code, expires_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_email, code_type)
            DO UPDATE SET code = EXCLUDED.code, expires_at = EXCLUDED.expires_at
            "#,
        )
        .bind(&code.email)
        .bind(code.code_type.as_str())
        .bind(&code.code)
        .bind(code.expires_at)
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(())
    }

    async fn find_live_code(
        &self,
        email: &str,
        code_type: CodeType,
        now: DateTime<Utc>,
    ) -> Result<Option<OneTimeCode>, IdentityError> {
        sqlx::query_as::<_, CodeRow>(
            r#"
            SELECT user_email, code_type, code, expires_at
            FROM one_time_codes
            WHERE user_email = $1 AND code_type = $2 AND expires_at > $3
            "#,
        )
        .bind(email)
        .bind(code_type.as_str())
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?
        .map(OneTimeCode::try_from)
        .transpose()
    }

    async fn consume_code(
        &self,
        email: &str,
        code_type: CodeType,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, IdentityError> {
        let result = sqlx::query(
            r#"
            DELETE FROM one_time_codes
            WHERE user_email = $1 AND code_type = $2 AND code = $3 AND expires_at > $4
            "#,
        )
        .bind(email)
        .bind(code_type.as_str())
        .bind(code)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete_codes(&self, email: &str, code_type: CodeType) -> Result<u64, IdentityError> {
        let result = sqlx::query(
            r#"
            DELETE FROM one_time_codes
            WHERE user_email = $1 AND code_type = $2
            "#,
        )
        .bind(email)
        .bind(code_type.as_str())
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(result.rows_affected())
    }

    async fn purge_expired_codes(&self, now: DateTime<Utc>) -> Result<u64, IdentityError> {
        let result = sqlx::query("DELETE FROM one_time_codes WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        Ok(result.rows_affected())
    }
}
