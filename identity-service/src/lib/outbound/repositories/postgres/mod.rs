//! PostgreSQL credential store.
//!
//! One pool, three tables (`users`, `one_time_codes`, `refresh_tokens`).
//! Each repository trait lives in its own file; all of them are implemented
//! on [`PostgresCredentialStore`] so the service sees a single store.

use sqlx::PgPool;

use crate::identity::errors::IdentityError;

mod code;
mod refresh_token;
mod user;

pub struct PostgresCredentialStore {
    pool: PgPool,
}

impl PostgresCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn database_error(e: sqlx::Error) -> IdentityError {
    IdentityError::DatabaseError(e.to_string())
}
