//! # SQLite Credential Store
//!
//! [`CredentialStore`] backed by the `users` table. Usernames are matched
//! exactly (case-sensitive); the unique index rejects duplicates.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use stockroom_core::{Credential, CredentialStore, StoreResult};

#[derive(Debug, sqlx::FromRow)]
struct CredentialRow {
    id: String,
    username: String,
    password_hash: String,
    role: String,
}

impl TryFrom<CredentialRow> for Credential {
    type Error = DbError;

    fn try_from(row: CredentialRow) -> Result<Self, Self::Error> {
        Credential::new(row.id, &row.username, row.password_hash, Some(&row.role))
            .map_err(|e| DbError::CorruptRow(format!("users: {e}")))
    }
}

#[derive(Debug, Clone)]
pub struct SqliteCredentialStore {
    pool: SqlitePool,
}

impl SqliteCredentialStore {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteCredentialStore { pool }
    }

    pub async fn get_by_username(&self, username: &str) -> DbResult<Option<Credential>> {
        let row = sqlx::query_as::<_, CredentialRow>(
            "SELECT id, username, password_hash, role FROM users WHERE username = ?1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Credential::try_from).transpose()
    }

    /// Inserts a credential.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - username (or id) already taken
    pub async fn create(&self, credential: &Credential) -> DbResult<Credential> {
        debug!(username = %credential.username(), "Inserting credential");

        sqlx::query(
            r#"
            INSERT INTO users (id, username, password_hash, role, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(credential.id())
        .bind(credential.username())
        .bind(credential.password_hash())
        .bind(credential.role())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let err = DbError::from(e);
            match &err {
                DbError::UniqueViolation { field, .. } if field == "id" => {
                    err.with_value(credential.id())
                }
                _ => err.with_value(credential.username()),
            }
        })?;

        Ok(credential.clone())
    }
}

#[async_trait]
impl CredentialStore for SqliteCredentialStore {
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<Credential>> {
        Ok(self.get_by_username(username).await?)
    }

    async fn insert(&self, credential: &Credential) -> StoreResult<Credential> {
        Ok(self.create(credential).await?)
    }
}
