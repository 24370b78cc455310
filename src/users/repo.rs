use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;

use super::repo_types::User;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("query failed: {0}")]
    Query(#[source] sqlx::Error),

    #[error("row decode failed: {0}")]
    Decode(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::Decode(_)
            | sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::ColumnIndexOutOfBounds { .. }
            | sqlx::Error::TypeNotFound { .. } => StoreError::Decode(e),
            other => StoreError::Query(other),
        }
    }
}

/// Persistence operations the HTTP layer depends on.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// All users in storage order.
    async fn list(&self) -> Result<Vec<User>, StoreError>;
    async fn name_exists(&self, name: &str) -> Result<bool, StoreError>;
    async fn insert(&self, name: &str) -> Result<(), StoreError>;
    /// Release every pooled connection. Pending acquires fail afterwards.
    async fn close(&self);
}

#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn list(&self) -> Result<Vec<User>, StoreError> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id::BIGINT AS id, name
            FROM users
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn name_exists(&self, name: &str) -> Result<bool, StoreError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"SELECT EXISTS(SELECT 1 FROM users WHERE name = $1)"#,
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn insert(&self, name: &str) -> Result<(), StoreError> {
        sqlx::query(r#"INSERT INTO users (name) VALUES ($1)"#)
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
