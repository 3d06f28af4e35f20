use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use sha2::{Digest, Sha256};
use sqlx::FromRow;
use tracing::debug;

use ventura_core::domain::caller::{Caller, UserId, UserRole};

use super::{RepositoryError, SessionRepository};
use crate::DbPool;

/// Sessions are stored by the hex SHA-256 of the bearer token, never the raw token.
pub fn hash_session_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

/// RFC 3339 timestamp in the same shape `user_session.expires_at` is written in.
pub(crate) fn session_timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub struct SqlSessionRepository {
    pool: DbPool,
}

impl SqlSessionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Issues a session for `user_id` under the given raw token.
    pub async fn insert(
        &self,
        token: &str,
        user_id: UserId,
        expires_at: &str,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT OR REPLACE INTO user_session (token_hash, user_id, expires_at, created_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(hash_session_token(token))
        .bind(user_id.0)
        .bind(expires_at)
        .bind(session_timestamp_now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[derive(Debug, FromRow)]
struct SessionCallerRow {
    user_id: i64,
    role: String,
}

#[async_trait]
impl SessionRepository for SqlSessionRepository {
    async fn find_caller(&self, token: &str) -> Result<Option<Caller>, RepositoryError> {
        let row: Option<SessionCallerRow> = sqlx::query_as(
            "SELECT u.id AS user_id, u.role
             FROM user_session s
             JOIN users u ON u.id = s.user_id
             WHERE s.token_hash = ? AND s.expires_at > ?",
        )
        .bind(hash_session_token(token))
        .bind(session_timestamp_now())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            debug!(event_name = "auth.session.miss", "no live session for presented token");
            return Ok(None);
        };

        let role = UserRole::parse_db(&row.role).ok_or_else(|| {
            RepositoryError::Decode(format!("unknown role `{}` for user {}", row.role, row.user_id))
        })?;

        Ok(Some(Caller { user_id: UserId(row.user_id), role }))
    }
}
