use async_trait::async_trait;
use sqlx::FromRow;

use ventura_core::domain::caller::UserId;
use ventura_core::domain::platform::{
    ConversationSummary, FundingRequestSummary, InvestorSummary, VentureSummary,
};

use super::{PlatformReadRepository, RepositoryError};
use crate::DbPool;

pub struct SqlPlatformRepository {
    pool: DbPool,
}

impl SqlPlatformRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct VentureRow {
    id: i64,
    name: String,
    description: Option<String>,
    category: Option<String>,
    owner_name: String,
    funding_goal: Option<f64>,
    created_at: String,
}

impl From<VentureRow> for VentureSummary {
    fn from(row: VentureRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            category: row.category,
            owner_name: row.owner_name,
            funding_goal: row.funding_goal,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct InvestorRow {
    id: i64,
    name: String,
    email: String,
    bio: Option<String>,
}

#[derive(Debug, FromRow)]
struct ConversationRow {
    chat_id: i64,
    counterpart_name: String,
    unread_count: i64,
    last_message: Option<String>,
    last_activity: String,
}

#[derive(Debug, FromRow)]
struct FundingRequestRow {
    id: i64,
    venture_name: String,
    requester_name: String,
    investor_name: Option<String>,
    amount: f64,
    status: String,
    requested_at: String,
}

const VENTURE_SELECT: &str = "SELECT v.id, v.name, v.description, c.name AS category,
            u.name AS owner_name, v.funding_goal, v.created_at
     FROM ventures v
     JOIN users u ON u.id = v.owner_id
     LEFT JOIN categories c ON c.id = v.category_id";

#[async_trait]
impl PlatformReadRepository for SqlPlatformRepository {
    async fn list_ventures(
        &self,
        limit: u32,
        category: Option<&str>,
    ) -> Result<Vec<VentureSummary>, RepositoryError> {
        let category_pattern = category.map(|value| like_pattern(value.trim()));
        let rows: Vec<VentureRow> = sqlx::query_as(&format!(
            "{VENTURE_SELECT}
             WHERE ?1 IS NULL OR LOWER(c.name) LIKE ?1 ESCAPE '\\'
             ORDER BY v.created_at DESC, v.id DESC
             LIMIT ?2"
        ))
        .bind(category_pattern)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(VentureSummary::from).collect())
    }

    async fn search_ventures(
        &self,
        name: &str,
        limit: u32,
    ) -> Result<Vec<VentureSummary>, RepositoryError> {
        let pattern = like_pattern(name.trim());
        let rows: Vec<VentureRow> = sqlx::query_as(&format!(
            "{VENTURE_SELECT}
             WHERE LOWER(v.name) LIKE ?1 ESCAPE '\\'
                OR LOWER(COALESCE(v.description, '')) LIKE ?1 ESCAPE '\\'
             ORDER BY v.created_at DESC, v.id DESC
             LIMIT ?2"
        ))
        .bind(pattern)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(VentureSummary::from).collect())
    }

    async fn list_investors(&self, limit: u32) -> Result<Vec<InvestorSummary>, RepositoryError> {
        let rows: Vec<InvestorRow> = sqlx::query_as(
            "SELECT id, name, email, bio FROM users
             WHERE role = 'inversor'
             ORDER BY id DESC
             LIMIT ?",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| InvestorSummary {
                id: UserId(row.id),
                name: row.name,
                email: row.email,
                bio: row.bio,
            })
            .collect())
    }

    async fn count_ventures_owned(&self, user_id: UserId) -> Result<i64, RepositoryError> {
        count(&self.pool, "SELECT COUNT(*) FROM ventures WHERE owner_id = ?", user_id).await
    }

    async fn count_funding_requests_sent(&self, user_id: UserId) -> Result<i64, RepositoryError> {
        count(&self.pool, "SELECT COUNT(*) FROM funding_requests WHERE requester_id = ?", user_id)
            .await
    }

    async fn count_contact_requests_received(
        &self,
        user_id: UserId,
    ) -> Result<i64, RepositoryError> {
        count(&self.pool, "SELECT COUNT(*) FROM contact_requests WHERE recipient_id = ?", user_id)
            .await
    }

    async fn count_chats(&self, user_id: UserId) -> Result<i64, RepositoryError> {
        count(
            &self.pool,
            "SELECT COUNT(*) FROM chats WHERE user_a_id = ?1 OR user_b_id = ?1",
            user_id,
        )
        .await
    }

    async fn list_conversations(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<ConversationSummary>, RepositoryError> {
        let rows: Vec<ConversationRow> = sqlx::query_as(
            "SELECT c.id AS chat_id,
                    other.name AS counterpart_name,
                    (SELECT COUNT(*) FROM messages m
                      WHERE m.chat_id = c.id AND m.sender_id <> ?1 AND m.read_at IS NULL)
                        AS unread_count,
                    (SELECT m.body FROM messages m
                      WHERE m.chat_id = c.id
                      ORDER BY m.created_at DESC, m.id DESC
                      LIMIT 1) AS last_message,
                    COALESCE(
                        (SELECT MAX(m.created_at) FROM messages m WHERE m.chat_id = c.id),
                        c.created_at
                    ) AS last_activity
             FROM chats c
             JOIN users other
               ON other.id = CASE WHEN c.user_a_id = ?1 THEN c.user_b_id ELSE c.user_a_id END
             WHERE c.user_a_id = ?1 OR c.user_b_id = ?1
             ORDER BY last_activity DESC, c.id DESC
             LIMIT ?2",
        )
        .bind(user_id.0)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| ConversationSummary {
                chat_id: row.chat_id,
                counterpart_name: row.counterpart_name,
                unread_count: row.unread_count,
                last_message: row.last_message,
                last_activity: row.last_activity,
            })
            .collect())
    }

    async fn list_funding_requests(
        &self,
        limit: u32,
        status: Option<&str>,
    ) -> Result<Vec<FundingRequestSummary>, RepositoryError> {
        let status = status.map(|value| value.trim().to_lowercase());
        let rows: Vec<FundingRequestRow> = sqlx::query_as(
            "SELECT f.id, v.name AS venture_name, requester.name AS requester_name,
                    investor.name AS investor_name, f.amount, f.status, f.requested_at
             FROM funding_requests f
             JOIN ventures v ON v.id = f.venture_id
             JOIN users requester ON requester.id = f.requester_id
             LEFT JOIN users investor ON investor.id = f.investor_id
             WHERE ?1 IS NULL OR LOWER(f.status) = ?1
             ORDER BY f.requested_at DESC, f.id DESC
             LIMIT ?2",
        )
        .bind(status)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| FundingRequestSummary {
                id: row.id,
                venture_name: row.venture_name,
                requester_name: row.requester_name,
                investor_name: row.investor_name,
                amount: row.amount,
                status: row.status,
                requested_at: row.requested_at,
            })
            .collect())
    }
}

async fn count(pool: &DbPool, sql: &str, user_id: UserId) -> Result<i64, RepositoryError> {
    let value: i64 = sqlx::query_scalar(sql).bind(user_id.0).fetch_one(pool).await?;
    Ok(value)
}

/// `%needle%` with LIKE wildcards in the user text escaped by `\`.
fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for character in needle.to_lowercase().chars() {
        if matches!(character, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(character);
    }
    escaped.push('%');
    escaped
}
