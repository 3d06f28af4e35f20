use serde::Serialize;
use sqlx::Executor;

use crate::connection::DbPool;
use crate::repositories::{hash_session_token, RepositoryError};

/// Bearer token of the seeded entrepreneur session. Demo use only.
pub const DEMO_SESSION_TOKEN: &str = "ventura-demo-session";
pub const DEMO_ENTREPRENEUR_ID: i64 = 1;
pub const DEMO_INVESTOR_ID: i64 = 2;

const DEMO_SESSION_EXPIRES_AT: &str = "2099-12-31T00:00:00Z";

/// Expected row counts per seeded table.
const SEED_TABLES: &[SeedTableContract] = &[
    SeedTableContract { table: "users", expected_rows: 5 },
    SeedTableContract { table: "categories", expected_rows: 3 },
    SeedTableContract { table: "ventures", expected_rows: 3 },
    SeedTableContract { table: "funding_requests", expected_rows: 3 },
    SeedTableContract { table: "contact_requests", expected_rows: 3 },
    SeedTableContract { table: "chats", expected_rows: 3 },
    SeedTableContract { table: "messages", expected_rows: 6 },
];

/// Deterministic demo dataset: two entrepreneurs, two investors, an admin,
/// three ventures and the funding, contact and chat activity between them.
pub struct DemoDataset;

impl DemoDataset {
    pub const SQL: &str = include_str!("../../../config/fixtures/demo_seed_data.sql");

    /// Loads the dataset and the demo session. Safe to run repeatedly.
    pub async fn load(pool: &DbPool) -> Result<SeedResult, RepositoryError> {
        let mut tx = pool.begin().await?;

        tx.execute(sqlx::query(Self::SQL)).await?;
        sqlx::query(
            "INSERT OR IGNORE INTO user_session (token_hash, user_id, expires_at, created_at)
             VALUES (?, ?, ?, '2024-01-10 09:00:00')",
        )
        .bind(hash_session_token(DEMO_SESSION_TOKEN))
        .bind(DEMO_ENTREPRENEUR_ID)
        .bind(DEMO_SESSION_EXPIRES_AT)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(SeedResult {
            tables_seeded: SEED_TABLES
                .iter()
                .map(|contract| TableSeedInfo {
                    table: contract.table,
                    rows: contract.expected_rows,
                })
                .collect(),
            session_token: DEMO_SESSION_TOKEN,
            session_user_id: DEMO_ENTREPRENEUR_ID,
        })
    }

    /// Checks every seeded table holds at least the expected rows and the demo
    /// session still resolves.
    pub async fn verify(pool: &DbPool) -> Result<VerificationResult, RepositoryError> {
        let mut checks = Vec::with_capacity(SEED_TABLES.len() + 1);

        for contract in SEED_TABLES {
            // Table names come from the constant list above, never from input.
            let rows: i64 = sqlx::query_scalar(&format!("SELECT COUNT(1) FROM {}", contract.table))
                .fetch_one(pool)
                .await?;
            checks.push((contract.table, rows >= contract.expected_rows));
        }

        let session_ok: i64 = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM user_session WHERE token_hash = ?1 AND user_id = ?2)",
        )
        .bind(hash_session_token(DEMO_SESSION_TOKEN))
        .bind(DEMO_ENTREPRENEUR_ID)
        .fetch_one(pool)
        .await?;
        checks.push(("user_session", session_ok == 1));

        let all_present = checks.iter().all(|(_, ok)| *ok);
        Ok(VerificationResult { all_present, checks })
    }
}

#[derive(Debug, Clone, Copy)]
struct SeedTableContract {
    table: &'static str,
    expected_rows: i64,
}

#[derive(Debug, Serialize)]
pub struct SeedResult {
    pub tables_seeded: Vec<TableSeedInfo>,
    pub session_token: &'static str,
    pub session_user_id: i64,
}

#[derive(Debug, Serialize)]
pub struct TableSeedInfo {
    pub table: &'static str,
    pub rows: i64,
}

#[derive(Debug, Serialize)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<(&'static str, bool)>,
}
